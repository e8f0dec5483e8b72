//! Transfer proposals and their treasurer tally.

use commune_engine::{CreateSpec, FundingPlan, Proposal, ProposalEngine};
use commune_ledger::{TokenLedger, TokenRegistry};
use commune_registry::{CommunityRegistry, MemberRegistry};
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus,
    Timestamp,
};
use serde::{Deserialize, Serialize};

/// Pay `amount` of the token registered under `token_symbol` to `to`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferParams {
    pub community_id: CommunityId,
    pub token_symbol: String,
    pub to: Address,
    pub amount: u128,
}

/// The transfer facade over the proposal engine.
#[derive(Clone, Debug)]
pub struct Transfer {
    engine: ProposalEngine<TransferParams>,
}

impl Transfer {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("transfer", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    pub fn custody(&self) -> &Address {
        self.engine.custody()
    }

    /// Founders or treasurers may propose; only treasurers vote, weighted
    /// by their registered shares against the treasury consensus.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proposal(
        &mut self,
        caller: &Address,
        params: TransferParams,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        registry: &TokenRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        let is_founder = members.is_founder(&params.community_id, caller);
        let is_treasurer = members.is_treasurer(&params.community_id, caller);
        if !is_founder && !is_treasurer {
            return Err(GovernanceError::authorization(
                "just founders or treasurers can create transfer proposal",
            ));
        }
        if !registry.exists(&params.token_symbol) {
            return Err(GovernanceError::validation("token with symbol does not exist"));
        }
        if params.amount == 0 {
            return Err(GovernanceError::validation("amount cannot be zero"));
        }
        let community = communities.get(&params.community_id)?;

        let funding = FundingPlan::split_two(
            &params.token_symbol,
            &community.id,
            &community.escrow_address,
            params.amount,
        );
        let spec = CreateSpec {
            community_id: params.community_id.clone(),
            creator: caller.clone(),
            roster: members.treasurers(&params.community_id),
            threshold_bps: community.treasury_consensus,
            voting_window_secs: community.treasury_voting_time,
            funding: Some(funding),
        };
        self.engine.create(spec, params, now, ledger)
    }

    /// On approval: pay the recipient from custody.
    pub fn vote(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        members: &MemberRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalStatus> {
        if !members.is_treasurer(community_id, caller) {
            return Err(GovernanceError::authorization(
                "just treasurers can vote on transfer proposal",
            ));
        }
        let custody = self.engine.custody().clone();
        self.engine.vote_with(
            proposal_id,
            community_id,
            caller,
            decision,
            now,
            ledger,
            |proposal, ledger| {
                ledger.transfer(
                    &proposal.payload.token_symbol,
                    &custody,
                    &proposal.payload.to,
                    proposal.payload.amount,
                )?;
                tracing::info!(
                    proposal = proposal.id,
                    symbol = %proposal.payload.token_symbol,
                    to = %proposal.payload.to,
                    amount = proposal.payload.amount,
                    "treasury transfer executed"
                );
                Ok(())
            },
        )
    }

    pub fn cancel(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<()> {
        self.engine.cancel(proposal_id, community_id, caller, ledger)
    }

    pub fn count(&self) -> u64 {
        self.engine.count()
    }

    pub fn id_by_index(&self, index: usize) -> GovernanceResult<ProposalId> {
        self.engine.id_by_index(index)
    }

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<TransferParams>> {
        self.engine.get(proposal_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commune_registry::CommunityParams;
    use commune_types::{MemberRole, DAY_SECS};

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    struct Fixture {
        communities: CommunityRegistry,
        members: MemberRegistry,
        registry: TokenRegistry,
        ledger: TokenLedger,
        transfer: Transfer,
    }

    fn fixture() -> Fixture {
        let mut registry = TokenRegistry::new();
        registry.register_token("USD Coin", "USDC", addr("0xusdc"));

        let mut communities = CommunityRegistry::new();
        let mut members = MemberRegistry::new();
        let mut ledger = TokenLedger::new();
        let transfer = Transfer::new(addr("transfer-custody"));

        let params = CommunityParams {
            community_address: addr("0xc0"),
            founders: vec![(addr("f0"), 5000), (addr("f1"), 3000), (addr("f2"), 2000)],
            entry_type: "Approval".into(),
            entry_conditions: vec![],
            founders_voting_time: 2 * DAY_SECS,
            founders_consensus: 9000,
            treasury_voting_time: 2 * DAY_SECS,
            treasury_consensus: 5000,
            escrow_address: addr("escrow"),
            staking_address: addr("staking"),
            treasury_address: addr("treasury"),
        };
        let policy = params.validate(&registry).unwrap();
        let id = communities.insert(&params, policy, Timestamp::EPOCH).unwrap();
        members.seed_founders(&id, &params.founders);

        // Two equal-weight treasurers; 5000 bps consensus needs one of two.
        members.update_member(&id, &addr("t0"), MemberRole::Treasurer, 100);
        members.update_member(&id, &addr("t1"), MemberRole::Treasurer, 100);

        ledger.mint("USDC", &addr("0xc0"), 10_000).unwrap();
        ledger.mint("USDC", &addr("escrow"), 10_000).unwrap();
        ledger.approve("USDC", &addr("0xc0"), transfer.custody(), 10_000);
        ledger.approve("USDC", &addr("escrow"), transfer.custody(), 10_000);

        Fixture { communities, members, registry, ledger, transfer }
    }

    fn params(amount: u128) -> TransferParams {
        TransferParams {
            community_id: addr("0xc0"),
            token_symbol: "USDC".into(),
            to: addr("recipient"),
            amount,
        }
    }

    #[test]
    fn create_gates_use_stable_messages() {
        let mut fx = fixture();

        let err = fx.transfer
            .create_proposal(&addr("acc6"), params(100), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::authorization("just founders or treasurers can create transfer proposal")
        );

        let mut p = params(100);
        p.token_symbol = "WAT".into();
        let err = fx.transfer
            .create_proposal(&addr("f0"), p, Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::validation("token with symbol does not exist"));

        let err = fx.transfer
            .create_proposal(&addr("f0"), params(0), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::validation("amount cannot be zero"));
    }

    #[test]
    fn treasurers_not_founders_vote() {
        let mut fx = fixture();
        let id = fx.transfer
            .create_proposal(&addr("f0"), params(1_000), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap();

        let err = fx.transfer
            .vote(&addr("f0"), id, &addr("0xc0"), true, Timestamp::EPOCH, &fx.members, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::authorization("just treasurers can vote on transfer proposal")
        );

        // One of two equal treasurer weights meets the 5000 bps consensus.
        let status = fx.transfer
            .vote(&addr("t0"), id, &addr("0xc0"), true, Timestamp::EPOCH, &fx.members, &mut fx.ledger)
            .unwrap();
        assert_eq!(status, ProposalStatus::Approved);
        assert_eq!(fx.ledger.balance_of("USDC", &addr("recipient")), 1_000);
        assert_eq!(fx.ledger.balance_of("USDC", fx.transfer.custody()), 0);
    }

    #[test]
    fn cancel_refunds_the_escrowed_split() {
        let mut fx = fixture();
        let id = fx.transfer
            .create_proposal(&addr("t0"), params(999), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap();
        // 999 splits 500 community / 499 escrow.
        assert_eq!(fx.ledger.balance_of("USDC", &addr("0xc0")), 9_500);
        assert_eq!(fx.ledger.balance_of("USDC", &addr("escrow")), 9_501);

        fx.transfer.cancel(&addr("t0"), id, &addr("0xc0"), &mut fx.ledger).unwrap();
        assert_eq!(fx.ledger.balance_of("USDC", &addr("0xc0")), 10_499);
        assert_eq!(fx.ledger.balance_of("USDC", fx.transfer.custody()), 0);
    }
}
