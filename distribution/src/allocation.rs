//! Allocation proposals: founder-voted grants from the allocation budget.

use commune_engine::{CreateSpec, FundingPlan, Proposal, ProposalEngine};
use commune_ledger::TokenLedger;
use commune_registry::{CommunityRegistry, MemberRegistry};
use commune_token::TokenStore;
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus,
    Timestamp,
};
use serde::{Deserialize, Serialize};

/// Allocatees and per-address amounts of one allocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AllocationParams {
    pub community_id: CommunityId,
    pub allocations: Vec<(Address, u128)>,
}

impl AllocationParams {
    pub fn total(&self) -> u128 {
        self.allocations.iter().map(|(_, amount)| amount).sum()
    }
}

/// The allocation facade over the proposal engine.
#[derive(Clone, Debug)]
pub struct Allocation {
    engine: ProposalEngine<AllocationParams>,
}

impl Allocation {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("allocation", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    pub fn custody(&self) -> &Address {
        self.engine.custody()
    }

    pub fn create_proposal(
        &mut self,
        caller: &Address,
        params: AllocationParams,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        tokens: &TokenStore,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        if params.allocations.is_empty() {
            return Err(GovernanceError::validation(
                "at least one address is required to create allocate token proposal",
            ));
        }
        if params.allocations.iter().any(|(_, amount)| *amount == 0) {
            return Err(GovernanceError::validation("amount cannot be negative or zero"));
        }
        if !members.is_founder(&params.community_id, caller) {
            return Err(GovernanceError::authorization("requester has to be the founder"));
        }
        let community = communities.get(&params.community_id)?;
        let token = tokens.get(community.token_id)?;
        if params.total() > token.free_allocation_budget() {
            return Err(GovernanceError::validation(
                "number of free tokens to allocate is not enough",
            ));
        }
        if params.allocations.iter().any(|(address, _)| address.is_zero()) {
            return Err(GovernanceError::validation("allocation address is not valid"));
        }

        let funding = FundingPlan::split_two(
            &token.symbol,
            &community.id,
            &community.escrow_address,
            params.total(),
        );
        let spec = CreateSpec {
            community_id: params.community_id.clone(),
            creator: caller.clone(),
            roster: members.founders(&params.community_id),
            threshold_bps: community.founders_consensus,
            voting_window_secs: community.founders_voting_time,
            funding: Some(funding),
        };
        self.engine.create(spec, params, now, ledger)
    }

    /// On approval: transfer each grant from custody and consume the
    /// token's allocation budget.
    #[allow(clippy::too_many_arguments)]
    pub fn vote(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        tokens: &mut TokenStore,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalStatus> {
        if !members.is_founder(community_id, caller) {
            return Err(GovernanceError::authorization("voter should be founder"));
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
                let community = communities.get(&proposal.community_id)?;
                let token_id = community.token_id;
                let symbol = tokens.get(token_id)?.symbol.clone();
                for (allocatee, amount) in &proposal.payload.allocations {
                    ledger.transfer(&symbol, &custody, allocatee, *amount)?;
                }
                tracing::info!(
                    proposal = proposal.id,
                    %symbol,
                    total = proposal.payload.total(),
                    "allocation paid out"
                );
                tokens.record_allocated(token_id, proposal.payload.total())
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

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<AllocationParams>> {
        self.engine.get(proposal_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commune_registry::CommunityParams;
    use commune_token::CommunityToken;
    use commune_types::{TokenCurve, DAY_SECS};

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    struct Fixture {
        communities: CommunityRegistry,
        members: MemberRegistry,
        tokens: TokenStore,
        ledger: TokenLedger,
        allocation: Allocation,
    }

    fn fixture() -> Fixture {
        let mut communities = CommunityRegistry::new();
        let mut members = MemberRegistry::new();
        let mut tokens = TokenStore::new();
        let mut ledger = TokenLedger::new();
        let allocation = Allocation::new(addr("allocation-custody"));

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
        let policy = params.validate(&commune_ledger::TokenRegistry::new()).unwrap();
        let id = communities.insert(&params, policy, Timestamp::EPOCH).unwrap();
        members.seed_founders(&id, &params.founders);

        let token_id = tokens.insert(CommunityToken {
            id: 0,
            community_id: id.clone(),
            name: "Privi".into(),
            symbol: "PRIVI".into(),
            contract_address: addr("0xtoken"),
            funding_token: "USDC".into(),
            amm_address: addr("0xamm"),
            curve: TokenCurve::Linear,
            initial_supply: 100_000_000,
            target_price: 3,
            target_supply: 300_000_000,
            vesting_time: 30 * DAY_SECS,
            immediate_allocation_pct: 10,
            vested_allocation_pct: 10,
            taxation_pct: 10,
            created_at: Timestamp::EPOCH,
            airdrop_budget: 100_000,
            airdropped: 0,
            allocation_budget: 50_000,
            allocated: 0,
        });
        communities.set_token_id(&id, token_id).unwrap();

        ledger.mint("PRIVI", &addr("0xc0"), 100_000).unwrap();
        ledger.mint("PRIVI", &addr("escrow"), 100_000).unwrap();
        ledger.approve("PRIVI", &addr("0xc0"), allocation.custody(), 100_000);
        ledger.approve("PRIVI", &addr("escrow"), allocation.custody(), 100_000);

        Fixture { communities, members, tokens, ledger, allocation }
    }

    fn params(allocations: &[(&str, u128)]) -> AllocationParams {
        AllocationParams {
            community_id: addr("0xc0"),
            allocations: allocations.iter().map(|(a, v)| (addr(a), *v)).collect(),
        }
    }

    #[test]
    fn payload_validations_use_stable_messages() {
        let mut fx = fixture();

        let err = fx.allocation
            .create_proposal(&addr("f0"), params(&[]), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.tokens, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::validation(
                "at least one address is required to create allocate token proposal"
            )
        );

        let err = fx.allocation
            .create_proposal(&addr("f0"), params(&[("a0", 0)]), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.tokens, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::validation("amount cannot be negative or zero"));

        let err = fx.allocation
            .create_proposal(&addr("a9"), params(&[("a0", 100)]), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.tokens, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::authorization("requester has to be the founder"));

        let err = fx.allocation
            .create_proposal(&addr("f0"), params(&[("a0", 50_001)]), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.tokens, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::validation("number of free tokens to allocate is not enough")
        );

        let mut p = params(&[("a0", 100)]);
        p.allocations[0].0 = Address::zero();
        let err = fx.allocation
            .create_proposal(&addr("f0"), p, Timestamp::EPOCH, &fx.communities, &fx.members, &fx.tokens, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::validation("allocation address is not valid"));
    }

    #[test]
    fn approval_pays_allocatees_and_consumes_the_budget() {
        let mut fx = fixture();
        let id = fx.allocation
            .create_proposal(&addr("f0"), params(&[("a0", 2_000), ("a1", 3_000)]), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.tokens, &mut fx.ledger)
            .unwrap();
        // 5000 split: 2500 from the community, 2500 from escrow.
        assert_eq!(fx.ledger.balance_of("PRIVI", &addr("0xc0")), 97_500);

        for voter in ["f0", "f1", "f2"] {
            fx.allocation
                .vote(&addr(voter), id, &addr("0xc0"), true, Timestamp::EPOCH, &fx.communities, &fx.members, &mut fx.tokens, &mut fx.ledger)
                .unwrap();
        }

        assert_eq!(fx.ledger.balance_of("PRIVI", &addr("a0")), 2_000);
        assert_eq!(fx.ledger.balance_of("PRIVI", &addr("a1")), 3_000);
        assert_eq!(fx.tokens.get(1).unwrap().allocated, 5_000);
        assert_eq!(fx.tokens.get(1).unwrap().free_allocation_budget(), 45_000);
    }

    #[test]
    fn non_founder_votes_are_rejected() {
        let mut fx = fixture();
        let id = fx.allocation
            .create_proposal(&addr("f0"), params(&[("a0", 100)]), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.tokens, &mut fx.ledger)
            .unwrap();
        let err = fx.allocation
            .vote(&addr("a9"), id, &addr("0xc0"), true, Timestamp::EPOCH, &fx.communities, &fx.members, &mut fx.tokens, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::authorization("voter should be founder"));
    }

    #[test]
    fn rejection_refunds_the_community_address() {
        let mut fx = fixture();
        let id = fx.allocation
            .create_proposal(&addr("f0"), params(&[("a0", 5_000)]), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.tokens, &mut fx.ledger)
            .unwrap();

        // A single no vote from f0 (5000 bps) leaves at most 5000 reachable,
        // below the 9000 bps consensus.
        let status = fx.allocation
            .vote(&addr("f0"), id, &addr("0xc0"), false, Timestamp::EPOCH, &fx.communities, &fx.members, &mut fx.tokens, &mut fx.ledger)
            .unwrap();
        assert_eq!(status, ProposalStatus::Rejected);
        assert_eq!(fx.ledger.balance_of("PRIVI", &addr("0xc0")), 102_500);
        assert_eq!(fx.tokens.get(1).unwrap().allocated, 0);
    }
}
