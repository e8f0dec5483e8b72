//! Bid proposals: founder-voted bids on external NFT auctions.

use crate::collaborators::NftAuction;
use commune_engine::{CreateSpec, FundingPlan, Proposal, ProposalEngine};
use commune_ledger::{TokenLedger, TokenRegistry};
use commune_registry::{CommunityRegistry, MemberRegistry};
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus,
    Timestamp,
};
use serde::{Deserialize, Serialize};

/// Bid `amount` of `token_symbol` on the auction listed under
/// `media_symbol`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BidParams {
    pub community_id: CommunityId,
    pub media_symbol: String,
    pub token_symbol: String,
    pub amount: u128,
}

/// The bid facade over the proposal engine.
#[derive(Clone, Debug)]
pub struct Bid {
    engine: ProposalEngine<BidParams>,
}

impl Bid {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("bid", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    pub fn custody(&self) -> &Address {
        self.engine.custody()
    }

    /// The bid amount is escrowed from the community address at creation.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proposal(
        &mut self,
        caller: &Address,
        params: BidParams,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        registry: &TokenRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        if params.amount == 0 {
            return Err(GovernanceError::validation("amount can't be lower than zero"));
        }
        if !registry.exists(&params.token_symbol) {
            return Err(GovernanceError::validation(
                "token contract address is not valid",
            ));
        }
        if !members.is_founder(&params.community_id, caller) {
            return Err(GovernanceError::authorization("creator should be founder"));
        }
        let community = communities.get(&params.community_id)?;

        let funding = FundingPlan::single(&params.token_symbol, &community.id, params.amount);
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

    /// On approval the custody funds are forwarded to the auction as the
    /// community's bid.
    #[allow(clippy::too_many_arguments)]
    pub fn vote(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        members: &MemberRegistry,
        auction: &mut dyn NftAuction,
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
                auction.place_bid(
                    &proposal.payload.media_symbol,
                    &proposal.payload.token_symbol,
                    &custody,
                    proposal.payload.amount,
                    ledger,
                )
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

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<BidParams>> {
        self.engine.get(proposal_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::InMemoryAuction;
    use commune_registry::CommunityParams;
    use commune_types::DAY_SECS;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    struct Fixture {
        communities: CommunityRegistry,
        members: MemberRegistry,
        registry: TokenRegistry,
        ledger: TokenLedger,
        auction: InMemoryAuction,
        bid: Bid,
    }

    fn fixture() -> Fixture {
        let mut registry = TokenRegistry::new();
        registry.register_token("Test Token", "TST", addr("0xtst"));

        let mut communities = CommunityRegistry::new();
        let mut members = MemberRegistry::new();
        let mut ledger = TokenLedger::new();
        let bid = Bid::new(addr("bid-custody"));

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

        ledger.mint("TST", &addr("0xc0"), 1_000).unwrap();
        ledger.approve("TST", &addr("0xc0"), bid.custody(), 1_000);

        Fixture {
            communities,
            members,
            registry,
            ledger,
            auction: InMemoryAuction::new(addr("auction-escrow")),
            bid,
        }
    }

    fn params(amount: u128) -> BidParams {
        BidParams {
            community_id: addr("0xc0"),
            media_symbol: "mediaSymbol".into(),
            token_symbol: "TST".into(),
            amount,
        }
    }

    #[test]
    fn create_gates_use_stable_messages() {
        let mut fx = fixture();

        let err = fx.bid
            .create_proposal(&addr("f0"), params(0), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::validation("amount can't be lower than zero"));

        let mut p = params(12);
        p.token_symbol = "TST1".into();
        let err = fx.bid
            .create_proposal(&addr("f0"), p, Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::validation("token contract address is not valid"));

        let err = fx.bid
            .create_proposal(&addr("acc4"), params(12), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::authorization("creator should be founder"));
    }

    #[test]
    fn approval_forwards_the_bid_to_the_auction() {
        let mut fx = fixture();
        let id = fx.bid
            .create_proposal(&addr("f0"), params(12), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap();
        assert_eq!(fx.ledger.balance_of("TST", &addr("0xc0")), 988);

        for voter in ["f0", "f1", "f2"] {
            fx.bid
                .vote(&addr(voter), id, &addr("0xc0"), true, Timestamp::EPOCH, &fx.members, &mut fx.auction, &mut fx.ledger)
                .unwrap();
        }

        assert_eq!(fx.ledger.balance_of("TST", &addr("auction-escrow")), 12);
        assert_eq!(fx.ledger.balance_of("TST", fx.bid.custody()), 0);
        assert_eq!(fx.auction.bids_on("mediaSymbol"), vec![(addr("bid-custody"), 12)]);
    }

    #[test]
    fn cancel_refunds_the_community_address() {
        let mut fx = fixture();
        let id = fx.bid
            .create_proposal(&addr("f0"), params(12), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap();
        fx.bid.cancel(&addr("f0"), id, &addr("0xc0"), &mut fx.ledger).unwrap();
        assert_eq!(fx.ledger.balance_of("TST", &addr("0xc0")), 1_000);
    }

    #[test]
    fn double_votes_conflict() {
        let mut fx = fixture();
        let id = fx.bid
            .create_proposal(&addr("f0"), params(12), Timestamp::EPOCH, &fx.communities, &fx.members, &fx.registry, &mut fx.ledger)
            .unwrap();
        fx.bid
            .vote(&addr("f0"), id, &addr("0xc0"), true, Timestamp::EPOCH, &fx.members, &mut fx.auction, &mut fx.ledger)
            .unwrap();
        let err = fx.bid
            .vote(&addr("f0"), id, &addr("0xc0"), true, Timestamp::EPOCH, &fx.members, &mut fx.auction, &mut fx.ledger)
            .unwrap_err();
        assert_eq!(err, GovernanceError::conflict("voter can not vote second time"));
    }
}
