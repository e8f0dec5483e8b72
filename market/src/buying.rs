//! Buying proposals: founder-voted purchases of exchange offers.

use crate::collaborators::TokenExchange;
use commune_engine::{CreateSpec, FundingPlan, Proposal, ProposalEngine};
use commune_ledger::TokenLedger;
use commune_registry::{CommunityRegistry, MemberRegistry};
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus,
    Timestamp,
};
use serde::{Deserialize, Serialize};

/// Take the selling offer `offer_id` on exchange `exchange_id`:
/// `amount` tokens at `price` each, paid in `payment_symbol`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuyingParams {
    pub community_id: CommunityId,
    pub exchange_id: u64,
    pub offer_id: u64,
    pub payment_symbol: String,
    pub amount: u128,
    pub price: u128,
}

impl BuyingParams {
    /// `price * amount`, or `None` on overflow.
    pub fn total_cost(&self) -> Option<u128> {
        self.price.checked_mul(self.amount)
    }
}

/// The buying facade over the proposal engine.
#[derive(Clone, Debug)]
pub struct Buying {
    engine: ProposalEngine<BuyingParams>,
}

impl Buying {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("buying", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    pub fn custody(&self) -> &Address {
        self.engine.custody()
    }

    /// Any community member may propose; the full cost is escrowed from the
    /// community address at creation.
    pub fn create_proposal(
        &mut self,
        caller: &Address,
        params: BuyingParams,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        if params.price == 0 {
            return Err(GovernanceError::validation("price cannot be zero"));
        }
        if params.amount == 0 {
            return Err(GovernanceError::validation("amount cannot be zero"));
        }
        if !members.is_member(&params.community_id, caller) {
            return Err(GovernanceError::authorization(
                "just community members can create buying proposal",
            ));
        }
        let total_cost = params
            .total_cost()
            .ok_or_else(|| GovernanceError::validation("total cost overflows"))?;
        let community = communities.get(&params.community_id)?;

        let funding = FundingPlan::single(&params.payment_symbol, &community.id, total_cost);
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

    /// On approval the offer is taken through the exchange: custody pays,
    /// the purchased tokens land on the community treasury, and any escrow
    /// beyond the offer's actual cost returns to the community address in
    /// the same call.
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
        exchange: &mut dyn TokenExchange,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalStatus> {
        if !members.is_founder(community_id, caller) {
            return Err(GovernanceError::authorization(
                "just founders can vote on buying order proposal",
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
                let community = communities.get(&proposal.community_id)?;
                let offer = exchange.get_offer_by_id(proposal.payload.offer_id)?;
                let escrowed = proposal
                    .payload
                    .total_cost()
                    .ok_or_else(|| GovernanceError::validation("total cost overflows"))?;
                let offer_cost = offer
                    .total_cost()
                    .ok_or_else(|| GovernanceError::transfer("offer cost overflows"))?;
                if offer_cost > escrowed {
                    return Err(GovernanceError::transfer(
                        "escrowed amount does not cover the offer",
                    ));
                }
                exchange.buy_offer(
                    proposal.payload.offer_id,
                    &custody,
                    &community.treasury_address,
                    ledger,
                )?;
                // The offer may cost less than what was escrowed; nothing
                // must stay on custody once the proposal is terminal.
                let remainder = escrowed - offer_cost;
                if remainder > 0 {
                    ledger.transfer(
                        &proposal.payload.payment_symbol,
                        &custody,
                        &community.id,
                        remainder,
                    )?;
                }
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

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<BuyingParams>> {
        self.engine.get(proposal_id)
    }
}
