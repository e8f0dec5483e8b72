//! Joining requests.

use crate::stakes::StakeBook;
use commune_engine::{CreateSpec, FundingPlan, Proposal, ProposalEngine, Pull};
use commune_ledger::TokenLedger;
use commune_registry::{CommunityRegistry, MemberRegistry};
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, MemberRole, ProposalId,
    ProposalStatus, Timestamp,
};
use serde::{Deserialize, Serialize};

/// A request to admit `joining_address` into a community. The creator may
/// submit on the joiner's behalf; stakes always come from the joiner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JoiningParams {
    pub community_id: CommunityId,
    pub joining_address: Address,
}

/// The joining-request facade over the proposal engine.
#[derive(Clone, Debug)]
pub struct Joining {
    engine: ProposalEngine<JoiningParams>,
}

impl Joining {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("joining", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    pub fn custody(&self) -> &Address {
        self.engine.custody()
    }

    /// For Staking communities the entry-condition amounts are pulled from
    /// the joiner into custody; they return to the joiner unless the request
    /// is approved.
    pub fn create_request(
        &mut self,
        caller: &Address,
        params: JoiningParams,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        if params.joining_address.is_zero() {
            return Err(GovernanceError::validation("address doesn't exist"));
        }
        let community = communities.get(&params.community_id)?;
        if members.is_founder(&params.community_id, &params.joining_address) {
            return Err(GovernanceError::conflict(
                "address is already member of community as founder",
            ));
        }
        if members.is_member(&params.community_id, &params.joining_address) {
            return Err(GovernanceError::conflict("address is already member of community"));
        }

        let funding = if community.entry_policy.is_staking() {
            let pulls = community
                .entry_policy
                .conditions()
                .iter()
                .map(|condition| Pull {
                    symbol: condition.symbol.clone(),
                    source: params.joining_address.clone(),
                    amount: condition.amount,
                })
                .collect();
            Some(FundingPlan { pulls, refund_to: params.joining_address.clone() })
        } else {
            None
        };

        let spec = CreateSpec {
            community_id: params.community_id.clone(),
            creator: caller.clone(),
            roster: members.founders(&params.community_id),
            threshold_bps: community.founders_consensus,
            voting_window_secs: community.founders_voting_time,
            funding,
        };
        self.engine.create(spec, params, now, ledger)
    }

    /// On approval the joiner becomes a member, the escrowed stake moves to
    /// the staking address and is recorded in the stake book.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &mut MemberRegistry,
        stakes: &mut StakeBook,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalStatus> {
        if !members.is_founder(community_id, caller) {
            return Err(GovernanceError::authorization(
                "just founders of community can vote on joining request",
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
                let joiner = &proposal.payload.joining_address;
                if let Some(receipt) = &proposal.escrow {
                    for pull in &receipt.pulls {
                        ledger.transfer(
                            &pull.symbol,
                            &custody,
                            &community.staking_address,
                            pull.amount,
                        )?;
                        stakes.record(&proposal.community_id, joiner, &pull.symbol, pull.amount);
                    }
                }
                members.update_member(&proposal.community_id, joiner, MemberRole::Member, 0);
                tracing::info!(community = %proposal.community_id, %joiner, "member admitted");
                Ok(())
            },
        )
    }

    /// Withdraw an active request; any staked escrow returns to the joiner.
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

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<JoiningParams>> {
        self.engine.get(proposal_id)
    }
}
