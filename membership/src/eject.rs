//! Eject-member proposals.

use crate::stakes::StakeBook;
use commune_engine::{CreateSpec, FundingPlan, Proposal, ProposalEngine, Pull};
use commune_ledger::TokenLedger;
use commune_registry::{CommunityRegistry, MemberRegistry};
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus,
    Timestamp,
};
use serde::{Deserialize, Serialize};

/// Target of one ejection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EjectParams {
    pub community_id: CommunityId,
    pub member_address: Address,
}

/// The eject-member facade over the proposal engine.
#[derive(Clone, Debug)]
pub struct Eject {
    engine: ProposalEngine<EjectParams>,
}

impl Eject {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("eject", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    pub fn custody(&self) -> &Address {
        self.engine.custody()
    }

    /// The member's recorded stake is escrowed from the community's staking
    /// address; it goes back there unless the ejection is approved.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proposal(
        &mut self,
        caller: &Address,
        params: EjectParams,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        stakes: &StakeBook,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        if !members.is_founder(&params.community_id, caller) {
            return Err(GovernanceError::authorization("creator should be founder"));
        }
        if !members.is_member(&params.community_id, &params.member_address) {
            return Err(GovernanceError::not_found(
                "address is not a member of the community",
            ));
        }
        let community = communities.get(&params.community_id)?;

        let staked = stakes.stakes_of(&params.community_id, &params.member_address);
        let funding = if staked.is_empty() {
            None
        } else {
            let pulls = staked
                .iter()
                .map(|(symbol, amount)| Pull {
                    symbol: symbol.clone(),
                    source: community.staking_address.clone(),
                    amount: *amount,
                })
                .collect();
            Some(FundingPlan { pulls, refund_to: community.staking_address.clone() })
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

    /// On approval the member is removed and their stake is paid out to
    /// them from custody.
    #[allow(clippy::too_many_arguments)]
    pub fn vote(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        members: &mut MemberRegistry,
        stakes: &mut StakeBook,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalStatus> {
        if !members.is_founder(community_id, caller) {
            return Err(GovernanceError::authorization(
                "voter has to be a founder of the community",
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
                let ejected = &proposal.payload.member_address;
                if let Some(receipt) = &proposal.escrow {
                    for pull in &receipt.pulls {
                        ledger.transfer(&pull.symbol, &custody, ejected, pull.amount)?;
                    }
                }
                stakes.drain(&proposal.community_id, ejected);
                members.remove_member(&proposal.community_id, ejected);
                tracing::info!(community = %proposal.community_id, %ejected, "member ejected");
                Ok(())
            },
        )
    }

    /// Withdraw an active ejection; the stake returns to the staking address.
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

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<EjectParams>> {
        self.engine.get(proposal_id)
    }
}
