//! Community-creation proposals.
//!
//! The bootstrap module: the voter roster comes from the proposed founder
//! list itself, since the community does not exist until the proposal is
//! approved. Execution finalizes the community in the registry and seeds
//! its founder roster.

use commune_engine::{CreateSpec, Proposal, ProposalEngine};
use commune_ledger::{TokenLedger, TokenRegistry};
use commune_registry::{CommunityParams, CommunityRegistry, MemberRegistry};
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus,
    Timestamp,
};

/// The creation facade over the proposal engine.
#[derive(Clone, Debug)]
pub struct Creation {
    engine: ProposalEngine<CommunityParams>,
}

impl Creation {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("creation", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    pub fn create_proposal(
        &mut self,
        caller: &Address,
        params: CommunityParams,
        now: Timestamp,
        registry: &TokenRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        if !params.is_founder(caller) {
            return Err(GovernanceError::authorization(
                "creator should be one of founders",
            ));
        }
        params.validate(registry)?;

        let spec = CreateSpec {
            community_id: params.community_address.clone(),
            creator: caller.clone(),
            roster: params.founders.clone(),
            threshold_bps: params.founders_consensus,
            voting_window_secs: params.founders_voting_time,
            funding: None,
        };
        self.engine.create(spec, params, now, ledger)
    }

    /// On approval the community becomes queryable: registry insert plus
    /// founder roster seed.
    #[allow(clippy::too_many_arguments)]
    pub fn vote(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        registry: &TokenRegistry,
        communities: &mut CommunityRegistry,
        members: &mut MemberRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalStatus> {
        if community_id.is_zero() {
            return Err(GovernanceError::not_found("community id is not valid"));
        }
        let proposal = self.engine.get(proposal_id).map_err(|_| {
            GovernanceError::not_found("community creation proposal id is not valid")
        })?;
        if !proposal.is_eligible_voter(caller) {
            return Err(GovernanceError::authorization("voter should be founder"));
        }
        self.engine.vote_with(
            proposal_id,
            community_id,
            caller,
            decision,
            now,
            ledger,
            |proposal, _ledger| {
                let policy = proposal.payload.validate(registry)?;
                let id = communities.insert(&proposal.payload, policy, now)?;
                members.seed_founders(&id, &proposal.payload.founders);
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

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<CommunityParams>> {
        self.engine.get(proposal_id)
    }
}
