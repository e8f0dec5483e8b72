//! Airdrop proposals: founder-voted payouts of the community token.

use commune_engine::{CreateSpec, FundingPlan, Proposal, ProposalEngine};
use commune_ledger::TokenLedger;
use commune_registry::{CommunityRegistry, MemberRegistry};
use commune_token::TokenStore;
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus,
    Timestamp,
};
use serde::{Deserialize, Serialize};

/// Recipients and per-address amounts of one airdrop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AirdropParams {
    pub community_id: CommunityId,
    pub recipients: Vec<(Address, u128)>,
}

impl AirdropParams {
    pub fn total(&self) -> u128 {
        self.recipients.iter().map(|(_, amount)| amount).sum()
    }
}

/// The airdrop facade over the proposal engine.
#[derive(Clone, Debug)]
pub struct Airdrop {
    engine: ProposalEngine<AirdropParams>,
}

impl Airdrop {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("airdrop", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    /// The module's custody account; escrow sources must approve it.
    pub fn custody(&self) -> &Address {
        self.engine.custody()
    }

    /// Validate the payload against the token's free airdrop budget, then
    /// escrow the total, split between the community address and its escrow
    /// address.
    pub fn create_proposal(
        &mut self,
        caller: &Address,
        params: AirdropParams,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        tokens: &TokenStore,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        if params.community_id.is_zero() {
            return Err(GovernanceError::validation("communityId has to be defined"));
        }
        if params.recipients.is_empty() {
            return Err(GovernanceError::validation("recipients cant be empty"));
        }
        if params.recipients.iter().any(|(_, amount)| *amount == 0) {
            return Err(GovernanceError::validation(
                "amount of airdrop per address has to be positive number",
            ));
        }
        let community = communities.get(&params.community_id)?;
        let token = tokens.get(community.token_id)?;
        if params.total() > token.free_airdrop_budget() {
            return Err(GovernanceError::validation(
                "not enough tokens to propose this airdrop",
            ));
        }
        if !members.is_founder(&params.community_id, caller) {
            return Err(GovernanceError::authorization(
                "airdrop creator should be founder",
            ));
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

    /// On approval: pay every recipient from custody and consume the
    /// token's airdrop budget.
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
        if proposal_id == 0 {
            return Err(GovernanceError::validation("proposalId cannot be empty"));
        }
        if community_id.is_zero() {
            return Err(GovernanceError::validation("communityId cannot be empty"));
        }
        if !members.is_founder(community_id, caller) {
            return Err(GovernanceError::authorization("only founders can vote"));
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
                for (recipient, amount) in &proposal.payload.recipients {
                    ledger.transfer(&symbol, &custody, recipient, *amount)?;
                }
                tracing::info!(
                    proposal = proposal.id,
                    %symbol,
                    recipients = proposal.payload.recipients.len(),
                    total = proposal.payload.total(),
                    "airdrop paid out"
                );
                tokens.record_airdropped(token_id, proposal.payload.total())
            },
        )
    }

    /// Withdraw an active airdrop; the escrowed total returns to the
    /// community address.
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

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<AirdropParams>> {
        self.engine.get(proposal_id)
    }
}
