//! The token-issuance proposal facade.

use crate::token::{CommunityToken, TokenStore};
use commune_engine::{CreateSpec, Proposal, ProposalEngine};
use commune_ledger::{TokenLedger, TokenRegistry};
use commune_registry::{CommunityRegistry, MemberRegistry};
use commune_types::{
    Address, CommunityId, GovernanceError, GovernanceResult, ProposalId, ProposalStatus,
    Timestamp, TokenCurve, DAY_SECS,
};
use serde::{Deserialize, Serialize};

const VESTING_FLOOR_SECS: u64 = 30 * DAY_SECS;

/// The issuance payload, as submitted on the external call surface. The
/// curve arrives as its raw name and is parsed during validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenParams {
    pub community_id: CommunityId,
    pub token_name: String,
    pub token_symbol: String,
    pub token_contract_address: Address,
    pub funding_token: String,
    pub amm_address: Address,
    pub token_type: String,
    pub initial_supply: u128,
    pub target_price: u128,
    pub target_supply: u128,
    pub vesting_time: u64,
    pub immediate_allocation_pct: u64,
    pub vested_allocation_pct: u64,
    pub taxation_pct: u64,
    /// Lifetime airdrop budget of the new token.
    pub airdrop_amount: u128,
    /// Lifetime allocation budget of the new token.
    pub allocation_amount: u128,
}

impl TokenParams {
    fn validate(&self) -> GovernanceResult<TokenCurve> {
        if self.community_id.is_zero() {
            return Err(GovernanceError::validation("communityId can't be zero"));
        }
        if self.token_symbol.is_empty() {
            return Err(GovernanceError::validation("tokenSymbol can't be empty"));
        }
        if self.token_name.is_empty() {
            return Err(GovernanceError::validation("tokenName can't be empty"));
        }
        let curve = TokenCurve::parse(&self.token_type).ok_or_else(|| {
            GovernanceError::validation(
                "accepted token types are only: LINEAR, QUADRATIC, EXPONENTIAL and SIGMOID",
            )
        })?;
        if self.funding_token.is_empty() {
            return Err(GovernanceError::validation("fundingToken can't be empty"));
        }
        if self.initial_supply == 0 {
            return Err(GovernanceError::validation("initialSupply can't be 0"));
        }
        if self.target_price == 0 {
            return Err(GovernanceError::validation("targetPrice can't be 0"));
        }
        if self.target_supply == 0 {
            return Err(GovernanceError::validation("targetSupply can't be 0"));
        }
        if self.vesting_time < VESTING_FLOOR_SECS {
            return Err(GovernanceError::validation(
                "vesting time should be longer than 30 days",
            ));
        }
        if self.immediate_allocation_pct == 0 {
            return Err(GovernanceError::validation(
                "immediateAllocationPct can't be 0",
            ));
        }
        if self.vested_allocation_pct == 0 {
            return Err(GovernanceError::validation("vestedAllocationPct can't be 0"));
        }
        if self.taxation_pct == 0 {
            return Err(GovernanceError::validation("taxationPct can't be 0"));
        }
        Ok(curve)
    }
}

/// Founder-voted issuance of a community token.
#[derive(Clone, Debug)]
pub struct TokenIssuance {
    engine: ProposalEngine<TokenParams>,
}

impl TokenIssuance {
    pub fn new(custody: Address) -> Self {
        Self { engine: ProposalEngine::new("token-issuance", custody) }
    }

    pub fn set_enforce_voting_window(&mut self, enforce: bool) {
        self.engine.set_enforce_voting_window(enforce);
    }

    pub fn create_proposal(
        &mut self,
        caller: &Address,
        params: TokenParams,
        now: Timestamp,
        communities: &CommunityRegistry,
        members: &MemberRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalId> {
        params.validate()?;
        if !members.is_founder(&params.community_id, caller) {
            return Err(GovernanceError::authorization("creator should be founder"));
        }
        let community = communities.get(&params.community_id)?;

        let spec = CreateSpec {
            community_id: params.community_id.clone(),
            creator: caller.clone(),
            roster: members.founders(&params.community_id),
            threshold_bps: community.founders_consensus,
            voting_window_secs: community.founders_voting_time,
            funding: None,
        };
        self.engine.create(spec, params, now, ledger)
    }

    /// On the approving vote the token is recorded with its budgets, its
    /// symbol joins the global registry and the community links the id.
    #[allow(clippy::too_many_arguments)]
    pub fn vote(
        &mut self,
        caller: &Address,
        proposal_id: ProposalId,
        community_id: &CommunityId,
        decision: bool,
        now: Timestamp,
        communities: &mut CommunityRegistry,
        members: &MemberRegistry,
        tokens: &mut TokenStore,
        registry: &mut TokenRegistry,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<ProposalStatus> {
        if !members.is_founder(community_id, caller) {
            return Err(GovernanceError::authorization(
                "voter has to be a founder of the community",
            ));
        }
        self.engine.vote_with(
            proposal_id,
            community_id,
            caller,
            decision,
            now,
            ledger,
            |proposal, _ledger| {
                let id = tokens.insert(Self::token_from(proposal)?);
                registry.register_token(
                    &proposal.payload.token_name,
                    &proposal.payload.token_symbol,
                    proposal.payload.token_contract_address.clone(),
                );
                communities.set_token_id(&proposal.community_id, id)
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

    pub fn get(&self, proposal_id: ProposalId) -> GovernanceResult<&Proposal<TokenParams>> {
        self.engine.get(proposal_id)
    }

    fn token_from(proposal: &Proposal<TokenParams>) -> GovernanceResult<CommunityToken> {
        let p = &proposal.payload;
        // Already validated at creation.
        let curve = TokenCurve::parse(&p.token_type).ok_or_else(|| {
            GovernanceError::validation(
                "accepted token types are only: LINEAR, QUADRATIC, EXPONENTIAL and SIGMOID",
            )
        })?;
        Ok(CommunityToken {
            id: 0,
            community_id: p.community_id.clone(),
            name: p.token_name.clone(),
            symbol: p.token_symbol.clone(),
            contract_address: p.token_contract_address.clone(),
            funding_token: p.funding_token.clone(),
            amm_address: p.amm_address.clone(),
            curve,
            initial_supply: p.initial_supply,
            target_price: p.target_price,
            target_supply: p.target_supply,
            vesting_time: p.vesting_time,
            immediate_allocation_pct: p.immediate_allocation_pct,
            vested_allocation_pct: p.vested_allocation_pct,
            taxation_pct: p.taxation_pct,
            created_at: proposal.created_at,
            airdrop_budget: p.airdrop_amount,
            airdropped: 0,
            allocation_budget: p.allocation_amount,
            allocated: 0,
        })
    }
}
