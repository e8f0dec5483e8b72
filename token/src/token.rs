//! Community-token records and budget accounting.

use commune_types::{Address, CommunityId, GovernanceError, GovernanceResult, Timestamp, TokenCurve};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A token issued by one community. Budgets are fixed at issuance; the
/// counters track what the distribution modules have already committed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommunityToken {
    pub id: u64,
    pub community_id: CommunityId,
    pub name: String,
    pub symbol: String,
    pub contract_address: Address,
    /// Symbol of the token used to fund the bonding curve.
    pub funding_token: String,
    pub amm_address: Address,
    pub curve: TokenCurve,
    pub initial_supply: u128,
    pub target_price: u128,
    pub target_supply: u128,
    pub vesting_time: u64,
    pub immediate_allocation_pct: u64,
    pub vested_allocation_pct: u64,
    pub taxation_pct: u64,
    pub created_at: Timestamp,
    /// Total units reserved for airdrops over the token's lifetime.
    pub airdrop_budget: u128,
    /// Units paid out by approved airdrops.
    pub airdropped: u128,
    /// Total units reserved for allocations.
    pub allocation_budget: u128,
    /// Units transferred by approved allocations.
    pub allocated: u128,
}

impl CommunityToken {
    pub fn free_airdrop_budget(&self) -> u128 {
        self.airdrop_budget.saturating_sub(self.airdropped)
    }

    pub fn free_allocation_budget(&self) -> u128 {
        self.allocation_budget.saturating_sub(self.allocated)
    }
}

/// All issued community tokens, keyed by a 1-based monotonic id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenStore {
    next_id: u64,
    tokens: HashMap<u64, CommunityToken>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self { next_id: 1, tokens: HashMap::new() }
    }

    /// Record a freshly approved token and hand back its id.
    pub fn insert(&mut self, mut token: CommunityToken) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        token.id = id;
        tracing::info!(token = id, symbol = %token.symbol, community = %token.community_id, "community token recorded");
        self.tokens.insert(id, token);
        id
    }

    pub fn get(&self, id: u64) -> GovernanceResult<&CommunityToken> {
        self.tokens
            .get(&id)
            .ok_or_else(|| GovernanceError::not_found("token id is not valid"))
    }

    pub fn count(&self) -> u64 {
        self.tokens.len() as u64
    }

    /// Consume airdrop budget. Callers check the free budget first; this is
    /// the final gate.
    pub fn record_airdropped(&mut self, id: u64, amount: u128) -> GovernanceResult<()> {
        let token = self
            .tokens
            .get_mut(&id)
            .ok_or_else(|| GovernanceError::not_found("token id is not valid"))?;
        if amount > token.free_airdrop_budget() {
            return Err(GovernanceError::validation(
                "not enough tokens to propose this airdrop",
            ));
        }
        token.airdropped += amount;
        Ok(())
    }

    /// Consume allocation budget.
    pub fn record_allocated(&mut self, id: u64, amount: u128) -> GovernanceResult<()> {
        let token = self
            .tokens
            .get_mut(&id)
            .ok_or_else(|| GovernanceError::not_found("token id is not valid"))?;
        if amount > token.free_allocation_budget() {
            return Err(GovernanceError::validation(
                "number of free tokens to allocate is not enough",
            ));
        }
        token.allocated += amount;
        Ok(())
    }
}
