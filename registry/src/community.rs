//! Community records: creation parameters, validation, master list.

use commune_ledger::TokenRegistry;
use commune_types::{
    Address, CommunityId, EntryCondition, EntryPolicy, GovernanceError, GovernanceResult,
    Timestamp, BPS_DENOMINATOR, DAY_SECS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything a creation proposal carries. Entry policy arrives as the raw
/// string + condition list of the external call surface and is parsed during
/// validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommunityParams {
    /// The address that becomes the community id once finalized.
    pub community_address: Address,
    /// Founders with bps shares; the sum must be exactly 10000.
    pub founders: Vec<(Address, u64)>,
    pub entry_type: String,
    pub entry_conditions: Vec<EntryCondition>,
    pub founders_voting_time: u64,
    pub founders_consensus: u32,
    pub treasury_voting_time: u64,
    pub treasury_consensus: u32,
    pub escrow_address: Address,
    pub staking_address: Address,
    pub treasury_address: Address,
}

impl CommunityParams {
    pub fn is_founder(&self, address: &Address) -> bool {
        self.founders.iter().any(|(a, _)| a == address)
    }

    /// Validate every creation parameter, in the order the call surface
    /// reports them, and parse the entry policy. Pure: no registry mutation.
    pub fn validate(&self, tokens: &TokenRegistry) -> GovernanceResult<EntryPolicy> {
        let policy = EntryPolicy::parse(&self.entry_type, self.entry_conditions.clone())
            .ok_or_else(|| GovernanceError::validation("wrong entry type of the community"))?;
        if policy.is_staking() && self.entry_conditions.is_empty() {
            return Err(GovernanceError::validation(
                "entry conditions should be defined by staking option",
            ));
        }
        if !policy.is_staking() && !self.entry_conditions.is_empty() {
            return Err(GovernanceError::validation(
                "entry conditions should not be defined by not staking option",
            ));
        }
        let shares: u64 = self.founders.iter().map(|(_, s)| s).sum();
        if shares != BPS_DENOMINATOR as u64 {
            return Err(GovernanceError::validation(
                "founders shares sum should be 10000",
            ));
        }
        if self.founders_voting_time < DAY_SECS {
            return Err(GovernanceError::validation(
                "founders voting time should be longer than 1 day",
            ));
        }
        if self.treasury_voting_time < DAY_SECS {
            return Err(GovernanceError::validation(
                "treasury voting time should be longer than 1 day",
            ));
        }
        if self.founders_consensus > BPS_DENOMINATOR {
            return Err(GovernanceError::validation(
                "founders consensus should be between 0 and 10000",
            ));
        }
        if self.treasury_consensus > BPS_DENOMINATOR {
            return Err(GovernanceError::validation(
                "treasury consensus should be between 0 and 10000",
            ));
        }
        for condition in &self.entry_conditions {
            if !tokens.exists(&condition.symbol) {
                return Err(GovernanceError::validation(
                    "entry conditions token with symbol does not exist",
                ));
            }
        }
        for condition in &self.entry_conditions {
            if condition.amount == 0 {
                return Err(GovernanceError::validation(
                    "entry condition token amount should be greater than 0",
                ));
            }
        }
        Ok(policy)
    }
}

/// A finalized community. Immutable except through dedicated modules
/// (token issuance links `token_id`, membership modules edit the roster).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub founders: Vec<(Address, u64)>,
    pub entry_policy: EntryPolicy,
    pub founders_voting_time: u64,
    pub founders_consensus: u32,
    pub treasury_voting_time: u64,
    pub treasury_consensus: u32,
    pub escrow_address: Address,
    pub staking_address: Address,
    pub treasury_address: Address,
    pub created_at: Timestamp,
    /// Id of the associated community token, once issued. 0 = none.
    pub token_id: u64,
}

/// Master list of finalized communities, keyed by id, with creation order
/// preserved for id-by-index reads.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommunityRegistry {
    communities: HashMap<CommunityId, Community>,
    ids: Vec<CommunityId>,
}

impl CommunityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize a validated community. Called from the creation proposal's
    /// execution, never directly.
    pub fn insert(
        &mut self,
        params: &CommunityParams,
        entry_policy: EntryPolicy,
        created_at: Timestamp,
    ) -> GovernanceResult<CommunityId> {
        let id = params.community_address.clone();
        if self.communities.contains_key(&id) {
            return Err(GovernanceError::conflict("community already exists"));
        }
        tracing::info!(community = %id, founders = params.founders.len(), "community finalized");
        self.communities.insert(
            id.clone(),
            Community {
                id: id.clone(),
                founders: params.founders.clone(),
                entry_policy,
                founders_voting_time: params.founders_voting_time,
                founders_consensus: params.founders_consensus,
                treasury_voting_time: params.treasury_voting_time,
                treasury_consensus: params.treasury_consensus,
                escrow_address: params.escrow_address.clone(),
                staking_address: params.staking_address.clone(),
                treasury_address: params.treasury_address.clone(),
                created_at,
                token_id: 0,
            },
        );
        self.ids.push(id.clone());
        Ok(id)
    }

    pub fn exists(&self, id: &CommunityId) -> bool {
        self.communities.contains_key(id)
    }

    pub fn get(&self, id: &CommunityId) -> GovernanceResult<&Community> {
        self.communities
            .get(id)
            .ok_or_else(|| GovernanceError::not_found("community id is not valid"))
    }

    /// Link the community token created by a token-issuance proposal.
    pub fn set_token_id(&mut self, id: &CommunityId, token_id: u64) -> GovernanceResult<()> {
        let community = self
            .communities
            .get_mut(id)
            .ok_or_else(|| GovernanceError::not_found("community id is not valid"))?;
        community.token_id = token_id;
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    pub fn id_by_index(&self, index: usize) -> GovernanceResult<&CommunityId> {
        self.ids
            .get(index)
            .ok_or_else(|| GovernanceError::not_found("community index out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn params() -> CommunityParams {
        CommunityParams {
            community_address: addr("0xc0"),
            founders: vec![(addr("f0"), 5000), (addr("f1"), 2000), (addr("f2"), 3000)],
            entry_type: "Approval".into(),
            entry_conditions: vec![],
            founders_voting_time: 2 * DAY_SECS,
            founders_consensus: 9000,
            treasury_voting_time: 2 * DAY_SECS,
            treasury_consensus: 5000,
            escrow_address: addr("escrow"),
            staking_address: addr("staking"),
            treasury_address: addr("treasury"),
        }
    }

    #[test]
    fn valid_params_parse_their_policy() {
        let tokens = TokenRegistry::new();
        let policy = params().validate(&tokens).unwrap();
        assert_eq!(policy, EntryPolicy::Approval);
    }

    #[test]
    fn shares_must_sum_to_ten_thousand() {
        let tokens = TokenRegistry::new();
        let mut p = params();
        p.founders[0].1 = 4999;
        let err = p.validate(&tokens).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::validation("founders shares sum should be 10000")
        );
    }

    #[test]
    fn staking_requires_registered_conditions() {
        let mut tokens = TokenRegistry::new();
        let mut p = params();
        p.entry_type = "Staking".into();

        let err = p.validate(&tokens).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::validation("entry conditions should be defined by staking option")
        );

        p.entry_conditions = vec![EntryCondition { symbol: "USDC".into(), amount: 10_000 }];
        let err = p.validate(&tokens).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::validation("entry conditions token with symbol does not exist")
        );

        tokens.register_token("USD Coin", "USDC", addr("0xusdc"));
        assert!(p.validate(&tokens).is_ok());

        p.entry_conditions[0].amount = 0;
        let err = p.validate(&tokens).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::validation("entry condition token amount should be greater than 0")
        );
    }

    #[test]
    fn non_staking_rejects_conditions() {
        let tokens = TokenRegistry::new();
        let mut p = params();
        p.entry_conditions = vec![EntryCondition { symbol: "USDC".into(), amount: 1 }];
        let err = p.validate(&tokens).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::validation(
                "entry conditions should not be defined by not staking option"
            )
        );
    }

    #[test]
    fn voting_windows_have_a_one_day_floor() {
        let tokens = TokenRegistry::new();
        let mut p = params();
        p.founders_voting_time = DAY_SECS - 1;
        let err = p.validate(&tokens).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::validation("founders voting time should be longer than 1 day")
        );
    }

    #[test]
    fn registry_preserves_creation_order() {
        let tokens = TokenRegistry::new();
        let mut registry = CommunityRegistry::new();
        let mut p = params();
        let policy = p.validate(&tokens).unwrap();
        registry.insert(&p, policy.clone(), Timestamp::EPOCH).unwrap();
        p.community_address = addr("0xc1");
        registry.insert(&p, policy, Timestamp::EPOCH).unwrap();

        assert_eq!(registry.count(), 2);
        assert_eq!(registry.id_by_index(1).unwrap(), &addr("0xc1"));
        assert!(registry.id_by_index(2).is_err());
        assert!(registry.get(&addr("0xc0")).is_ok());
    }
}
