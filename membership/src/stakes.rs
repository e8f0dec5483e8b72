//! Per-member stake records.

use commune_types::{Address, CommunityId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What each member has staked to enter a community, per token symbol.
/// Written by joining execution, drained by eject execution.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StakeBook {
    stakes: HashMap<(CommunityId, Address), Vec<(String, u128)>>,
}

impl StakeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to a member's stake under `symbol`.
    pub fn record(&mut self, community: &CommunityId, member: &Address, symbol: &str, amount: u128) {
        let entries = self
            .stakes
            .entry((community.clone(), member.clone()))
            .or_default();
        match entries.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, staked)) => *staked += amount,
            None => entries.push((symbol.to_string(), amount)),
        }
    }

    pub fn stakes_of(&self, community: &CommunityId, member: &Address) -> &[(String, u128)] {
        self.stakes
            .get(&(community.clone(), member.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove and return a member's whole stake record.
    pub fn drain(&mut self, community: &CommunityId, member: &Address) -> Vec<(String, u128)> {
        self.stakes
            .remove(&(community.clone(), member.clone()))
            .unwrap_or_default()
    }
}
