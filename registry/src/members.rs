//! Per-community member roster: roles and shares.

use commune_types::{Address, CommunityId, MemberRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One roster entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub address: Address,
    pub role: MemberRole,
    /// Founder shares are bps of 10000; treasurer shares weight treasury
    /// votes; plain members carry no voting weight.
    pub share: u64,
}

/// (community, address) → role + share. Founders are seeded when a community
/// is finalized; treasurers and members come and go through `update_member`
/// and the membership modules.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemberRegistry {
    rosters: HashMap<CommunityId, Vec<Member>>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the founder roster of a freshly finalized community.
    pub fn seed_founders(&mut self, community: &CommunityId, founders: &[(Address, u64)]) {
        let roster = self.rosters.entry(community.clone()).or_default();
        for (address, share) in founders {
            roster.push(Member {
                address: address.clone(),
                role: MemberRole::Founder,
                share: *share,
            });
        }
    }

    /// Privileged add-or-update used by the membership and treasury modules.
    pub fn update_member(
        &mut self,
        community: &CommunityId,
        address: &Address,
        role: MemberRole,
        share: u64,
    ) {
        let roster = self.rosters.entry(community.clone()).or_default();
        match roster.iter_mut().find(|m| &m.address == address) {
            Some(member) => {
                member.role = role;
                member.share = share;
            }
            None => roster.push(Member {
                address: address.clone(),
                role,
                share,
            }),
        }
        tracing::debug!(%community, %address, ?role, share, "member updated");
    }

    /// Drop an address from the roster. Used by eject execution.
    pub fn remove_member(&mut self, community: &CommunityId, address: &Address) {
        if let Some(roster) = self.rosters.get_mut(community) {
            roster.retain(|m| &m.address != address);
        }
    }

    pub fn role_of(&self, community: &CommunityId, address: &Address) -> Option<MemberRole> {
        self.rosters
            .get(community)?
            .iter()
            .find(|m| &m.address == address)
            .map(|m| m.role)
    }

    pub fn is_founder(&self, community: &CommunityId, address: &Address) -> bool {
        self.role_of(community, address) == Some(MemberRole::Founder)
    }

    pub fn is_treasurer(&self, community: &CommunityId, address: &Address) -> bool {
        self.role_of(community, address) == Some(MemberRole::Treasurer)
    }

    /// Whether the address belongs to the community in any role.
    pub fn is_member(&self, community: &CommunityId, address: &Address) -> bool {
        self.role_of(community, address).is_some()
    }

    pub fn shares_of(&self, community: &CommunityId, address: &Address) -> u64 {
        self.rosters
            .get(community)
            .and_then(|r| r.iter().find(|m| &m.address == address))
            .map(|m| m.share)
            .unwrap_or(0)
    }

    /// The founder roster with weights, for founder-gated proposals.
    pub fn founders(&self, community: &CommunityId) -> Vec<(Address, u64)> {
        self.roster_with_role(community, MemberRole::Founder)
    }

    /// The treasurer roster with weights, for treasury transfer proposals.
    pub fn treasurers(&self, community: &CommunityId) -> Vec<(Address, u64)> {
        self.roster_with_role(community, MemberRole::Treasurer)
    }

    pub fn members(&self, community: &CommunityId) -> &[Member] {
        self.rosters.get(community).map(Vec::as_slice).unwrap_or(&[])
    }

    fn roster_with_role(&self, community: &CommunityId, role: MemberRole) -> Vec<(Address, u64)> {
        self.rosters
            .get(community)
            .map(|roster| {
                roster
                    .iter()
                    .filter(|m| m.role == role)
                    .map(|m| (m.address.clone(), m.share))
                    .collect()
            })
            .unwrap_or_default()
    }
}
