//! Role, status and policy enums shared across the governance modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a proposal.
///
/// `Active` is the only non-terminal state. Exactly one execution (on
/// `Approved`) or escrow reversal (on `Rejected`/`Cancelled`) happens over a
/// proposal's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Open for voting.
    Active,
    /// Consensus reached; the side effect has run.
    Approved,
    /// Consensus became mathematically unreachable; escrow returned.
    Rejected,
    /// Withdrawn by its creator; escrow returned.
    Cancelled,
    /// Voting window elapsed without a decision.
    Expired,
}

impl ProposalStatus {
    /// Whether the proposal still accepts votes or cancellation.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// Role of an account within one community.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    /// Fixed, weighted voting member set at community creation.
    Founder,
    /// Granted post-creation; votes on treasury transfer proposals.
    Treasurer,
    /// Ordinary member without voting rights.
    Member,
}

/// One staking requirement for joining a community: hold (and stake) at
/// least `amount` of the token registered under `symbol`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCondition {
    pub symbol: String,
    pub amount: u128,
}

/// How new members enter a community.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPolicy {
    /// Anyone may join.
    OpenToJoin,
    /// Joining requests require founder approval.
    Approval,
    /// Joining requires staking every listed entry condition.
    Staking(Vec<EntryCondition>),
}

impl EntryPolicy {
    /// Parse the entry-type string of the external call surface, attaching
    /// the supplied conditions to the `Staking` variant.
    pub fn parse(entry_type: &str, conditions: Vec<EntryCondition>) -> Option<Self> {
        match entry_type {
            "OpenToJoin" => Some(Self::OpenToJoin),
            "Approval" => Some(Self::Approval),
            "Staking" => Some(Self::Staking(conditions)),
            _ => None,
        }
    }

    pub fn is_staking(&self) -> bool {
        matches!(self, Self::Staking(_))
    }

    pub fn conditions(&self) -> &[EntryCondition] {
        match self {
            Self::Staking(c) => c,
            _ => &[],
        }
    }
}

/// Bonding-curve shape of a community token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenCurve {
    Linear,
    Quadratic,
    Exponential,
    Sigmoid,
}

impl TokenCurve {
    /// Parse the curve names accepted by the external call surface.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LINEAR" => Some(Self::Linear),
            "QUADRATIC" => Some(Self::Quadratic),
            "EXPONENTIAL" => Some(Self::Exponential),
            "SIGMOID" => Some(Self::Sigmoid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_accepts_votes() {
        assert!(ProposalStatus::Active.is_active());
        for s in [
            ProposalStatus::Approved,
            ProposalStatus::Rejected,
            ProposalStatus::Cancelled,
            ProposalStatus::Expired,
        ] {
            assert!(!s.is_active());
        }
    }

    #[test]
    fn curve_names_parse() {
        assert_eq!(TokenCurve::parse("LINEAR"), Some(TokenCurve::Linear));
        assert_eq!(TokenCurve::parse("SIGMOID"), Some(TokenCurve::Sigmoid));
        assert_eq!(TokenCurve::parse("aaa"), None);
    }

    #[test]
    fn staking_policy_carries_conditions() {
        let conds = vec![EntryCondition { symbol: "USDC".into(), amount: 10_000 }];
        let policy = EntryPolicy::parse("Staking", conds.clone()).unwrap();
        assert!(policy.is_staking());
        assert_eq!(policy.conditions(), &conds[..]);
        assert_eq!(EntryPolicy::parse("", vec![]), None);
    }
}
