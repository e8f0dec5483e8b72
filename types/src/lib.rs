//! Fundamental types for the Commune governance engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, timestamps, role/status enums, entry policies, and
//! the common error taxonomy.

pub mod address;
pub mod error;
pub mod state;
pub mod time;

pub use address::Address;
pub use error::{GovernanceError, GovernanceResult};
pub use state::{EntryCondition, EntryPolicy, MemberRole, ProposalStatus, TokenCurve};
pub use time::{Timestamp, DAY_SECS};

/// A community is identified by its community address.
pub type CommunityId = Address;

/// Proposal ids are 1-based and monotonic per module; 0 means "no proposal".
pub type ProposalId = u64;

/// Basis points out of 10000. Founder shares and consensus thresholds use this scale.
pub const BPS_DENOMINATOR: u32 = 10_000;
