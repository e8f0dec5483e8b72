//! Community configuration and member rosters.
//!
//! The community registry is the master list of finalized communities with
//! their governance parameters; the member registry maps (community, address)
//! to a role and share. Both are shared-read by every governance module and
//! mutated only through their own entry points.

pub mod community;
pub mod members;

pub use community::{Community, CommunityParams, CommunityRegistry};
pub use members::{Member, MemberRegistry};
