//! Membership changes: joining requests and member ejection.
//!
//! Joining a Staking community escrows the entry-condition amounts from the
//! joiner; admission forwards them to the community's staking address and
//! records them in the stake book. Ejection reverses that: the member's
//! recorded stake is escrowed from the staking address and paid out to the
//! ejected member on approval.

pub mod eject;
pub mod joining;
pub mod stakes;

pub use eject::{Eject, EjectParams};
pub use joining::{Joining, JoiningParams};
pub use stakes::StakeBook;
