//! Token distribution: airdrops and allocations.
//!
//! Both modules spend the community token's issuance budgets. Creation
//! escrows the full amount, split between the community address and its
//! escrow address; approval pays the recipients from custody and bumps the
//! corresponding budget counter; cancellation or rejection refunds the
//! community address in full.

pub mod airdrop;
pub mod allocation;

pub use airdrop::{Airdrop, AirdropParams};
pub use allocation::{Allocation, AllocationParams};
