//! The generic proposal lifecycle engine.
//!
//! Every governance module (community creation, token issuance, airdrop,
//! allocation, member ejection, treasury transfer, bidding, buying, joining)
//! is the same state machine with a different payload: register a proposal
//! against a community, collect one decision per eligible voter, tally the
//! weighted approvals against a consensus threshold, run the module's side
//! effect exactly once on approval, and reverse any escrowed funds on
//! cancellation or rejection.
//!
//! [`ProposalEngine`] is that state machine, parameterized by the payload
//! type. Module facades own payload validation and the execution callback;
//! the engine owns the proposal arena, the voting ledger and the escrow
//! policy.

pub mod engine;
pub mod escrow;
pub mod proposal;

pub use engine::{CreateSpec, ProposalEngine};
pub use escrow::{EscrowReceipt, FundingPlan, Pull};
pub use proposal::{Approval, Proposal, Tally};
