//! Treasury transfers.
//!
//! The one module voted by treasurers rather than founders: a founder or
//! treasurer proposes paying `amount` of a registered token to a recipient,
//! and the treasurer roster tallies against the community's treasury
//! consensus. The amount is escrowed at creation, split between the
//! community address and its escrow address.

pub mod transfer;

pub use transfer::{Transfer, TransferParams};
