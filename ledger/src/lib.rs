//! Fungible-token ledger for the Commune governance engine.
//!
//! Governance treats token balances as an opaque ledger with the standard
//! `approve` / `transfer` / `transfer_from` / `balance_of` surface. This
//! crate provides that surface as a single in-process book keyed by
//! (token symbol, holder), plus the global symbol → contract registry that
//! entry conditions and transfer payloads resolve against.

pub mod error;
pub mod ledger;
pub mod registry;

pub use error::LedgerError;
pub use ledger::TokenLedger;
pub use registry::{TokenInfo, TokenRegistry};
