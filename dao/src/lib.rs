//! The top of the governance stack.
//!
//! [`Creation`] is the proposal module that brings communities into
//! existence; [`CommunityDao`] owns the shared state (ledger, registries,
//! token store, stake book) and wires every module facade behind one call
//! surface with an explicit caller and timestamp on each operation.

pub mod creation;
pub mod dao;

pub use creation::Creation;
pub use dao::{CommunityDao, DaoConfig};
