//! Shared utilities for the Commune workspace.

pub mod logging;

pub use logging::init_tracing;
