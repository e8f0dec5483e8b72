//! Account address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account address. Wallets, communities, contracts and token ledgers all
/// share this identifier space.
///
/// Addresses are opaque strings supplied by the caller (the engine never
/// derives them). The all-zero address is reserved as the "no address"
/// sentinel and is rejected everywhere a real account is required.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The reserved zero address.
    pub const ZERO_STR: &'static str = "0x0000000000000000000000000000000000000000";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The zero-address sentinel.
    pub fn zero() -> Self {
        Self(Self::ZERO_STR.to_string())
    }

    /// Whether this is the reserved zero address (or empty).
    pub fn is_zero(&self) -> bool {
        self.0.is_empty() || self.0 == Self::ZERO_STR
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_address_is_detected() {
        assert!(Address::zero().is_zero());
        assert!(Address::new("").is_zero());
        assert!(!Address::new("0xabc123").is_zero());
    }
}
