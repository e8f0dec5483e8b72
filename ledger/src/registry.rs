//! Global token-symbol registry.

use commune_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered fungible token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub contract_address: Address,
}

/// symbol → token mapping, shared by every community.
///
/// Entry conditions, funding tokens and transfer payloads must resolve their
/// symbol here before a proposal is accepted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenRegistry {
    tokens: HashMap<String, TokenInfo>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) a token under its symbol.
    pub fn register_token(&mut self, name: &str, symbol: &str, contract_address: Address) {
        tracing::info!(%symbol, %contract_address, "token registered");
        self.tokens.insert(
            symbol.to_string(),
            TokenInfo {
                name: name.to_string(),
                symbol: symbol.to_string(),
                contract_address,
            },
        );
    }

    pub fn exists(&self, symbol: &str) -> bool {
        self.tokens.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens.get(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let mut registry = TokenRegistry::new();
        registry.register_token("USD Coin", "USDC", Address::new("0x2791"));
        assert!(registry.exists("USDC"));
        assert_eq!(registry.get("USDC").unwrap().name, "USD Coin");
        assert!(!registry.exists("ETH"));
    }
}
