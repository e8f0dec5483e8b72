//! The in-process token book.

use crate::error::LedgerError;
use commune_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balances and allowances for every token symbol, keyed by holder.
///
/// All mutations use checked arithmetic; a failed transfer leaves the book
/// untouched. Balance conservation holds per symbol: transfers move value,
/// only `mint` creates it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    /// (symbol, holder) → balance.
    balances: HashMap<(String, Address), u128>,
    /// (symbol, owner, spender) → remaining allowance.
    allowances: HashMap<(String, Address, Address), u128>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, symbol: &str, holder: &Address) -> u128 {
        self.balances
            .get(&(symbol.to_string(), holder.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, symbol: &str, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(symbol.to_string(), owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Create `amount` new units of `symbol` for `to`.
    pub fn mint(&mut self, symbol: &str, to: &Address, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let entry = self
            .balances
            .entry((symbol.to_string(), to.clone()))
            .or_insert(0);
        *entry = entry.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Authorize `spender` to pull up to `amount` of `symbol` from `owner`.
    /// Overwrites any previous allowance, matching ERC-20 `approve`.
    pub fn approve(&mut self, symbol: &str, owner: &Address, spender: &Address, amount: u128) {
        self.allowances
            .insert((symbol.to_string(), owner.clone(), spender.clone()), amount);
    }

    /// Move `amount` of `symbol` from `from` to `to` (no allowance involved).
    pub fn transfer(
        &mut self,
        symbol: &str,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.debit(symbol, from, amount)?;
        self.credit(symbol, to, amount)?;
        tracing::debug!(%symbol, %from, %to, amount, "transfer");
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance. The allowance check runs before the balance check, so an
    /// unapproved pull reports "exceeds allowance" even when funds exist.
    pub fn transfer_from(
        &mut self,
        symbol: &str,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let key = (symbol.to_string(), from.clone(), spender.clone());
        let allowed = self.allowances.get(&key).copied().unwrap_or(0);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance);
        }
        self.debit(symbol, from, amount)?;
        self.credit(symbol, to, amount)?;
        self.allowances.insert(key, allowed - amount);
        tracing::debug!(%symbol, %spender, %from, %to, amount, "transfer_from");
        Ok(())
    }

    fn debit(&mut self, symbol: &str, holder: &Address, amount: u128) -> Result<(), LedgerError> {
        let key = (symbol.to_string(), holder.clone());
        let balance = self.balances.get(&key).copied().unwrap_or(0);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.balances.insert(key, balance - amount);
        Ok(())
    }

    fn credit(&mut self, symbol: &str, holder: &Address, amount: u128) -> Result<(), LedgerError> {
        let entry = self
            .balances
            .entry((symbol.to_string(), holder.clone()))
            .or_insert(0);
        *entry = entry.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }
}
