//! Escrow pulls and their reversal.
//!
//! When a proposal needs funds (airdrop, allocation, transfer, bid, buying,
//! joining stakes), creation reserves them: each pull moves tokens from a
//! source account into the module's custody account via allowance. The
//! receipt stays on the proposal so cancellation or rejection can return
//! everything. Which sources fund a proposal, and where refunds go, is
//! per-module policy: the facade builds the plan, the engine executes it.

use commune_types::{Address, GovernanceResult};
use commune_ledger::TokenLedger;
use serde::{Deserialize, Serialize};

/// One escrow movement: `amount` of `symbol` out of `source`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pull {
    pub symbol: String,
    pub source: Address,
    pub amount: u128,
}

/// What a proposal pulls into custody at creation, and who is made whole if
/// it never executes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingPlan {
    pub pulls: Vec<Pull>,
    /// All refunds go to this account (full reversal, single destination).
    pub refund_to: Address,
}

impl FundingPlan {
    /// A plan that splits `amount` evenly between two sources, giving any
    /// odd unit to the first. Refunds go to the first source.
    pub fn split_two(symbol: &str, first: &Address, second: &Address, amount: u128) -> Self {
        let half = amount / 2;
        Self {
            pulls: vec![
                Pull {
                    symbol: symbol.to_string(),
                    source: first.clone(),
                    amount: amount - half,
                },
                Pull {
                    symbol: symbol.to_string(),
                    source: second.clone(),
                    amount: half,
                },
            ],
            refund_to: first.clone(),
        }
    }

    /// A plan that pulls the whole amount from one source and refunds there.
    pub fn single(symbol: &str, source: &Address, amount: u128) -> Self {
        Self {
            pulls: vec![Pull {
                symbol: symbol.to_string(),
                source: source.clone(),
                amount,
            }],
            refund_to: source.clone(),
        }
    }

}

/// Record of executed pulls, kept on the proposal until a terminal state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowReceipt {
    pub pulls: Vec<Pull>,
    pub refund_to: Address,
}

impl EscrowReceipt {
    /// Execute the plan: pull everything into `custody`. If a later pull
    /// fails, the earlier ones are unwound so the whole reservation is
    /// all-or-nothing.
    pub(crate) fn reserve(
        plan: FundingPlan,
        custody: &Address,
        ledger: &mut TokenLedger,
    ) -> GovernanceResult<Self> {
        let mut done: Vec<Pull> = Vec::with_capacity(plan.pulls.len());
        for pull in &plan.pulls {
            if pull.amount == 0 {
                continue;
            }
            match ledger.transfer_from(&pull.symbol, custody, &pull.source, custody, pull.amount) {
                Ok(()) => done.push(pull.clone()),
                Err(err) => {
                    for undone in done.iter().rev() {
                        // Custody just received these funds; returning them
                        // cannot fail.
                        let _ = ledger.transfer(
                            &undone.symbol,
                            custody,
                            &undone.source,
                            undone.amount,
                        );
                    }
                    return Err(err.into());
                }
            }
        }
        Ok(Self {
            pulls: done,
            refund_to: plan.refund_to,
        })
    }

    /// Return every pulled amount to the refund account.
    pub(crate) fn refund(&self, custody: &Address, ledger: &mut TokenLedger) -> GovernanceResult<()> {
        for pull in &self.pulls {
            ledger.transfer(&pull.symbol, custody, &self.refund_to, pull.amount)?;
        }
        tracing::debug!(refund_to = %self.refund_to, pulls = self.pulls.len(), "escrow refunded");
        Ok(())
    }
}
