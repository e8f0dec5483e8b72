use commune_types::GovernanceError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("transfer amount exceeds balance")]
    InsufficientBalance,

    #[error("transfer amount exceeds allowance")]
    InsufficientAllowance,

    #[error("token with symbol does not exist")]
    UnknownToken,

    #[error("amount cannot be zero")]
    ZeroAmount,

    #[error("balance overflow")]
    Overflow,
}

impl From<LedgerError> for GovernanceError {
    fn from(err: LedgerError) -> Self {
        GovernanceError::Transfer(err.to_string())
    }
}
