//! The common error taxonomy for governance operations.
//!
//! Every failure carries a human-readable reason string that is stable per
//! violated precondition; callers and tests match on these strings, so they
//! are part of the external contract. The variant tells callers *what kind*
//! of failure occurred; the message tells them *which* precondition broke.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    /// Malformed or out-of-range payload, detected before any state mutation.
    #[error("{0}")]
    Validation(String),

    /// The caller lacks the role required for this action.
    #[error("{0}")]
    Authorization(String),

    /// Unknown community, proposal or index.
    #[error("{0}")]
    NotFound(String),

    /// Double vote or double execution attempt.
    #[error("{0}")]
    Conflict(String),

    /// Insufficient balance/allowance surfaced by the funds ledger.
    #[error("{0}")]
    Transfer(String),

    /// Action attempted outside the proposal's current lifecycle state.
    #[error("{0}")]
    InvalidState(String),
}

impl GovernanceError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn authorization(reason: impl Into<String>) -> Self {
        Self::Authorization(reason.into())
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound(reason.into())
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    pub fn transfer(reason: impl Into<String>) -> Self {
        Self::Transfer(reason.into())
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }
}

pub type GovernanceResult<T> = Result<T, GovernanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_string_is_the_display() {
        let err = GovernanceError::validation("recipients cant be empty");
        assert_eq!(err.to_string(), "recipients cant be empty");
        assert!(matches!(err, GovernanceError::Validation(_)));
    }
}
