use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LendingError {
    #[error("Invalid loan terms: {field} — {reason}")]
    InvalidLoanTerms { field: String, reason: String },

    #[error("Overpayment rejected: requested {requested} exceeds outstanding balance {outstanding}")]
    OverpaymentRejected {
        requested: Decimal,
        outstanding: Decimal,
    },

    #[error("Insufficient treasury funds in account {account_id}: requested {requested}, available {available}")]
    InsufficientTreasuryFunds {
        account_id: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Chain integrity violation: {0}")]
    ChainIntegrityViolation(String),

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LendingError {
    fn from(e: serde_json::Error) -> Self {
        LendingError::SerializationError(e.to_string())
    }
}

impl From<chrono::ParseError> for LendingError {
    fn from(e: chrono::ParseError) -> Self {
        LendingError::DateError(e.to_string())
    }
}
