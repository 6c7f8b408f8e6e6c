//! Domain error model.

use thiserror::Error;

use crate::amount::Currency;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic value failures (parsing, arithmetic,
/// construction). Contract verdicts and host failures have their own types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed currency code).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Two amounts of different currencies were combined.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// Minor-unit arithmetic left the representable range.
    #[error("amount overflow")]
    Overflow,

    /// Subtraction would produce a negative amount.
    #[error("insufficient amount: {available} available, {requested} requested")]
    InsufficientAmount { available: u64, requested: u64 },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn currency_mismatch(left: Currency, right: Currency) -> Self {
        Self::CurrencyMismatch { left, right }
    }
}
