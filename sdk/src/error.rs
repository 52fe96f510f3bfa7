//! SDK error types.
//!
//! Errors raised while decoding program accounts, converting between
//! human-readable numbers and on-chain lots, and encoding instructions.

/// SDK errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdkError {
    /// Invalid price value.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Invalid quantity value.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Invalid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Account data does not describe the expected program account.
    #[error("invalid {kind} account: {reason}")]
    InvalidAccount {
        /// Kind of account being decoded (market, bids, asks, mint...).
        kind: &'static str,
        /// Why the account was rejected.
        reason: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Arithmetic overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

impl SdkError {
    /// Shorthand for [`SdkError::InvalidAccount`].
    pub(crate) fn invalid_account(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAccount {
            kind,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}
