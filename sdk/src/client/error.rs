//! Client error types.
//!
//! Provides error types for ledger RPC and market client operations.

use std::fmt;

use solana_sdk::pubkey::Pubkey;

use crate::error::SdkError;

/// Client errors.
#[derive(Debug)]
pub enum ClientError {
    /// HTTP request failed.
    Request(reqwest::Error),

    /// Failed to deserialize response.
    Deserialization(String),

    /// The node answered with a JSON-RPC error object.
    ///
    /// Displays as the node's message, unchanged.
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The market has not been initialized.
    NotReady,

    /// Account does not exist.
    AccountNotFound(Pubkey),

    /// Invalid configuration.
    InvalidConfig(String),

    /// Request timeout.
    Timeout,

    /// Account decoding or instruction encoding failed.
    Sdk(SdkError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "HTTP request failed: {}", e),
            Self::Deserialization(msg) => write!(f, "deserialization failed: {}", msg),
            Self::Rpc { message, .. } => f.write_str(message),
            Self::NotReady => write!(f, "market not initialized"),
            Self::AccountNotFound(address) => write!(f, "account not found: {}", address),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Self::Timeout => write!(f, "request timeout"),
            Self::Sdk(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(e) => Some(e),
            Self::Sdk(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}

impl From<SdkError> for ClientError {
    fn from(err: SdkError) -> Self {
        Self::Sdk(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}
