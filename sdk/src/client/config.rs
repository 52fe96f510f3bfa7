//! Connection configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ClientError;

/// Default RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ledger commitment level attached to reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Processed by the connected node.
    Processed,
    /// Voted on by a supermajority.
    #[default]
    Confirmed,
    /// Rooted.
    Finalized,
}

impl Commitment {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Commitment {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(ClientError::InvalidConfig(format!(
                "unknown commitment: {}",
                other
            ))),
        }
    }
}

/// RPC connection configuration.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Commitment for reads.
    pub commitment: Commitment,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            commitment: Commitment::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("serum-market-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RpcConfig {
    /// Creates a new configuration with the given endpoint URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the commitment level.
    #[must_use]
    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.url.is_empty() {
            return Err(ClientError::InvalidConfig(
                "url cannot be empty".to_string(),
            ));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ClientError::InvalidConfig(
                "url must start with http:// or https://".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RpcConfig::default();
        assert_eq!(config.url, DEFAULT_RPC_URL);
        assert_eq!(config.commitment, Commitment::Confirmed);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.user_agent.starts_with("serum-market-sdk/"));
    }

    #[test]
    fn test_config_builder() {
        let config = RpcConfig::new("https://api.devnet.solana.com")
            .with_commitment(Commitment::Finalized)
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("demo/1.0");

        assert_eq!(config.url, "https://api.devnet.solana.com");
        assert_eq!(config.commitment, Commitment::Finalized);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "demo/1.0");
    }

    #[test]
    fn test_config_validate() {
        assert!(RpcConfig::new("http://127.0.0.1:8899").validate().is_ok());
        assert!(RpcConfig::new("").validate().is_err());
        assert!(RpcConfig::new("ws://api.devnet.solana.com").validate().is_err());
        assert!(RpcConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_commitment_parse() {
        assert_eq!("processed".parse::<Commitment>().ok(), Some(Commitment::Processed));
        assert_eq!(Commitment::Finalized.to_string(), "finalized");
        assert!("recent".parse::<Commitment>().is_err());
    }
}
