//! Demo configuration.
//!
//! Read from environment variables, with mainnet SOL/USDC defaults.

use std::env;
use std::str::FromStr;

use serum_market_sdk::Commitment;
use solana_sdk::pubkey::Pubkey;

/// Default RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Serum v3 program on mainnet.
pub const DEFAULT_PROGRAM_ID: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

/// SOL/USDC market on mainnet.
pub const DEFAULT_MARKET_ADDRESS: &str = "9wFFyRfZBsuAha4YcuxcXLKwMxJR43S7fPfQLusDBzvT";

/// Default number of levels printed per side.
pub const DEFAULT_DEPTH: usize = 5;

/// Upper bound on the printed depth.
pub const MAX_DEPTH: usize = 100;

/// How the demo picks its market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSelector {
    /// A known market address.
    Address(Pubkey),
    /// The first market trading this base/quote mint pair.
    Mints {
        /// Base token mint.
        base: Pubkey,
        /// Quote token mint.
        quote: Pubkey,
    },
}

/// Configuration for the demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,

    /// Commitment for reads.
    pub commitment: Commitment,

    /// DEX program (base58).
    pub program_id: String,

    /// Market address (base58).
    pub market_address: String,

    /// Base mint (base58). Used with `quote_mint` to search by pair.
    pub base_mint: Option<String>,

    /// Quote mint (base58).
    pub quote_mint: Option<String>,

    /// Levels printed per side.
    pub depth: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: Commitment::Confirmed,
            program_id: DEFAULT_PROGRAM_ID.to_string(),
            market_address: DEFAULT_MARKET_ADDRESS.to_string(),
            base_mint: None,
            quote_mint: None,
            depth: DEFAULT_DEPTH,
        }
    }
}

impl DemoConfig {
    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or enumerated variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or enumerated variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let commitment = match lookup("SOLANA_COMMITMENT") {
            Some(value) => Commitment::from_str(&value)
                .map_err(|_| ConfigError::InvalidCommitment(value))?,
            None => defaults.commitment,
        };

        let depth = match lookup("ORDERBOOK_DEPTH") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidDepth(value))?,
            None => defaults.depth,
        };

        Ok(Self {
            rpc_url: lookup("SOLANA_RPC_URL").unwrap_or(defaults.rpc_url),
            commitment,
            program_id: lookup("SERUM_PROGRAM_ID").unwrap_or(defaults.program_id),
            market_address: lookup("SERUM_MARKET_ADDRESS").unwrap_or(defaults.market_address),
            base_mint: lookup("SERUM_BASE_MINT"),
            quote_mint: lookup("SERUM_QUOTE_MINT"),
            depth,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(ConfigError::InvalidRpcUrl(self.rpc_url.clone()));
        }

        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(ConfigError::InvalidDepth(self.depth.to_string()));
        }

        self.parse_program_id()?;
        self.market_selector()?;

        Ok(())
    }

    /// Parses the program id.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn parse_program_id(&self) -> Result<Pubkey, ConfigError> {
        parse_address("SERUM_PROGRAM_ID", &self.program_id)
    }

    /// Resolves which market to open: the mint pair when both mints are
    /// set, the market address otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if an address is invalid or only one mint is set.
    pub fn market_selector(&self) -> Result<MarketSelector, ConfigError> {
        match (&self.base_mint, &self.quote_mint) {
            (Some(base), Some(quote)) => Ok(MarketSelector::Mints {
                base: parse_address("SERUM_BASE_MINT", base)?,
                quote: parse_address("SERUM_QUOTE_MINT", quote)?,
            }),
            (None, None) => Ok(MarketSelector::Address(parse_address(
                "SERUM_MARKET_ADDRESS",
                &self.market_address,
            )?)),
            _ => Err(ConfigError::IncompleteMintPair),
        }
    }
}

fn parse_address(name: &'static str, value: &str) -> Result<Pubkey, ConfigError> {
    Pubkey::from_str(value).map_err(|_| ConfigError::InvalidAddress {
        name,
        value: value.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// RPC URL has no http(s) scheme.
    #[error("invalid rpc url: {0}")]
    InvalidRpcUrl(String),

    /// Invalid base58 address.
    #[error("invalid {name}: {value}")]
    InvalidAddress {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// Only one of the two mints was given.
    #[error("SERUM_BASE_MINT and SERUM_QUOTE_MINT must be set together")]
    IncompleteMintPair,

    /// Depth is not a number in range.
    #[error("ORDERBOOK_DEPTH must be between 1 and 100, got {0}")]
    InvalidDepth(String),

    /// Unknown commitment level.
    #[error("invalid commitment: {0}")]
    InvalidCommitment(String),
}
