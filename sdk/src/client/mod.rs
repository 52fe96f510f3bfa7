//! JSON-RPC client for Solana-compatible ledger nodes.
//!
//! # Example
//!
//! ```rust,ignore
//! use serum_market_sdk::client::{Connection, RpcConfig, Commitment};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RpcConfig::new("https://api.devnet.solana.com")
//!         .with_commitment(Commitment::Confirmed);
//!     let connection = Connection::new(config)?;
//!
//!     let account = connection.get_account_info(&address).await?;
//!     println!("Account exists: {}", account.is_some());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod http;

pub use config::{Commitment, RpcConfig};
pub use connection::{AccountInfo, Connection, KeyedAccount, Memcmp, RpcFilter};
pub use error::ClientError;
pub use http::{HttpSender, RpcSender};
