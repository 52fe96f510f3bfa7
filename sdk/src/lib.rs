//! Serum market SDK - Rust client for Serum-style DEX markets on Solana.
//!
//! This crate locates markets by asset pair, reads their order books and
//! builds order-placement transactions. Matching, settlement and signing
//! stay with the on-chain program and the wallet.
//!
//! # Modules
//!
//! - [`client`] — JSON-RPC connection to a ledger node
//! - [`dex`] — Program adapter ([`DexProgram`], [`SerumDex`])
//! - [`layout`] — Read-only decoders for market, slab, open-orders and mint accounts
//! - [`instructions`] — NewOrderV3 and open-orders account instructions
//! - [`types`] — Order book snapshots, quotes and order requests
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use serum_market_sdk::{Connection, MarketClient};
//!
//! let connection = Arc::new(Connection::with_url("https://api.mainnet-beta.solana.com")?);
//! let mut market = MarketClient::new(connection, market_address, program_id);
//! market.init_market().await?;
//!
//! let book = market.get_orderbook(10).await.into_book();
//! println!("{}", book);
//! println!("mid: {:?}", market.get_price().await?);
//! ```

pub mod client;
pub mod dex;
pub mod error;
pub mod instructions;
pub mod layout;
pub mod market_client;
pub mod types;

pub use client::{ClientError, Commitment, Connection, KeyedAccount, RpcConfig};
pub use dex::{DexProgram, SerumDex};
pub use error::SdkError;
pub use market_client::MarketClient;
pub use types::{
    BidAsk, BookLevel, MarketInfo, OrderBookSnapshot, OrderType, OrderbookOutcome,
    PlaceOrderOptions, PlaceOrderParams, PlaceOrderTransaction, SelfTradeBehavior, Side,
};
