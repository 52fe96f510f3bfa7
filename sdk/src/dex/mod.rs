//! DEX program adapter.
//!
//! [`DexProgram`] is everything the market client needs from the on-chain
//! program: loading markets and book sides, market field offsets for
//! account filters, and building order transactions. [`SerumDex`] talks to
//! Serum v3 style programs.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::client::{ClientError, Connection};
use crate::layout::{MarketField, Orderbook};
use crate::types::{MarketInfo, PlaceOrderParams, PlaceOrderTransaction};

pub mod serum;

pub use serum::SerumDex;

/// Operations on a DEX program.
#[async_trait]
pub trait DexProgram: Send + Sync {
    /// Loads and decodes the market at `address`, owned by `program_id`.
    async fn load_market(
        &self,
        connection: &Connection,
        address: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<MarketInfo, ClientError>;

    /// Loads the bids side of `market`.
    async fn load_bids(
        &self,
        connection: &Connection,
        market: &MarketInfo,
    ) -> Result<Orderbook, ClientError>;

    /// Loads the asks side of `market`.
    async fn load_asks(
        &self,
        connection: &Connection,
        market: &MarketInfo,
    ) -> Result<Orderbook, ClientError>;

    /// Byte offset of a market state field.
    fn layout_offset(&self, field: MarketField) -> usize;

    /// Builds an unsigned transaction placing an order on `market`.
    async fn make_place_order_transaction(
        &self,
        connection: &Connection,
        market: &MarketInfo,
        params: PlaceOrderParams,
    ) -> Result<PlaceOrderTransaction, ClientError>;
}
