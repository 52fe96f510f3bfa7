//! Core types for the Serum market SDK.

pub mod book;
pub mod market;
pub mod order;
pub mod primitives;

pub use book::{BidAsk, BookLevel, OrderBookSnapshot, OrderbookOutcome};
pub use market::MarketInfo;
pub use order::{
    OrderType, PlaceOrderOptions, PlaceOrderParams, PlaceOrderTransaction, SelfTradeBehavior,
};
pub use primitives::Side;
