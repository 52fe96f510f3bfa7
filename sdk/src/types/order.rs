//! Order types.
//!
//! Order type and self-trade variants, plus the parameter bundle consumed
//! when building an order-placement transaction.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::transaction::Transaction;

use super::primitives::Side;

/// Order type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderType {
    /// Standard limit order.
    #[default]
    Limit,
    /// Immediate-or-cancel (fill what you can, cancel rest).
    ImmediateOrCancel,
    /// Post-only order (maker only, rejected if would take).
    PostOnly,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "limit"),
            Self::ImmediateOrCancel => write!(f, "ioc"),
            Self::PostOnly => write!(f, "postOnly"),
        }
    }
}

impl From<OrderType> for u32 {
    fn from(order_type: OrderType) -> Self {
        match order_type {
            OrderType::Limit => 0,
            OrderType::ImmediateOrCancel => 1,
            OrderType::PostOnly => 2,
        }
    }
}

/// Self-trade behavior applied by the matching engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelfTradeBehavior {
    /// Decrement the taking order by the overlapping size.
    #[default]
    DecrementTake,
    /// Cancel the resting (providing) order.
    CancelProvide,
    /// Fail the whole transaction.
    AbortTransaction,
}

impl From<SelfTradeBehavior> for u32 {
    fn from(stb: SelfTradeBehavior) -> Self {
        match stb {
            SelfTradeBehavior::DecrementTake => 0,
            SelfTradeBehavior::CancelProvide => 1,
            SelfTradeBehavior::AbortTransaction => 2,
        }
    }
}

/// Optional fields of an order request.
#[derive(Debug, Default)]
pub struct PlaceOrderOptions {
    /// Client-assigned correlation id.
    pub client_id: Option<u64>,

    /// Existing open-orders account to use.
    pub open_orders_address_key: Option<Pubkey>,

    /// Keypair for the open-orders account, created if the owner has none.
    pub open_orders_account: Option<Keypair>,

    /// Fee-discount (SRM/MSRM) token account.
    pub fee_discount_pubkey: Option<Pubkey>,
}

impl PlaceOrderOptions {
    /// Sets the client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: u64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Sets the open-orders address to use.
    #[must_use]
    pub fn with_open_orders_address(mut self, address: Pubkey) -> Self {
        self.open_orders_address_key = Some(address);
        self
    }

    /// Sets the keypair used when an open-orders account must be created.
    #[must_use]
    pub fn with_open_orders_account(mut self, account: Keypair) -> Self {
        self.open_orders_account = Some(account);
        self
    }

    /// Sets the fee-discount token account.
    #[must_use]
    pub fn with_fee_discount(mut self, pubkey: Pubkey) -> Self {
        self.fee_discount_pubkey = Some(pubkey);
        self
    }
}

/// An order request, consumed once to build a transaction.
///
/// Price and size are human-readable numbers and are passed through
/// unchecked; conversion into lots happens in the program adapter.
#[derive(Debug)]
pub struct PlaceOrderParams {
    /// Wallet owning the open-orders account. Signs the transaction.
    pub owner: Pubkey,

    /// Token account paying for the order (quote for buys, base for sells).
    pub payer: Pubkey,

    /// Order side.
    pub side: Side,

    /// Limit price in quote units per base unit.
    pub price: Decimal,

    /// Size in base units.
    pub size: Decimal,

    /// Order type.
    pub order_type: OrderType,

    /// Optional fields.
    pub options: PlaceOrderOptions,
}

/// An unsigned order-placement transaction.
#[derive(Debug)]
pub struct PlaceOrderTransaction {
    /// The transaction, with the owner as fee payer. Not signed.
    pub transaction: Transaction,

    /// Keypairs that must co-sign besides the owner.
    pub signers: Vec<Keypair>,
}
