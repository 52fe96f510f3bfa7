//! NewOrderV3 instruction builder.
//!
//! Builds the instruction that places an order on a market's book.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    sysvar,
};

use crate::error::SdkError;
use crate::types::{MarketInfo, OrderType, SelfTradeBehavior, Side};

use super::{INSTRUCTION_VERSION, TOKEN_PROGRAM_ID};

/// Tag of the NewOrderV3 instruction.
pub const NEW_ORDER_V3_TAG: u32 = 10;

/// Default cap on the number of matching iterations.
pub const DEFAULT_MATCH_LIMIT: u16 = 65_535;

/// Instruction data (on-chain format).
#[derive(Debug, Clone, BorshSerialize)]
struct NewOrderV3InstructionData {
    version: u8,
    tag: u32,
    side: u32,
    limit_price: u64,
    max_base_quantity: u64,
    max_quote_quantity: u64,
    self_trade_behavior: u32,
    order_type: u32,
    client_id: u64,
    limit: u16,
}

/// Market accounts referenced by every order.
#[derive(Debug, Clone, Copy)]
struct MarketAccounts {
    market: Pubkey,
    request_queue: Pubkey,
    event_queue: Pubkey,
    bids: Pubkey,
    asks: Pubkey,
    base_vault: Pubkey,
    quote_vault: Pubkey,
}

/// Builder for the NewOrderV3 instruction.
#[derive(Debug, Clone)]
pub struct NewOrderV3Builder {
    program_id: Pubkey,
    market: MarketAccounts,
    open_orders: Option<Pubkey>,
    owner: Option<Pubkey>,
    payer: Option<Pubkey>,
    fee_discount: Option<Pubkey>,
    side: Option<Side>,
    limit_price: Option<u64>,
    max_base_quantity: Option<u64>,
    max_quote_quantity: Option<u64>,
    order_type: OrderType,
    self_trade_behavior: SelfTradeBehavior,
    client_id: u64,
    limit: u16,
}

impl NewOrderV3Builder {
    /// Creates a builder for the given market.
    #[must_use]
    pub fn new(market: &MarketInfo) -> Self {
        let state = market.state();
        Self {
            program_id: *market.program_id(),
            market: MarketAccounts {
                market: *market.address(),
                request_queue: state.request_queue,
                event_queue: state.event_queue,
                bids: state.bids,
                asks: state.asks,
                base_vault: state.base_vault,
                quote_vault: state.quote_vault,
            },
            open_orders: None,
            owner: None,
            payer: None,
            fee_discount: None,
            side: None,
            limit_price: None,
            max_base_quantity: None,
            max_quote_quantity: None,
            order_type: OrderType::Limit,
            self_trade_behavior: SelfTradeBehavior::default(),
            client_id: 0,
            limit: DEFAULT_MATCH_LIMIT,
        }
    }

    /// Sets the open-orders account.
    #[must_use]
    pub fn open_orders(mut self, open_orders: Pubkey) -> Self {
        self.open_orders = Some(open_orders);
        self
    }

    /// Sets the owner (signer) account.
    #[must_use]
    pub fn owner(mut self, owner: Pubkey) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the paying token account.
    #[must_use]
    pub fn payer(mut self, payer: Pubkey) -> Self {
        self.payer = Some(payer);
        self
    }

    /// Sets the fee-discount token account.
    #[must_use]
    pub fn fee_discount(mut self, fee_discount: Option<Pubkey>) -> Self {
        self.fee_discount = fee_discount;
        self
    }

    /// Sets the order side.
    #[must_use]
    pub fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    /// Sets the limit price in lots.
    #[must_use]
    pub fn limit_price(mut self, price_lots: u64) -> Self {
        self.limit_price = Some(price_lots);
        self
    }

    /// Sets the maximum base quantity in lots.
    #[must_use]
    pub fn max_base_quantity(mut self, lots: u64) -> Self {
        self.max_base_quantity = Some(lots);
        self
    }

    /// Sets the maximum quote quantity in native quote units.
    #[must_use]
    pub fn max_quote_quantity(mut self, native: u64) -> Self {
        self.max_quote_quantity = Some(native);
        self
    }

    /// Sets the order type.
    #[must_use]
    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    /// Sets the self-trade behavior.
    #[must_use]
    pub fn self_trade_behavior(mut self, stb: SelfTradeBehavior) -> Self {
        self.self_trade_behavior = stb;
        self
    }

    /// Sets the client order id.
    #[must_use]
    pub fn client_id(mut self, id: u64) -> Self {
        self.client_id = id;
        self
    }

    /// Sets the matching iteration limit.
    #[must_use]
    pub fn limit(mut self, limit: u16) -> Self {
        self.limit = limit;
        self
    }

    /// Builds the instruction.
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is not set.
    pub fn build(self) -> Result<Instruction, SdkError> {
        let open_orders = self
            .open_orders
            .ok_or_else(|| SdkError::InvalidAddress("open orders not set".to_string()))?;
        let owner = self
            .owner
            .ok_or_else(|| SdkError::InvalidAddress("owner not set".to_string()))?;
        let payer = self
            .payer
            .ok_or_else(|| SdkError::InvalidAddress("payer not set".to_string()))?;
        let side = self
            .side
            .ok_or_else(|| SdkError::Serialization("side not set".to_string()))?;
        let limit_price = self
            .limit_price
            .ok_or_else(|| SdkError::InvalidPrice("limit price not set".to_string()))?;
        let max_base_quantity = self
            .max_base_quantity
            .ok_or_else(|| SdkError::InvalidQuantity("max base quantity not set".to_string()))?;
        let max_quote_quantity = self
            .max_quote_quantity
            .ok_or_else(|| SdkError::InvalidQuantity("max quote quantity not set".to_string()))?;

        let m = self.market;
        let mut accounts = vec![
            AccountMeta::new(m.market, false),
            AccountMeta::new(open_orders, false),
            AccountMeta::new(m.request_queue, false),
            AccountMeta::new(m.event_queue, false),
            AccountMeta::new(m.bids, false),
            AccountMeta::new(m.asks, false),
            AccountMeta::new(payer, false),
            AccountMeta::new_readonly(owner, true),
            AccountMeta::new(m.base_vault, false),
            AccountMeta::new(m.quote_vault, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ];

        if let Some(fee_discount) = self.fee_discount {
            accounts.push(AccountMeta::new_readonly(fee_discount, false));
        }

        let instruction_data = NewOrderV3InstructionData {
            version: INSTRUCTION_VERSION,
            tag: NEW_ORDER_V3_TAG,
            side: side.into(),
            limit_price,
            max_base_quantity,
            max_quote_quantity,
            self_trade_behavior: self.self_trade_behavior.into(),
            order_type: self.order_type.into(),
            client_id: self.client_id,
            limit: self.limit,
        };

        let data =
            borsh::to_vec(&instruction_data).map_err(|e| SdkError::Serialization(e.to_string()))?;

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}
