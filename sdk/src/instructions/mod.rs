//! Instruction builders for Serum DEX transactions.
//!
//! # Example
//!
//! ```rust,ignore
//! use serum_market_sdk::instructions::NewOrderV3Builder;
//! use serum_market_sdk::types::{OrderType, Side};
//!
//! let ix = NewOrderV3Builder::new(&market)
//!     .open_orders(open_orders)
//!     .owner(owner)
//!     .payer(payer)
//!     .side(Side::Buy)
//!     .limit_price(10_000)
//!     .max_base_quantity(5)
//!     .max_quote_quantity(50_000)
//!     .order_type(OrderType::Limit)
//!     .build()
//!     .expect("should build instruction");
//! ```

use solana_sdk::pubkey::Pubkey;

pub mod create_open_orders;
pub mod new_order;

pub use create_open_orders::CreateOpenOrdersBuilder;
pub use new_order::NewOrderV3Builder;

/// SPL Token program ID.
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// System program ID.
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("11111111111111111111111111111111");

/// Leading version byte of every DEX instruction.
pub const INSTRUCTION_VERSION: u8 = 0;
