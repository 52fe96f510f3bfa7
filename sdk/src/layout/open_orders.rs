//! Open-orders account layout.
//!
//! Only the head of the account (owner, market and token balances) is
//! decoded; the order slots are left to the program.

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

use super::{AccountFlags, HEAD_PADDING};
use crate::error::SdkError;

/// Total length of an open-orders account.
pub const OPEN_ORDERS_SPAN: usize = 3228;

/// Offset of the market field.
pub const OPEN_ORDERS_MARKET_OFFSET: usize = HEAD_PADDING + 8;

/// Offset of the owner field.
pub const OPEN_ORDERS_OWNER_OFFSET: usize = OPEN_ORDERS_MARKET_OFFSET + 32;

#[derive(Debug, BorshDeserialize)]
#[cfg_attr(test, derive(borsh::BorshSerialize))]
#[allow(dead_code)] // Padding and unused fields keep the on-chain byte layout
pub(crate) struct RawOpenOrdersHead {
    pub(crate) head_padding: [u8; 5],
    pub(crate) account_flags: u64,
    pub(crate) market: [u8; 32],
    pub(crate) owner: [u8; 32],
    pub(crate) base_token_free: u64,
    pub(crate) base_token_total: u64,
    pub(crate) quote_token_free: u64,
    pub(crate) quote_token_total: u64,
}

/// A decoded open-orders account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOrders {
    /// Address of the open-orders account.
    pub address: Pubkey,
    /// Market the account trades on.
    pub market: Pubkey,
    /// Wallet owning the account.
    pub owner: Pubkey,
    /// Unlocked base tokens.
    pub base_token_free: u64,
    /// Total base tokens held.
    pub base_token_total: u64,
    /// Unlocked quote tokens.
    pub quote_token_free: u64,
    /// Total quote tokens held.
    pub quote_token_total: u64,
}

impl OpenOrders {
    /// Decodes an open-orders account.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not an initialized open-orders account.
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self, SdkError> {
        if data.len() != OPEN_ORDERS_SPAN {
            return Err(SdkError::invalid_account(
                "open orders",
                format!("{} bytes, expected {}", data.len(), OPEN_ORDERS_SPAN),
            ));
        }

        let raw = RawOpenOrdersHead::deserialize(&mut &data[..])?;
        let flags = AccountFlags::new(raw.account_flags);
        if !flags.contains(AccountFlags::INITIALIZED | AccountFlags::OPEN_ORDERS) {
            return Err(SdkError::invalid_account(
                "open orders",
                format!("unexpected account flags {:#x}", raw.account_flags),
            ));
        }

        Ok(Self {
            address,
            market: Pubkey::new_from_array(raw.market),
            owner: Pubkey::new_from_array(raw.owner),
            base_token_free: raw.base_token_free,
            base_token_total: raw.base_token_total,
            quote_token_free: raw.quote_token_free,
            quote_token_total: raw.quote_token_total,
        })
    }
}
