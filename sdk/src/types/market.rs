//! Market metadata.
//!
//! [`MarketInfo`] is the decoded market state together with the mint
//! decimals, which is everything needed to move between on-chain lots and
//! human-readable numbers.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use solana_sdk::pubkey::Pubkey;

use super::book::BookLevel;
use crate::error::SdkError;
use crate::layout::{MarketState, Orderbook};

fn multiplier(decimals: u8) -> Result<Decimal, SdkError> {
    10u64
        .checked_pow(u32::from(decimals))
        .map(Decimal::from)
        .ok_or(SdkError::Overflow)
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, SdkError> {
    a.checked_mul(b).ok_or(SdkError::Overflow)
}

fn div(a: Decimal, b: Decimal) -> Result<Decimal, SdkError> {
    if b.is_zero() {
        return Err(SdkError::DivisionByZero);
    }
    a.checked_div(b).ok_or(SdkError::Overflow)
}

/// A loaded market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketInfo {
    address: Pubkey,
    program_id: Pubkey,
    state: MarketState,
    base_decimals: u8,
    quote_decimals: u8,
}

impl MarketInfo {
    /// Creates market info from a decoded state and the mint decimals.
    #[must_use]
    pub fn new(
        address: Pubkey,
        program_id: Pubkey,
        state: MarketState,
        base_decimals: u8,
        quote_decimals: u8,
    ) -> Self {
        Self {
            address,
            program_id,
            state,
            base_decimals,
            quote_decimals,
        }
    }

    /// Market account address.
    #[must_use]
    pub const fn address(&self) -> &Pubkey {
        &self.address
    }

    /// DEX program owning the market.
    #[must_use]
    pub const fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Decoded market state.
    #[must_use]
    pub const fn state(&self) -> &MarketState {
        &self.state
    }

    /// Base token mint.
    #[must_use]
    pub const fn base_mint(&self) -> &Pubkey {
        &self.state.base_mint
    }

    /// Quote token mint.
    #[must_use]
    pub const fn quote_mint(&self) -> &Pubkey {
        &self.state.quote_mint
    }

    /// Bids slab address.
    #[must_use]
    pub const fn bids_address(&self) -> &Pubkey {
        &self.state.bids
    }

    /// Asks slab address.
    #[must_use]
    pub const fn asks_address(&self) -> &Pubkey {
        &self.state.asks
    }

    /// Base mint decimals.
    #[must_use]
    pub const fn base_decimals(&self) -> u8 {
        self.base_decimals
    }

    /// Quote mint decimals.
    #[must_use]
    pub const fn quote_decimals(&self) -> u8 {
        self.quote_decimals
    }

    /// Converts a price in lots to quote units per base unit.
    ///
    /// # Errors
    ///
    /// Returns an error on overflow or a zero base lot size.
    pub fn price_lots_to_number(&self, price_lots: u64) -> Result<Decimal, SdkError> {
        let numerator = mul(
            mul(
                Decimal::from(price_lots),
                Decimal::from(self.state.quote_lot_size),
            )?,
            multiplier(self.base_decimals)?,
        )?;
        let denominator = mul(
            Decimal::from(self.state.base_lot_size),
            multiplier(self.quote_decimals)?,
        )?;
        div(numerator, denominator)
    }

    /// Converts a size in base lots to base units.
    ///
    /// # Errors
    ///
    /// Returns an error on overflow.
    pub fn base_size_lots_to_number(&self, size_lots: u64) -> Result<Decimal, SdkError> {
        div(
            mul(
                Decimal::from(size_lots),
                Decimal::from(self.state.base_lot_size),
            )?,
            multiplier(self.base_decimals)?,
        )
    }

    /// Converts a price to lots, rounding to the nearest lot. Ties round up.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is negative or does not fit in `u64`.
    pub fn price_number_to_lots(&self, price: Decimal) -> Result<u64, SdkError> {
        let numerator = mul(
            mul(price, multiplier(self.quote_decimals)?)?,
            Decimal::from(self.state.base_lot_size),
        )?;
        let denominator = mul(
            multiplier(self.base_decimals)?,
            Decimal::from(self.state.quote_lot_size),
        )?;
        div(numerator, denominator)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .ok_or_else(|| SdkError::InvalidPrice(price.to_string()))
    }

    /// Converts a size in base units to base lots, truncating partial lots.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is negative or the base lot size is zero.
    pub fn base_size_number_to_lots(&self, size: Decimal) -> Result<u64, SdkError> {
        let native = mul(size, multiplier(self.base_decimals)?)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .ok_or_else(|| SdkError::InvalidQuantity(size.to_string()))?;
        native
            .checked_div(self.state.base_lot_size)
            .ok_or(SdkError::DivisionByZero)
    }

    /// Smallest price increment in quote units.
    ///
    /// # Errors
    ///
    /// Returns an error on overflow or a zero base lot size.
    pub fn tick_size(&self) -> Result<Decimal, SdkError> {
        self.price_lots_to_number(1)
    }

    /// Smallest order size in base units.
    ///
    /// # Errors
    ///
    /// Returns an error on overflow.
    pub fn min_order_size(&self) -> Result<Decimal, SdkError> {
        self.base_size_lots_to_number(1)
    }

    /// Aggregates up to `depth` levels of a book side into human units.
    ///
    /// # Errors
    ///
    /// Returns an error if a level cannot be converted.
    pub fn book_levels(&self, book: &Orderbook, depth: usize) -> Result<Vec<BookLevel>, SdkError> {
        book.l2(depth)
            .into_iter()
            .map(|level| {
                Ok(BookLevel {
                    price: self.price_lots_to_number(level.price_lots)?,
                    size: self.base_size_lots_to_number(level.size_lots)?,
                    price_lots: level.price_lots,
                    size_lots: level.size_lots,
                })
            })
            .collect()
    }
}

impl fmt::Display for MarketInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.address, self.state.base_mint, self.state.quote_mint
        )
    }
}
