//! Order book snapshot and quote types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An aggregated price level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookLevel {
    /// Price in quote units per base unit.
    pub price: Decimal,

    /// Total size at this level in base units.
    pub size: Decimal,

    /// Price in lots.
    pub price_lots: u64,

    /// Total size in base lots.
    pub size_lots: u64,
}

impl fmt::Display for BookLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.size, self.price)
    }
}

/// Point-in-time order book read.
///
/// The two sides come from independent account reads and may reflect
/// different ledger states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Bid levels (sorted by price descending).
    pub bids: Vec<BookLevel>,

    /// Ask levels (sorted by price ascending).
    pub asks: Vec<BookLevel>,
}

impl OrderBookSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if both sides are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

impl fmt::Display for OrderBookSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Asks:")?;
        for level in self.asks.iter().rev() {
            writeln!(f, "    {}", level)?;
        }
        writeln!(f, "  ---")?;
        writeln!(f, "  Bids:")?;
        for level in &self.bids {
            writeln!(f, "    {}", level)?;
        }
        Ok(())
    }
}

/// Best bid and ask prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidAsk {
    /// Highest bid price.
    pub bid: Option<Decimal>,

    /// Lowest ask price.
    pub ask: Option<Decimal>,
}

impl BidAsk {
    /// Neither side known.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            bid: None,
            ask: None,
        }
    }

    /// Midpoint `bid + (ask - bid) / 2`, if both sides are present.
    #[must_use]
    pub fn midpoint(&self) -> Option<Decimal> {
        let (bid, ask) = (self.bid?, self.ask?);
        let half_spread = ask.checked_sub(bid)?.checked_div(Decimal::TWO)?;
        bid.checked_add(half_spread)
    }

    /// Spread `ask - bid`, if both sides are present.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        self.ask?.checked_sub(self.bid?)
    }
}

/// Result of an order book read.
///
/// Reads never fail from the caller's point of view; this keeps "empty",
/// "not loaded yet" and "read failed" apart while [`into_book`] collapses
/// them into an empty book.
///
/// [`into_book`]: OrderbookOutcome::into_book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderbookOutcome {
    /// Both sides were read.
    Loaded(OrderBookSnapshot),

    /// The market has not been initialized.
    NotReady,

    /// Loading or decoding failed.
    Failed {
        /// Error description.
        reason: String,
    },
}

impl OrderbookOutcome {
    /// Returns the snapshot, or an empty book when none was read.
    #[must_use]
    pub fn into_book(self) -> OrderBookSnapshot {
        match self {
            Self::Loaded(book) => book,
            Self::NotReady | Self::Failed { .. } => OrderBookSnapshot::empty(),
        }
    }
}
