//! Read-only decoders for DEX program accounts.
//!
//! Every program-owned account starts with a 5-byte `"serum"` head padding
//! followed by a little-endian `u64` of [`AccountFlags`], and ends with a
//! 7-byte tail padding. The fixed-width fields in between are decoded with
//! borsh, whose integer and array encodings match the on-chain packing.

pub mod market;
pub mod mint;
pub mod open_orders;
pub mod slab;

pub use market::{MarketField, MarketState};
pub use mint::{decode_mint_decimals, WRAPPED_SOL_MINT};
pub use open_orders::OpenOrders;
pub use slab::{LeafNode, Orderbook};

/// Length of the `"serum"` head padding.
pub const HEAD_PADDING: usize = 5;

/// Length of the tail padding.
pub const TAIL_PADDING: usize = 7;

/// Account flags stored right after the head padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccountFlags(u64);

impl AccountFlags {
    /// Account has been initialized.
    pub const INITIALIZED: u64 = 1;
    /// Market state account.
    pub const MARKET: u64 = 1 << 1;
    /// Open-orders account.
    pub const OPEN_ORDERS: u64 = 1 << 2;
    /// Request queue account.
    pub const REQUEST_QUEUE: u64 = 1 << 3;
    /// Event queue account.
    pub const EVENT_QUEUE: u64 = 1 << 4;
    /// Bids slab.
    pub const BIDS: u64 = 1 << 5;
    /// Asks slab.
    pub const ASKS: u64 = 1 << 6;
    /// Market disabled by its authority.
    pub const DISABLED: u64 = 1 << 7;

    /// Wraps raw flag bits.
    #[must_use]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Returns true if every bit of `mask` is set.
    #[must_use]
    pub const fn contains(&self, mask: u64) -> bool {
        self.0 & mask == mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_flags_contains() {
        let flags = AccountFlags::new(AccountFlags::INITIALIZED | AccountFlags::BIDS);
        assert!(flags.contains(AccountFlags::INITIALIZED));
        assert!(flags.contains(AccountFlags::BIDS));
        assert!(!flags.contains(AccountFlags::ASKS));
        assert!(!flags.contains(AccountFlags::INITIALIZED | AccountFlags::MARKET));
    }

    #[test]
    fn test_account_flags_default_uninitialized() {
        assert!(!AccountFlags::default().contains(AccountFlags::INITIALIZED));
        assert_eq!(AccountFlags::new(33).bits(), 33);
    }
}
