//! Market state account layout.
//!
//! Offsets of this layout are what `getProgramAccounts` memcmp filters
//! target when searching markets by mint pair.

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

use super::{AccountFlags, HEAD_PADDING, TAIL_PADDING};
use crate::error::SdkError;

/// Fields of the market state, in on-chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketField {
    /// Account flags.
    AccountFlags,
    /// Address of the market account itself.
    OwnAddress,
    /// Nonce of the vault signer PDA.
    VaultSignerNonce,
    /// Base token mint.
    BaseMint,
    /// Quote token mint.
    QuoteMint,
    /// Base token vault.
    BaseVault,
    /// Total base deposits.
    BaseDepositsTotal,
    /// Accrued base fees.
    BaseFeesAccrued,
    /// Quote token vault.
    QuoteVault,
    /// Total quote deposits.
    QuoteDepositsTotal,
    /// Accrued quote fees.
    QuoteFeesAccrued,
    /// Quote dust threshold.
    QuoteDustThreshold,
    /// Request queue.
    RequestQueue,
    /// Event queue.
    EventQueue,
    /// Bids slab.
    Bids,
    /// Asks slab.
    Asks,
    /// Base lot size.
    BaseLotSize,
    /// Quote lot size.
    QuoteLotSize,
    /// Fee rate in basis points.
    FeeRateBps,
    /// Accrued referrer rebates.
    ReferrerRebatesAccrued,
}

impl MarketField {
    /// All fields in layout order.
    pub const ALL: [Self; 20] = [
        Self::AccountFlags,
        Self::OwnAddress,
        Self::VaultSignerNonce,
        Self::BaseMint,
        Self::QuoteMint,
        Self::BaseVault,
        Self::BaseDepositsTotal,
        Self::BaseFeesAccrued,
        Self::QuoteVault,
        Self::QuoteDepositsTotal,
        Self::QuoteFeesAccrued,
        Self::QuoteDustThreshold,
        Self::RequestQueue,
        Self::EventQueue,
        Self::Bids,
        Self::Asks,
        Self::BaseLotSize,
        Self::QuoteLotSize,
        Self::FeeRateBps,
        Self::ReferrerRebatesAccrued,
    ];

    /// Width of the field in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::OwnAddress
            | Self::BaseMint
            | Self::QuoteMint
            | Self::BaseVault
            | Self::QuoteVault
            | Self::RequestQueue
            | Self::EventQueue
            | Self::Bids
            | Self::Asks => 32,
            _ => 8,
        }
    }

    /// Byte offset of the field from the start of the account data.
    #[must_use]
    pub fn offset(self) -> usize {
        HEAD_PADDING
            + Self::ALL
                .iter()
                .take_while(|field| **field != self)
                .map(|field| field.size())
                .sum::<usize>()
    }
}

/// Total length of a market state account.
#[must_use]
pub fn market_state_span() -> usize {
    MarketField::ReferrerRebatesAccrued.offset()
        + MarketField::ReferrerRebatesAccrued.size()
        + TAIL_PADDING
}

/// Packed on-chain representation.
#[derive(Debug, BorshDeserialize)]
#[cfg_attr(test, derive(borsh::BorshSerialize))]
#[allow(dead_code)] // Padding and unused fields keep the on-chain byte layout
pub(crate) struct RawMarketState {
    pub(crate) head_padding: [u8; 5],
    pub(crate) account_flags: u64,
    pub(crate) own_address: [u8; 32],
    pub(crate) vault_signer_nonce: u64,
    pub(crate) base_mint: [u8; 32],
    pub(crate) quote_mint: [u8; 32],
    pub(crate) base_vault: [u8; 32],
    pub(crate) base_deposits_total: u64,
    pub(crate) base_fees_accrued: u64,
    pub(crate) quote_vault: [u8; 32],
    pub(crate) quote_deposits_total: u64,
    pub(crate) quote_fees_accrued: u64,
    pub(crate) quote_dust_threshold: u64,
    pub(crate) request_queue: [u8; 32],
    pub(crate) event_queue: [u8; 32],
    pub(crate) bids: [u8; 32],
    pub(crate) asks: [u8; 32],
    pub(crate) base_lot_size: u64,
    pub(crate) quote_lot_size: u64,
    pub(crate) fee_rate_bps: u64,
    pub(crate) referrer_rebates_accrued: u64,
    pub(crate) tail_padding: [u8; 7],
}

/// Decoded market state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketState {
    /// Account flags.
    pub account_flags: AccountFlags,
    /// Address recorded inside the account.
    pub own_address: Pubkey,
    /// Nonce of the vault signer PDA.
    pub vault_signer_nonce: u64,
    /// Base token mint.
    pub base_mint: Pubkey,
    /// Quote token mint.
    pub quote_mint: Pubkey,
    /// Base token vault.
    pub base_vault: Pubkey,
    /// Total base deposits.
    pub base_deposits_total: u64,
    /// Accrued base fees.
    pub base_fees_accrued: u64,
    /// Quote token vault.
    pub quote_vault: Pubkey,
    /// Total quote deposits.
    pub quote_deposits_total: u64,
    /// Accrued quote fees.
    pub quote_fees_accrued: u64,
    /// Quote dust threshold.
    pub quote_dust_threshold: u64,
    /// Request queue.
    pub request_queue: Pubkey,
    /// Event queue.
    pub event_queue: Pubkey,
    /// Bids slab.
    pub bids: Pubkey,
    /// Asks slab.
    pub asks: Pubkey,
    /// Base lot size in native base units.
    pub base_lot_size: u64,
    /// Quote lot size in native quote units.
    pub quote_lot_size: u64,
    /// Fee rate in basis points.
    pub fee_rate_bps: u64,
    /// Accrued referrer rebates.
    pub referrer_rebates_accrued: u64,
}

impl MarketState {
    /// Decodes a market account and checks that it describes `address`.
    ///
    /// Longer accounts (permissioned market variants) are accepted; only
    /// the common prefix is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is too short, the account is not an
    /// initialized market, or it belongs to another address.
    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self, SdkError> {
        if data.len() < market_state_span() {
            return Err(SdkError::invalid_account(
                "market",
                format!("{} bytes, expected at least {}", data.len(), market_state_span()),
            ));
        }

        let raw = RawMarketState::deserialize(&mut &data[..])?;
        let account_flags = AccountFlags::new(raw.account_flags);

        if !account_flags.contains(AccountFlags::INITIALIZED | AccountFlags::MARKET) {
            return Err(SdkError::invalid_account(
                "market",
                format!("unexpected account flags {:#x}", raw.account_flags),
            ));
        }

        let own_address = Pubkey::new_from_array(raw.own_address);
        if own_address != *address {
            return Err(SdkError::invalid_account(
                "market",
                format!("account records address {}, expected {}", own_address, address),
            ));
        }

        Ok(Self {
            account_flags,
            own_address,
            vault_signer_nonce: raw.vault_signer_nonce,
            base_mint: Pubkey::new_from_array(raw.base_mint),
            quote_mint: Pubkey::new_from_array(raw.quote_mint),
            base_vault: Pubkey::new_from_array(raw.base_vault),
            base_deposits_total: raw.base_deposits_total,
            base_fees_accrued: raw.base_fees_accrued,
            quote_vault: Pubkey::new_from_array(raw.quote_vault),
            quote_deposits_total: raw.quote_deposits_total,
            quote_fees_accrued: raw.quote_fees_accrued,
            quote_dust_threshold: raw.quote_dust_threshold,
            request_queue: Pubkey::new_from_array(raw.request_queue),
            event_queue: Pubkey::new_from_array(raw.event_queue),
            bids: Pubkey::new_from_array(raw.bids),
            asks: Pubkey::new_from_array(raw.asks),
            base_lot_size: raw.base_lot_size,
            quote_lot_size: raw.quote_lot_size,
            fee_rate_bps: raw.fee_rate_bps,
            referrer_rebates_accrued: raw.referrer_rebates_accrued,
        })
    }

    /// Returns true if the market authority has disabled the market.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.account_flags.contains(AccountFlags::DISABLED)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Market account bytes with the given keys and lot sizes.
    pub(crate) fn market_account_data(
        address: &Pubkey,
        base_mint: &Pubkey,
        quote_mint: &Pubkey,
        bids: &Pubkey,
        asks: &Pubkey,
        base_lot_size: u64,
        quote_lot_size: u64,
    ) -> Vec<u8> {
        let raw = RawMarketState {
            head_padding: *b"serum",
            account_flags: AccountFlags::INITIALIZED | AccountFlags::MARKET,
            own_address: address.to_bytes(),
            vault_signer_nonce: 1,
            base_mint: base_mint.to_bytes(),
            quote_mint: quote_mint.to_bytes(),
            base_vault: Pubkey::new_unique().to_bytes(),
            base_deposits_total: 0,
            base_fees_accrued: 0,
            quote_vault: Pubkey::new_unique().to_bytes(),
            quote_deposits_total: 0,
            quote_fees_accrued: 0,
            quote_dust_threshold: 100,
            request_queue: Pubkey::new_unique().to_bytes(),
            event_queue: Pubkey::new_unique().to_bytes(),
            bids: bids.to_bytes(),
            asks: asks.to_bytes(),
            base_lot_size,
            quote_lot_size,
            fee_rate_bps: 22,
            referrer_rebates_accrued: 0,
            tail_padding: *b"padding",
        };
        borsh::to_vec(&raw).expect("serialize market")
    }

    #[test]
    fn test_mint_offsets() {
        assert_eq!(MarketField::AccountFlags.offset(), 5);
        assert_eq!(MarketField::OwnAddress.offset(), 13);
        assert_eq!(MarketField::BaseMint.offset(), 53);
        assert_eq!(MarketField::QuoteMint.offset(), 85);
        assert_eq!(MarketField::Bids.offset(), 285);
        assert_eq!(MarketField::BaseLotSize.offset(), 349);
    }

    #[test]
    fn test_market_state_span() {
        assert_eq!(market_state_span(), 388);
    }

    #[test]
    fn test_decode_market_state() {
        let address = Pubkey::new_unique();
        let base_mint = Pubkey::new_unique();
        let quote_mint = Pubkey::new_unique();
        let bids = Pubkey::new_unique();
        let asks = Pubkey::new_unique();
        let data = market_account_data(&address, &base_mint, &quote_mint, &bids, &asks, 100, 10);

        assert_eq!(data.len(), 388);
        assert_eq!(&data[53..85], base_mint.as_ref());
        assert_eq!(&data[85..117], quote_mint.as_ref());

        let state = MarketState::decode(&address, &data).expect("decode");
        assert_eq!(state.own_address, address);
        assert_eq!(state.base_mint, base_mint);
        assert_eq!(state.quote_mint, quote_mint);
        assert_eq!(state.bids, bids);
        assert_eq!(state.asks, asks);
        assert_eq!(state.base_lot_size, 100);
        assert_eq!(state.quote_lot_size, 10);
        assert_eq!(state.fee_rate_bps, 22);
        assert!(!state.is_disabled());
    }

    #[test]
    fn test_decode_market_state_wrong_address() {
        let address = Pubkey::new_unique();
        let key = Pubkey::new_unique();
        let data = market_account_data(&address, &key, &key, &key, &key, 1, 1);

        let result = MarketState::decode(&Pubkey::new_unique(), &data);
        assert!(matches!(result, Err(SdkError::InvalidAccount { kind: "market", .. })));
    }

    #[test]
    fn test_decode_market_state_not_a_market() {
        let address = Pubkey::new_unique();
        let key = Pubkey::new_unique();
        let mut data = market_account_data(&address, &key, &key, &key, &key, 1, 1);
        data[5] = AccountFlags::INITIALIZED as u8;

        assert!(MarketState::decode(&address, &data).is_err());
    }

    #[test]
    fn test_decode_market_state_too_short() {
        let address = Pubkey::new_unique();
        assert!(MarketState::decode(&address, &[0u8; 100]).is_err());
    }
}
