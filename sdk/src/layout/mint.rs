//! SPL token mint layout (only the decimals are needed).

use solana_sdk::pubkey::Pubkey;

use crate::error::SdkError;

/// Wrapped SOL mint. Its decimals are fixed, so it is never fetched.
pub const WRAPPED_SOL_MINT: Pubkey =
    solana_sdk::pubkey!("So11111111111111111111111111111111111111112");

/// Decimals of the wrapped SOL mint.
pub const WRAPPED_SOL_DECIMALS: u8 = 9;

/// Offset of the `decimals` byte: authority option (4), authority (32),
/// supply (8).
pub const MINT_DECIMALS_OFFSET: usize = 44;

/// Reads the decimals of a mint account.
///
/// # Errors
///
/// Returns an error if the account is too short to be a mint.
pub fn decode_mint_decimals(data: &[u8]) -> Result<u8, SdkError> {
    data.get(MINT_DECIMALS_OFFSET).copied().ok_or_else(|| {
        SdkError::invalid_account("mint", format!("{} bytes, no decimals field", data.len()))
    })
}
