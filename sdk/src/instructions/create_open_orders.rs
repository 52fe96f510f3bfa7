//! CreateOpenOrders instruction builder.
//!
//! Open-orders accounts are plain program-owned accounts: the system
//! program allocates them with the DEX program as owner, and the DEX
//! initializes them on the first order.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::error::SdkError;
use crate::layout::open_orders::OPEN_ORDERS_SPAN;

use super::SYSTEM_PROGRAM_ID;

/// System program CreateAccount tag.
const CREATE_ACCOUNT_TAG: u32 = 0;

/// System CreateAccount instruction data.
#[derive(Debug, Clone, BorshSerialize)]
struct CreateAccountInstructionData {
    tag: u32,
    lamports: u64,
    space: u64,
    owner: [u8; 32],
}

/// Builder for the instruction allocating an open-orders account.
#[derive(Debug, Clone)]
pub struct CreateOpenOrdersBuilder {
    program_id: Pubkey,
    owner: Option<Pubkey>,
    open_orders: Option<Pubkey>,
    lamports: Option<u64>,
}

impl CreateOpenOrdersBuilder {
    /// Creates a new builder for accounts owned by `program_id`.
    #[must_use]
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            owner: None,
            open_orders: None,
            lamports: None,
        }
    }

    /// Sets the owner, who funds the new account.
    #[must_use]
    pub fn owner(mut self, owner: Pubkey) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the address of the account to create.
    #[must_use]
    pub fn open_orders(mut self, open_orders: Pubkey) -> Self {
        self.open_orders = Some(open_orders);
        self
    }

    /// Sets the lamports transferred into the new account.
    #[must_use]
    pub fn lamports(mut self, lamports: u64) -> Self {
        self.lamports = Some(lamports);
        self
    }

    /// Builds the instruction.
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is not set.
    pub fn build(self) -> Result<Instruction, SdkError> {
        let owner = self
            .owner
            .ok_or_else(|| SdkError::InvalidAddress("owner not set".to_string()))?;
        let open_orders = self
            .open_orders
            .ok_or_else(|| SdkError::InvalidAddress("open orders not set".to_string()))?;
        let lamports = self
            .lamports
            .ok_or_else(|| SdkError::InvalidQuantity("lamports not set".to_string()))?;

        let accounts = vec![
            AccountMeta::new(owner, true),
            AccountMeta::new(open_orders, true),
        ];

        let instruction_data = CreateAccountInstructionData {
            tag: CREATE_ACCOUNT_TAG,
            lamports,
            space: OPEN_ORDERS_SPAN as u64,
            owner: self.program_id.to_bytes(),
        };

        let data =
            borsh::to_vec(&instruction_data).map_err(|e| SdkError::Serialization(e.to_string()))?;

        Ok(Instruction {
            program_id: SYSTEM_PROGRAM_ID,
            accounts,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_open_orders_builder() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let open_orders = Pubkey::new_unique();

        let ix = CreateOpenOrdersBuilder::new(program_id)
            .owner(owner)
            .open_orders(open_orders)
            .lamports(23_357_760)
            .build()
            .expect("should build instruction");

        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.accounts.len(), 2);
        assert_eq!(ix.accounts[0].pubkey, owner);
        assert!(ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[1].pubkey, open_orders);
        assert!(ix.accounts[1].is_signer);
        assert!(ix.accounts[1].is_writable);
    }

    #[test]
    fn test_create_open_orders_data() {
        let program_id = Pubkey::new_unique();
        let ix = CreateOpenOrdersBuilder::new(program_id)
            .owner(Pubkey::new_unique())
            .open_orders(Pubkey::new_unique())
            .lamports(500)
            .build()
            .expect("should build instruction");

        assert_eq!(ix.data.len(), 52);
        assert_eq!(&ix.data[0..4], &0u32.to_le_bytes());
        assert_eq!(&ix.data[4..12], &500u64.to_le_bytes());
        assert_eq!(&ix.data[12..20], &3228u64.to_le_bytes());
        assert_eq!(&ix.data[20..52], program_id.as_ref());
    }

    #[test]
    fn test_create_open_orders_missing_lamports() {
        let result = CreateOpenOrdersBuilder::new(Pubkey::new_unique())
            .owner(Pubkey::new_unique())
            .open_orders(Pubkey::new_unique())
            .build();

        assert!(matches!(result, Err(SdkError::InvalidQuantity(_))));
    }
}
