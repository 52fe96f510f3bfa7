//! Serum v3 program adapter.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use tracing::debug;

use super::DexProgram;
use crate::client::{AccountInfo, ClientError, Connection, RpcFilter};
use crate::error::SdkError;
use crate::instructions::{CreateOpenOrdersBuilder, NewOrderV3Builder};
use crate::layout::mint::WRAPPED_SOL_DECIMALS;
use crate::layout::open_orders::{
    OPEN_ORDERS_MARKET_OFFSET, OPEN_ORDERS_OWNER_OFFSET, OPEN_ORDERS_SPAN,
};
use crate::layout::{
    decode_mint_decimals, MarketField, MarketState, OpenOrders, Orderbook, WRAPPED_SOL_MINT,
};
use crate::types::{
    MarketInfo, PlaceOrderOptions, PlaceOrderParams, PlaceOrderTransaction, SelfTradeBehavior,
};

async fn fetch_account(
    connection: &Connection,
    address: &Pubkey,
) -> Result<AccountInfo, ClientError> {
    connection
        .get_account_info(address)
        .await?
        .ok_or(ClientError::AccountNotFound(*address))
}

/// Adapter for Serum v3 style DEX programs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerumDex;

impl SerumDex {
    /// Creates the adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Lists the open-orders accounts `owner` holds on `market`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an account cannot be decoded.
    pub async fn find_open_orders_accounts_for_owner(
        &self,
        connection: &Connection,
        market: &MarketInfo,
        owner: &Pubkey,
    ) -> Result<Vec<OpenOrders>, ClientError> {
        let filters = [
            RpcFilter::memcmp(OPEN_ORDERS_MARKET_OFFSET, market.address().as_ref()),
            RpcFilter::memcmp(OPEN_ORDERS_OWNER_OFFSET, owner.as_ref()),
            RpcFilter::DataSize(OPEN_ORDERS_SPAN as u64),
        ];
        let accounts = connection
            .get_program_accounts(market.program_id(), &filters)
            .await?;

        accounts
            .into_iter()
            .map(|keyed| {
                OpenOrders::decode(keyed.pubkey, &keyed.account.data).map_err(ClientError::from)
            })
            .collect()
    }

    /// Decimals of the base and quote mints. Wrapped SOL is never fetched.
    async fn mint_decimals(
        &self,
        connection: &Connection,
        base_mint: &Pubkey,
        quote_mint: &Pubkey,
    ) -> Result<(u8, u8), ClientError> {
        let mints = [*base_mint, *quote_mint];
        let to_fetch: Vec<Pubkey> = mints
            .iter()
            .filter(|mint| **mint != WRAPPED_SOL_MINT)
            .copied()
            .collect();

        let accounts = if to_fetch.is_empty() {
            Vec::new()
        } else {
            connection.get_multiple_accounts(&to_fetch).await?
        };
        let mut fetched = to_fetch.iter().zip(accounts);

        let mut decimals = [WRAPPED_SOL_DECIMALS; 2];
        for (slot, mint) in decimals.iter_mut().zip(&mints) {
            if *mint == WRAPPED_SOL_MINT {
                continue;
            }
            let (address, account) = fetched
                .next()
                .ok_or(ClientError::AccountNotFound(*mint))?;
            let account = account.ok_or(ClientError::AccountNotFound(*address))?;
            *slot = decode_mint_decimals(&account.data)?;
        }

        Ok((decimals[0], decimals[1]))
    }

    async fn load_side(
        &self,
        connection: &Connection,
        address: &Pubkey,
        expect_bids: bool,
    ) -> Result<Orderbook, ClientError> {
        let kind = if expect_bids { "bids" } else { "asks" };
        let account = fetch_account(connection, address).await?;
        let book = Orderbook::decode(&account.data)?;
        if book.is_bids() != expect_bids {
            return Err(SdkError::invalid_account(kind, "slab holds the other side").into());
        }
        debug!(%address, side = kind, orders = book.orders().len(), "loaded book side");
        Ok(book)
    }
}

#[async_trait]
impl DexProgram for SerumDex {
    async fn load_market(
        &self,
        connection: &Connection,
        address: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<MarketInfo, ClientError> {
        let account = fetch_account(connection, address).await?;
        if account.owner != *program_id {
            return Err(SdkError::invalid_account(
                "market",
                format!("owned by {}, expected {}", account.owner, program_id),
            )
            .into());
        }

        let state = MarketState::decode(address, &account.data)?;
        let (base_decimals, quote_decimals) = self
            .mint_decimals(connection, &state.base_mint, &state.quote_mint)
            .await?;

        let market = MarketInfo::new(*address, *program_id, state, base_decimals, quote_decimals);
        debug!(%market, base_decimals, quote_decimals, "loaded market");
        Ok(market)
    }

    async fn load_bids(
        &self,
        connection: &Connection,
        market: &MarketInfo,
    ) -> Result<Orderbook, ClientError> {
        self.load_side(connection, market.bids_address(), true).await
    }

    async fn load_asks(
        &self,
        connection: &Connection,
        market: &MarketInfo,
    ) -> Result<Orderbook, ClientError> {
        self.load_side(connection, market.asks_address(), false).await
    }

    fn layout_offset(&self, field: MarketField) -> usize {
        field.offset()
    }

    async fn make_place_order_transaction(
        &self,
        connection: &Connection,
        market: &MarketInfo,
        params: PlaceOrderParams,
    ) -> Result<PlaceOrderTransaction, ClientError> {
        let PlaceOrderParams {
            owner,
            payer,
            side,
            price,
            size,
            order_type,
            options,
        } = params;
        let PlaceOrderOptions {
            client_id,
            open_orders_address_key,
            open_orders_account,
            fee_discount_pubkey,
        } = options;

        if market.state().is_disabled() {
            return Err(SdkError::invalid_account("market", "market is disabled").into());
        }

        let limit_price = market.price_number_to_lots(price)?;
        if limit_price == 0 {
            return Err(SdkError::InvalidPrice(format!("{} is below one tick", price)).into());
        }
        let max_base_quantity = market.base_size_number_to_lots(size)?;
        if max_base_quantity == 0 {
            return Err(SdkError::InvalidQuantity(format!("{} is below one lot", size)).into());
        }
        let max_quote_quantity = market
            .state()
            .quote_lot_size
            .checked_mul(max_base_quantity)
            .and_then(|v| v.checked_mul(limit_price))
            .ok_or(SdkError::Overflow)?;

        let mut instructions = Vec::new();
        let mut signers = Vec::new();

        let existing = self
            .find_open_orders_accounts_for_owner(connection, market, &owner)
            .await?;

        let open_orders = match (existing.first(), open_orders_account) {
            (None, account) => {
                let account = account.unwrap_or_else(Keypair::new);
                let lamports = connection
                    .get_minimum_balance_for_rent_exemption(OPEN_ORDERS_SPAN)
                    .await?;
                let address = account.pubkey();
                instructions.push(
                    CreateOpenOrdersBuilder::new(*market.program_id())
                        .owner(owner)
                        .open_orders(address)
                        .lamports(lamports)
                        .build()?,
                );
                signers.push(account);
                debug!(open_orders = %address, lamports, "creating open orders account");
                address
            }
            (Some(_), Some(account)) => account.pubkey(),
            (Some(first), None) => open_orders_address_key.unwrap_or(first.address),
        };

        instructions.push(
            NewOrderV3Builder::new(market)
                .open_orders(open_orders)
                .owner(owner)
                .payer(payer)
                .fee_discount(fee_discount_pubkey)
                .side(side)
                .limit_price(limit_price)
                .max_base_quantity(max_base_quantity)
                .max_quote_quantity(max_quote_quantity)
                .order_type(order_type)
                .self_trade_behavior(SelfTradeBehavior::DecrementTake)
                .client_id(client_id.unwrap_or_default())
                .build()?,
        );

        debug!(
            market = %market.address(),
            %side,
            limit_price,
            max_base_quantity,
            instructions = instructions.len(),
            "built place order transaction"
        );

        Ok(PlaceOrderTransaction {
            transaction: Transaction::new_with_payer(&instructions, Some(&owner)),
            signers,
        })
    }
}
