//! Market client.
//!
//! [`MarketClient`] binds one market address to a ledger connection. It is
//! created without I/O; [`MarketClient::init_market`] loads the market, and
//! until then every query answers with an empty sentinel instead of an
//! error.

use std::sync::Arc;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::client::{ClientError, Connection, KeyedAccount, RpcFilter};
use crate::dex::{DexProgram, SerumDex};
use crate::layout::MarketField;
use crate::types::{
    BidAsk, MarketInfo, OrderBookSnapshot, OrderType, OrderbookOutcome, PlaceOrderOptions,
    PlaceOrderParams, PlaceOrderTransaction, Side,
};

/// Lifecycle of a [`MarketClient`].
#[derive(Debug, Clone)]
enum Lifecycle {
    /// Created, market not loaded.
    Constructed,
    /// Market loaded.
    Ready(MarketInfo),
}

/// Client for one market.
#[derive(Clone)]
pub struct MarketClient {
    connection: Arc<Connection>,
    address: Pubkey,
    program_id: Pubkey,
    dex: Arc<dyn DexProgram>,
    state: Lifecycle,
}

impl std::fmt::Debug for MarketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketClient")
            .field("address", &self.address)
            .field("program_id", &self.program_id)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl MarketClient {
    /// Creates a client for the market at `address` using the Serum adapter.
    #[must_use]
    pub fn new(connection: Arc<Connection>, address: Pubkey, program_id: Pubkey) -> Self {
        Self::with_dex(connection, address, program_id, Arc::new(SerumDex::new()))
    }

    /// Creates a client using a custom program adapter.
    #[must_use]
    pub fn with_dex(
        connection: Arc<Connection>,
        address: Pubkey,
        program_id: Pubkey,
        dex: Arc<dyn DexProgram>,
    ) -> Self {
        Self {
            connection,
            address,
            program_id,
            dex,
            state: Lifecycle::Constructed,
        }
    }

    /// Market address.
    #[must_use]
    pub const fn address(&self) -> &Pubkey {
        &self.address
    }

    /// DEX program address.
    #[must_use]
    pub const fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Loaded market, if initialized.
    #[must_use]
    pub const fn market(&self) -> Option<&MarketInfo> {
        match &self.state {
            Lifecycle::Ready(market) => Some(market),
            Lifecycle::Constructed => None,
        }
    }

    /// Returns true once the market has been loaded.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, Lifecycle::Ready(_))
    }

    /// Loads the market. Queries return sentinels until this succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the market account cannot be fetched or decoded.
    pub async fn init_market(&mut self) -> Result<(), ClientError> {
        let market = self
            .dex
            .load_market(&self.connection, &self.address, &self.program_id)
            .await?;
        debug!(%market, "market initialized");
        self.state = Lifecycle::Ready(market);
        Ok(())
    }

    /// Finds the first market trading `base_mint` against `quote_mint` and
    /// returns an initialized client for it. `None` if no market matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or the market load fails.
    pub async fn find_by_assets(
        connection: Arc<Connection>,
        base_mint: &Pubkey,
        quote_mint: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<Option<Self>, ClientError> {
        Self::find_by_assets_with(
            connection,
            base_mint,
            quote_mint,
            program_id,
            Arc::new(SerumDex::new()),
        )
        .await
    }

    /// [`find_by_assets`](Self::find_by_assets) with a custom program adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or the market load fails.
    pub async fn find_by_assets_with(
        connection: Arc<Connection>,
        base_mint: &Pubkey,
        quote_mint: &Pubkey,
        program_id: &Pubkey,
        dex: Arc<dyn DexProgram>,
    ) -> Result<Option<Self>, ClientError> {
        let accounts = Self::market_accounts_by_mints(
            &connection,
            dex.as_ref(),
            base_mint,
            quote_mint,
            program_id,
        )
        .await?;

        let Some(first) = accounts.into_iter().next() else {
            debug!(%base_mint, %quote_mint, "no market for asset pair");
            return Ok(None);
        };

        let mut client = Self::with_dex(connection, first.pubkey, *program_id, dex);
        client.init_market().await?;
        Ok(Some(client))
    }

    /// Lists the market accounts of `program_id` whose base and quote mints
    /// match, in the order the node returns them.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rpc`] carrying the node's message unchanged
    /// if the node rejects the query.
    pub async fn get_market_by_asset_keys(
        connection: &Connection,
        base_mint: &Pubkey,
        quote_mint: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<Vec<KeyedAccount>, ClientError> {
        Self::market_accounts_by_mints(
            connection,
            &SerumDex::new(),
            base_mint,
            quote_mint,
            program_id,
        )
        .await
    }

    async fn market_accounts_by_mints(
        connection: &Connection,
        dex: &dyn DexProgram,
        base_mint: &Pubkey,
        quote_mint: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<Vec<KeyedAccount>, ClientError> {
        let filters = [
            RpcFilter::memcmp(dex.layout_offset(MarketField::BaseMint), base_mint.as_ref()),
            RpcFilter::memcmp(dex.layout_offset(MarketField::QuoteMint), quote_mint.as_ref()),
        ];
        connection.get_program_accounts(program_id, &filters).await
    }

    /// Best bid and ask. Both `None` before initialization.
    ///
    /// # Errors
    ///
    /// Returns an error if either book side cannot be loaded.
    pub async fn get_bid_ask_spread(&self) -> Result<BidAsk, ClientError> {
        let Lifecycle::Ready(market) = &self.state else {
            return Ok(BidAsk::none());
        };

        let bids = self.dex.load_bids(&self.connection, market).await?;
        let asks = self.dex.load_asks(&self.connection, market).await?;

        let bid = bids
            .best()
            .map(|order| market.price_lots_to_number(order.price_lots()))
            .transpose()?;
        let ask = asks
            .best()
            .map(|order| market.price_lots_to_number(order.price_lots()))
            .transpose()?;

        Ok(BidAsk { bid, ask })
    }

    /// Reads up to `depth` aggregated levels per side.
    ///
    /// Never fails: a load or decode failure is logged and reported as
    /// [`OrderbookOutcome::Failed`].
    pub async fn get_orderbook(&self, depth: usize) -> OrderbookOutcome {
        let Lifecycle::Ready(market) = &self.state else {
            return OrderbookOutcome::NotReady;
        };

        match self.read_orderbook(market, depth).await {
            Ok(book) => OrderbookOutcome::Loaded(book),
            Err(e) => {
                warn!(market = %self.address, error = %e, "failed to load order book");
                OrderbookOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn read_orderbook(
        &self,
        market: &MarketInfo,
        depth: usize,
    ) -> Result<OrderBookSnapshot, ClientError> {
        let (bids, asks) = tokio::try_join!(
            self.dex.load_bids(&self.connection, market),
            self.dex.load_asks(&self.connection, market),
        )?;

        Ok(OrderBookSnapshot {
            bids: market.book_levels(&bids, depth)?,
            asks: market.book_levels(&asks, depth)?,
        })
    }

    /// Midpoint of the best bid and ask. `None` if either side is empty or
    /// the market is not initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if either book side cannot be loaded.
    pub async fn get_price(&self) -> Result<Option<Decimal>, ClientError> {
        Ok(self.get_bid_ask_spread().await?.midpoint())
    }

    /// Builds an unsigned transaction placing an order.
    ///
    /// Arguments are handed to the program adapter unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotReady`] before initialization, or the
    /// adapter's error.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_place_order_tx(
        &self,
        owner: Pubkey,
        payer: Pubkey,
        side: Side,
        price: Decimal,
        size: Decimal,
        order_type: OrderType,
        options: PlaceOrderOptions,
    ) -> Result<PlaceOrderTransaction, ClientError> {
        let Lifecycle::Ready(market) = &self.state else {
            return Err(ClientError::NotReady);
        };

        let params = PlaceOrderParams {
            owner,
            payer,
            side,
            price,
            size,
            order_type,
            options,
        };
        self.dex
            .make_place_order_transaction(&self.connection, market, params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;
    use solana_sdk::transaction::Transaction;

    use super::*;
    use crate::client::connection::tests::{mock_connection, ui_account, with_context};
    use crate::client::http::tests::MockSender;
    use crate::error::SdkError;
    use crate::layout::market::tests::market_account_data;
    use crate::layout::{LeafNode, MarketState, Orderbook};
    use crate::types::market::tests::test_market;

    /// Recorded call to `make_place_order_transaction`.
    #[derive(Debug, Clone, PartialEq)]
    struct PlaceOrderCall {
        owner: Pubkey,
        payer: Pubkey,
        side: Side,
        price: Decimal,
        size: Decimal,
        order_type: OrderType,
        client_id: Option<u64>,
        open_orders_address_key: Option<Pubkey>,
        open_orders_account: Option<Pubkey>,
        fee_discount_pubkey: Option<Pubkey>,
    }

    /// Adapter serving a fixed market and fixed book sides.
    #[derive(Default)]
    struct MockDex {
        market: Option<MarketInfo>,
        bids: Vec<(u64, u64)>,
        asks: Vec<(u64, u64)>,
        fail_asks: bool,
        calls: Mutex<Vec<PlaceOrderCall>>,
    }

    impl MockDex {
        fn book(is_bids: bool, levels: &[(u64, u64)]) -> Orderbook {
            let orders = levels
                .iter()
                .enumerate()
                .map(|(seq, (price, qty))| LeafNode {
                    owner_slot: 0,
                    fee_tier: 0,
                    key: LeafNode::key_for(*price, seq as u64),
                    owner: Pubkey::new_unique(),
                    quantity: *qty,
                    client_order_id: 0,
                })
                .collect();
            Orderbook::from_orders(is_bids, orders)
        }
    }

    #[async_trait]
    impl DexProgram for MockDex {
        async fn load_market(
            &self,
            _connection: &Connection,
            address: &Pubkey,
            _program_id: &Pubkey,
        ) -> Result<MarketInfo, ClientError> {
            self.market
                .clone()
                .ok_or(ClientError::AccountNotFound(*address))
        }

        async fn load_bids(
            &self,
            _connection: &Connection,
            _market: &MarketInfo,
        ) -> Result<Orderbook, ClientError> {
            Ok(Self::book(true, &self.bids))
        }

        async fn load_asks(
            &self,
            _connection: &Connection,
            _market: &MarketInfo,
        ) -> Result<Orderbook, ClientError> {
            if self.fail_asks {
                return Err(SdkError::invalid_account("asks", "corrupt slab").into());
            }
            Ok(Self::book(false, &self.asks))
        }

        fn layout_offset(&self, field: MarketField) -> usize {
            field.offset()
        }

        async fn make_place_order_transaction(
            &self,
            _connection: &Connection,
            _market: &MarketInfo,
            params: PlaceOrderParams,
        ) -> Result<PlaceOrderTransaction, ClientError> {
            self.calls.lock().expect("lock").push(PlaceOrderCall {
                owner: params.owner,
                payer: params.payer,
                side: params.side,
                price: params.price,
                size: params.size,
                order_type: params.order_type,
                client_id: params.options.client_id,
                open_orders_address_key: params.options.open_orders_address_key,
                open_orders_account: params.options.open_orders_account.as_ref().map(|k| k.pubkey()),
                fee_discount_pubkey: params.options.fee_discount_pubkey,
            });
            Ok(PlaceOrderTransaction {
                transaction: Transaction::new_with_payer(&[], Some(&params.owner)),
                signers: Vec::new(),
            })
        }
    }

    fn client_with(dex: MockDex) -> (Arc<MockSender>, MarketClient, Arc<MockDex>) {
        let (sender, connection) = mock_connection();
        let dex = Arc::new(dex);
        let client = MarketClient::with_dex(
            Arc::new(connection),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            dex.clone(),
        );
        (sender, client, dex)
    }

    /// Mock with a loaded market: bids 10/9, asks 12/13 (in price lots of 0.001).
    fn ready_dex() -> MockDex {
        MockDex {
            market: Some(test_market()),
            bids: vec![(10_000, 100), (10_000, 50), (9_000, 200)],
            asks: vec![(12_000, 300), (13_000, 400)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_not_ready_sentinels() {
        let (_sender, client, _dex) = client_with(ready_dex());
        assert!(!client.is_ready());
        assert!(client.market().is_none());

        assert_eq!(client.get_bid_ask_spread().await.expect("spread"), BidAsk::none());
        assert_eq!(client.get_price().await.expect("price"), None);

        let outcome = client.get_orderbook(5).await;
        assert_eq!(outcome, OrderbookOutcome::NotReady);
        assert!(outcome.into_book().is_empty());
    }

    #[tokio::test]
    async fn test_place_order_before_init_fails() {
        let (_sender, client, dex) = client_with(ready_dex());
        let result = client
            .create_place_order_tx(
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                Side::Buy,
                Decimal::ONE,
                Decimal::ONE,
                OrderType::Limit,
                PlaceOrderOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(ClientError::NotReady)));
        assert!(dex.calls.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_init_market_failure_keeps_constructed() {
        let (_sender, mut client, _dex) = client_with(MockDex::default());
        let result = client.init_market().await;
        assert!(matches!(result, Err(ClientError::AccountNotFound(_))));
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_bid_ask_and_price() {
        let (_sender, mut client, _dex) = client_with(ready_dex());
        client.init_market().await.expect("init");
        assert!(client.is_ready());

        let quote = client.get_bid_ask_spread().await.expect("spread");
        assert_eq!(quote.bid, Some(Decimal::new(10, 0)));
        assert_eq!(quote.ask, Some(Decimal::new(12, 0)));
        assert_eq!(client.get_price().await.expect("price"), Some(Decimal::new(11, 0)));
    }

    #[tokio::test]
    async fn test_price_with_empty_side() {
        let (_sender, mut client, _dex) = client_with(MockDex {
            asks: Vec::new(),
            ..ready_dex()
        });
        client.init_market().await.expect("init");

        let quote = client.get_bid_ask_spread().await.expect("spread");
        assert_eq!(quote.bid, Some(Decimal::new(10, 0)));
        assert_eq!(quote.ask, None);
        assert_eq!(client.get_price().await.expect("price"), None);
    }

    #[tokio::test]
    async fn test_orderbook_depth_and_aggregation() {
        let (_sender, mut client, _dex) = client_with(ready_dex());
        client.init_market().await.expect("init");

        let book = match client.get_orderbook(1).await {
            OrderbookOutcome::Loaded(book) => book,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.asks.len(), 1);
        assert_eq!(book.bids[0].price, Decimal::new(10, 0));
        assert_eq!(book.bids[0].size_lots, 150);
        assert_eq!(book.bids[0].size, Decimal::new(15, 2));
        assert_eq!(book.asks[0].price, Decimal::new(12, 0));

        let full = client.get_orderbook(10).await.into_book();
        assert_eq!(full.bids.len(), 2);
        assert_eq!(full.asks.len(), 2);
        assert_eq!(full.bids[1].price, Decimal::new(9, 0));
    }

    #[tokio::test]
    async fn test_orderbook_failure_is_masked() {
        let (_sender, mut client, _dex) = client_with(MockDex {
            fail_asks: true,
            ..ready_dex()
        });
        client.init_market().await.expect("init");

        let outcome = client.get_orderbook(5).await;
        assert!(matches!(outcome, OrderbookOutcome::Failed { .. }));
        assert!(outcome.into_book().is_empty());

        assert!(client.get_bid_ask_spread().await.is_err());
    }

    #[tokio::test]
    async fn test_orderbook_conversion_failure_is_masked() {
        let address = Pubkey::new_unique();
        let data = market_account_data(
            &address,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            0,
            1,
        );
        let state = MarketState::decode(&address, &data).expect("decode market");
        let (_sender, mut client, _dex) = client_with(MockDex {
            market: Some(MarketInfo::new(address, Pubkey::new_unique(), state, 9, 6)),
            ..ready_dex()
        });
        client.init_market().await.expect("init");

        let outcome = client.get_orderbook(5).await;
        assert_eq!(
            outcome,
            OrderbookOutcome::Failed {
                reason: SdkError::DivisionByZero.to_string(),
            }
        );
        assert!(outcome.into_book().is_empty());
    }

    #[tokio::test]
    async fn test_create_place_order_tx_forwards_arguments() {
        let (_sender, mut client, dex) = client_with(ready_dex());
        client.init_market().await.expect("init");

        let owner = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let address_key = Pubkey::new_unique();
        let fee_discount = Pubkey::new_unique();
        let keypair = Keypair::new();
        let keypair_pubkey = keypair.pubkey();

        let options = PlaceOrderOptions::default()
            .with_client_id(42)
            .with_open_orders_address(address_key)
            .with_open_orders_account(keypair)
            .with_fee_discount(fee_discount);

        let result = client
            .create_place_order_tx(
                owner,
                payer,
                Side::Sell,
                Decimal::new(-5, 1),
                Decimal::new(123_456_789, 9),
                OrderType::PostOnly,
                options,
            )
            .await
            .expect("transaction");
        assert_eq!(result.transaction.message.account_keys[0], owner);

        let calls = dex.calls.lock().expect("lock").clone();
        assert_eq!(
            calls,
            vec![PlaceOrderCall {
                owner,
                payer,
                side: Side::Sell,
                price: Decimal::new(-5, 1),
                size: Decimal::new(123_456_789, 9),
                order_type: OrderType::PostOnly,
                client_id: Some(42),
                open_orders_address_key: Some(address_key),
                open_orders_account: Some(keypair_pubkey),
                fee_discount_pubkey: Some(fee_discount),
            }]
        );
    }

    #[tokio::test]
    async fn test_find_by_assets_no_match() {
        let (sender, connection) = mock_connection();
        sender.respond("getProgramAccounts", json!([]));

        let found = MarketClient::find_by_assets(
            Arc::new(connection),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
        )
        .await
        .expect("lookup");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_by_assets_first_match() {
        let (sender, connection) = mock_connection();
        let program_id = Pubkey::new_unique();
        let base_mint = Pubkey::new_unique();
        let quote_mint = Pubkey::new_unique();
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();

        let market_data = |address: &Pubkey| {
            market_account_data(
                address,
                &base_mint,
                &quote_mint,
                &Pubkey::new_unique(),
                &Pubkey::new_unique(),
                100,
                10,
            )
        };
        sender.respond(
            "getProgramAccounts",
            json!([
                { "pubkey": first.to_string(), "account": ui_account(&program_id, &market_data(&first)) },
                { "pubkey": second.to_string(), "account": ui_account(&program_id, &market_data(&second)) },
            ]),
        );
        sender.respond(
            "getAccountInfo",
            with_context(ui_account(&program_id, &market_data(&first))),
        );
        let mut mint = vec![0u8; 82];
        mint[44] = 6;
        sender.respond(
            "getMultipleAccounts",
            with_context(json!([
                ui_account(&Pubkey::new_unique(), &mint),
                ui_account(&Pubkey::new_unique(), &mint),
            ])),
        );

        let client = MarketClient::find_by_assets(
            Arc::new(connection),
            &base_mint,
            &quote_mint,
            &program_id,
        )
        .await
        .expect("lookup")
        .expect("market");

        assert_eq!(client.address(), &first);
        assert!(client.is_ready());
        assert_eq!(client.market().map(MarketInfo::base_mint), Some(&base_mint));

        let requests = sender.requests();
        let filters = &requests[0].1[1]["filters"];
        assert_eq!(filters[0]["memcmp"]["offset"], json!(53));
        assert_eq!(filters[0]["memcmp"]["bytes"], json!(base_mint.to_string()));
        assert_eq!(filters[1]["memcmp"]["offset"], json!(85));
        assert_eq!(filters[1]["memcmp"]["bytes"], json!(quote_mint.to_string()));
    }

    #[tokio::test]
    async fn test_get_market_by_asset_keys_error_verbatim() {
        let (sender, connection) = mock_connection();
        sender.push("getProgramAccounts", json!({ "error": { "message": "x" } }));

        let err = MarketClient::get_market_by_asset_keys(
            &connection,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
        )
        .await
        .expect_err("error");
        assert_eq!(err.to_string(), "x");
    }

    #[tokio::test]
    async fn test_find_by_assets_error_verbatim() {
        let (sender, connection) = mock_connection();
        sender.push(
            "getProgramAccounts",
            json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32600, "message": "x" } }),
        );

        let err = MarketClient::find_by_assets(
            Arc::new(connection),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
        )
        .await
        .expect_err("error");
        assert_eq!(err.to_string(), "x");
    }
}
