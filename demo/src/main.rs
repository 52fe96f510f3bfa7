//! Serum market demo binary.
//!
//! Connects to a cluster, opens one market and prints its top of book.

use std::sync::Arc;

use anyhow::Context;
use serum_market_demo::{render_top_of_book, DemoConfig, MarketSelector};
use serum_market_sdk::{Connection, MarketClient, RpcConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,serum_market_sdk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = DemoConfig::from_env()?;
    config.validate()?;
    let program_id = config.parse_program_id()?;

    tracing::info!("Solana RPC URL: {}", config.rpc_url);
    tracing::info!("DEX program: {}", program_id);

    let connection = Arc::new(Connection::new(
        RpcConfig::new(&config.rpc_url).with_commitment(config.commitment),
    )?);

    let market = match config.market_selector()? {
        MarketSelector::Address(address) => {
            tracing::info!("Opening market {}", address);
            let mut market = MarketClient::new(connection, address, program_id);
            market
                .init_market()
                .await
                .with_context(|| format!("failed to load market {}", address))?;
            market
        }
        MarketSelector::Mints { base, quote } => {
            tracing::info!("Searching market for {}/{}", base, quote);
            MarketClient::find_by_assets(connection, &base, &quote, &program_id)
                .await?
                .with_context(|| format!("no market trades {}/{}", base, quote))?
        }
    };

    if let Some(info) = market.market() {
        tracing::info!(
            "Market {} tick size {}, min order size {}",
            info,
            info.tick_size()?,
            info.min_order_size()?
        );
    }

    let quote = market.get_bid_ask_spread().await?;
    let outcome = market.get_orderbook(config.depth).await;
    if let serum_market_sdk::OrderbookOutcome::Failed { reason } = &outcome {
        tracing::warn!("Order book unavailable: {}", reason);
    }

    let label = market
        .market()
        .map_or_else(|| market.address().to_string(), ToString::to_string);
    println!("{}", render_top_of_book(&label, &quote, &outcome.into_book()));

    Ok(())
}
