//! Ping command - connectivity check plus a quick account snapshot

use anyhow::{Context, Result};

use crate::binance::SpotClient;
use crate::commands::banner;
use crate::config::Settings;

pub fn run(testnet: Option<bool>) -> Result<()> {
    let settings = Settings::load(testnet);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(execute(settings))
}

async fn execute(settings: Settings) -> Result<()> {
    let trading = &settings.trading;
    let client = SpotClient::from_settings(&settings);

    println!("{}", banner("PING"));
    println!("Environment: {}", settings.environment);

    let reachable = client.ping().await.context("Ping failed")?;
    println!("Ping: {}", if reachable { "ok" } else { "unreachable" });

    let ticker = client
        .ticker_price(&trading.symbol)
        .await
        .context("Failed to fetch price")?;
    println!(
        "{} price: {} {}",
        trading.symbol, ticker.price, trading.quote_asset
    );

    let balance = client
        .free_balance(&trading.quote_asset)
        .await
        .context("Failed to fetch balance")?;
    println!("{} available: {}", trading.quote_asset, balance);
    println!("=================================");

    Ok(())
}
