//! Cancel command - cancel every open order for the trading pair

use anyhow::{Context, Result};
use tracing::info;

use crate::binance::SpotClient;
use crate::commands::banner;
use crate::config::Settings;

pub fn run(testnet: Option<bool>) -> Result<()> {
    let settings = Settings::load(testnet);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(execute(settings))
}

async fn execute(settings: Settings) -> Result<()> {
    let symbol = &settings.trading.symbol;
    let client = SpotClient::from_settings(&settings);

    println!("{}", banner("CANCEL ALL ORDERS"));

    let open_orders = client
        .open_orders(symbol)
        .await
        .context("Failed to list open orders")?;

    if open_orders.is_empty() {
        println!("No open orders found for {}", symbol);
    } else {
        for order in &open_orders {
            println!(
                "Cancelling order {} | Side: {} | Price: {}",
                order.order_id, order.side, order.price
            );
            client
                .cancel_order(symbol, order.order_id)
                .await
                .with_context(|| format!("Failed to cancel order {}", order.order_id))?;
            info!("Cancelled order {}", order.order_id);
        }
    }

    println!("Done.");
    println!("=======================================");

    Ok(())
}
