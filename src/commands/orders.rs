//! Orders command - list open orders for the trading pair

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
    let symbol = &settings.trading.symbol;
    let client = SpotClient::from_settings(&settings);

    println!("{}", banner("OPEN ORDERS"));

    let open_orders = client
        .open_orders(symbol)
        .await
        .context("Failed to list open orders")?;

    if open_orders.is_empty() {
        println!("No open orders found for {}", symbol);
    } else {
        for order in &open_orders {
            println!("----------------------------------");
            println!("Order ID   : {}", order.order_id);
            println!("Symbol     : {}", order.symbol);
            println!("Side       : {}", order.side);
            println!("Type       : {}", order.order_type);
            println!("Status     : {}", order.status);
            println!("Price      : {}", order.price);
            println!("Quantity   : {}", order.orig_qty);
            println!("Executed   : {}", order.executed_qty);
            println!("TimeInForce: {}", order.time_in_force);
            println!("Client ID  : {}", order.client_order_id);
        }
    }
    println!("=================================");

    Ok(())
}
