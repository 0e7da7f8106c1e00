//! Executions command - detect recently filled dip orders
//!
//! Scans recent account trades for fills inside the lookback window and
//! pushes a notification per fill. Meant to run on a schedule after a
//! buy-the-dip limit order has been left resting.

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::binance::SpotClient;
use crate::commands::banner;
use crate::config::Settings;
use crate::telegram::Notifier;

/// Number of recent trades to inspect
const TRADE_FETCH_LIMIT: u32 = 10;

pub fn run(testnet: Option<bool>, window_mins: i64) -> Result<()> {
    let settings = Settings::load(testnet);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(execute(settings, window_mins))
}

async fn execute(settings: Settings, window_mins: i64) -> Result<()> {
    let trading = &settings.trading;
    let client = SpotClient::from_settings(&settings);
    let notifier = Notifier::new(&settings.telegram);

    println!("\n{}", banner("CHECKING ORDER EXECUTIONS"));
    println!("Datetime (UTC): {}", Utc::now().to_rfc3339());
    println!("===============================================");

    let trades = match client.my_trades(&trading.symbol, TRADE_FETCH_LIMIT).await {
        Ok(trades) => trades,
        Err(e) => {
            // Best-effort reporting: surface the fault over Telegram and
            // finish cleanly so a scheduled run does not flap
            warn!("Error checking executions: {}", e);
            println!("Error checking executions: {}", e);
            let delivery = notifier
                .send(&format!("Error checking order executions: {}", e))
                .await;
            info!("Error notification {}", delivery);
            return Ok(());
        }
    };

    if trades.is_empty() {
        println!("No recent trades found");
        return Ok(());
    }

    let threshold = Utc::now() - Duration::minutes(window_mins);
    let recent: Vec<_> = trades
        .iter()
        .filter(|t| t.executed_at() > threshold)
        .collect();

    if recent.is_empty() {
        println!("No executions in the last {} minutes", window_mins);
        return Ok(());
    }

    for trade in recent {
        println!(
            "Recent execution: {} {} @ {} {}",
            trade.qty, trading.target_asset, trade.price, trading.quote_asset
        );
        info!("Fill detected: trade {} order {}", trade.id, trade.order_id);

        let message = format!(
            "DIP ORDER EXECUTED! ({})\n\n\
             Trading Pair: {}\n\
             Order Type: Limit Order Fill\n\
             Quantity: {} {}\n\
             Execution Price: {} {}\n\
             Total Cost: {} {}\n\
             Trading Fee: {} {}\n\
             Order ID: {}\n\
             Trade ID: {}\n\
             Execution Time: {} UTC\n\n\
             Your buy-the-dip limit order was filled successfully!\n\
             Market dipped to your target price and triggered the purchase.",
            settings.environment,
            trading.symbol,
            trade.qty,
            trading.target_asset,
            trade.price,
            trading.quote_asset,
            trade.notional().round_dp(2),
            trading.quote_asset,
            trade.commission,
            trade.commission_asset,
            trade.order_id,
            trade.id,
            trade.executed_at().format("%d/%m/%Y %H:%M:%S")
        );

        let delivery = notifier.send(&message).await;
        println!("Telegram notification: {}", delivery);
        if !delivery.is_sent() {
            warn!("Telegram notification {}", delivery);
        }
    }

    Ok(())
}
