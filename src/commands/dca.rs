//! Simple DCA command - fixed-amount market buy
//!
//! One market buy of the configured quote amount, logged to the history
//! file and summarised over Telegram.

use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::binance::types::FillSummary;
use crate::binance::SpotClient;
use crate::commands::{banner, signed};
use crate::config::Settings;
use crate::history::{append_trade, TradeRecord};
use crate::safety;
use crate::telegram::Notifier;

pub fn run(
    testnet: Option<bool>,
    amount: Option<Decimal>,
    history_file: String,
) -> Result<()> {
    let mut settings = Settings::load(testnet);
    if let Some(amount) = amount {
        settings = settings.with_baseline_amount(amount);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(execute(settings, history_file))
}

async fn execute(settings: Settings, history_file: String) -> Result<()> {
    let trading = settings.trading.clone();
    let client = SpotClient::from_settings(&settings);
    let amount = trading.baseline_amount;

    println!("\n{}", banner("SIMPLE DCA"));
    println!("Datetime (UTC): {}", Utc::now().to_rfc3339());
    println!("Environment: {}", settings.environment);
    println!("====================================");

    let account = client.account().await.context("Failed to fetch balances")?;
    let base_before = account.free_balance(&trading.quote_asset);
    let btc_before = account.free_balance(&trading.target_asset);
    println!("{} available: {}", trading.quote_asset, base_before);
    println!("{} available: {}", trading.target_asset, btc_before);

    // Safety check for real money
    if !settings.environment.is_testnet() {
        safety::check_balance(&trading, base_before)?;
    }

    println!(
        "\nExecuting market buy: {} {} -> {}",
        amount, trading.quote_asset, trading.target_asset
    );
    info!("Placing market buy of {} {}", amount, trading.quote_asset);

    let order = client
        .market_buy_quote(&trading.symbol, amount)
        .await
        .context("Market order failed")?;

    for fill in &order.fills {
        println!(
            "Fill: {} {} @ {} {} (fee: {} {})",
            fill.qty,
            trading.target_asset,
            fill.price,
            trading.quote_asset,
            fill.commission,
            fill.commission_asset
        );
    }

    let fills = FillSummary::from_fills(&order.fills);

    println!("{}", banner("ORDER EXECUTED"));
    println!("Order ID: {}", order.order_id);
    println!("Symbol: {}", order.symbol);
    println!("Status: {}", order.status);
    println!("{} Purchased: {}", trading.target_asset, fills.quantity);
    println!(
        "Total Cost: {} {}",
        fills.cost.round_dp(2),
        trading.quote_asset
    );
    if let Some(avg_price) = fills.average_price {
        println!(
            "Average Price: {} {}",
            avg_price.round_dp(2),
            trading.quote_asset
        );
    }
    println!("Commission: {} {}", fills.commission, trading.target_asset);
    println!("===================================");

    let account = client
        .account()
        .await
        .context("Failed to fetch final balances")?;
    let base_after = account.free_balance(&trading.quote_asset);
    let btc_after = account.free_balance(&trading.target_asset);

    println!("{}", banner("FINAL BALANCES"));
    println!(
        "{}: {} -> {} ({})",
        trading.quote_asset,
        base_before,
        base_after,
        signed(base_after - base_before)
    );
    println!(
        "{}: {} -> {} ({})",
        trading.target_asset,
        btc_before,
        btc_after,
        signed(btc_after - btc_before)
    );
    println!("===================================");

    let record = TradeRecord {
        datetime_utc: Utc::now(),
        action: "simple_dca".to_string(),
        symbol: trading.symbol.clone(),
        base_currency: trading.quote_asset.clone(),
        base_amount: amount,
        btc_qty: fills.quantity,
        avg_price: fills.average_price,
        fee: fills.commission,
        dip_price: None,
        dip_qty: None,
        base_before,
        base_after,
        btc_before,
        btc_after,
    };
    append_trade(&history_file, &record).context("Failed to log trade")?;
    println!("Trade logged to {}", history_file);

    let summary = format!(
        "Simple DCA Purchase Executed ({})\n\n\
         Trading Pair: {}\n\
         Purchase Amount: {} {}\n\
         Bitcoin Purchased: {}\n\
         Average Price: {} {}\n\
         Trading Fee: {} {}\n\n\
         {} Balance: {} -> {} ({})\n\
         {} Balance: {} -> {} ({})\n\n\
         Strategy: Simple DCA market buy only\n\
         Executed: {} UTC",
        settings.environment,
        trading.symbol,
        amount,
        trading.quote_asset,
        fills.quantity,
        fills
            .average_price
            .map(|p| p.round_dp(2).to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        trading.quote_asset,
        fills.commission,
        trading.target_asset,
        trading.quote_asset,
        base_before,
        base_after,
        signed(base_after - base_before),
        trading.target_asset,
        btc_before,
        btc_after,
        signed(btc_after - btc_before),
        Utc::now().format("%d/%m/%Y %H:%M:%S")
    );

    // Notification failure never unwinds a completed purchase
    let delivery = Notifier::new(&settings.telegram).send(&summary).await;
    if delivery.is_sent() {
        info!("Telegram notification sent");
    } else {
        warn!("Telegram notification {}", delivery);
    }
    println!("Telegram notification: {}", delivery);

    Ok(())
}
