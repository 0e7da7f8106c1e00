//! Buy-the-dip command
//!
//! Baseline market buy plus a limit order resting below the current price.
//! The dip percentage scales with 24h volatility; stale limit orders from
//! previous runs are cancelled first.

use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

use crate::binance::types::FillSummary;
use crate::binance::SpotClient;
use crate::commands::{banner, signed};
use crate::config::Settings;
use crate::dip::{scale_dip_percent, DipTarget};
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
    let baseline = trading.baseline_amount;

    println!("\n{}", banner("START EXECUTION"));
    println!("Datetime (UTC): {}", Utc::now().to_rfc3339());
    println!("Environment: {}", settings.environment);
    println!("=====================================");

    let account = client.account().await.context("Failed to fetch balances")?;
    let base_before = account.free_balance(&trading.quote_asset);
    let btc_before = account.free_balance(&trading.target_asset);
    println!("Initial {} balance : {}", trading.quote_asset, base_before);
    println!("Initial {} balance : {}", trading.target_asset, btc_before);

    // Safety checks for real money
    if !settings.environment.is_testnet() {
        safety::check_balance(&trading, base_before)?;
        safety::check_spend_limit(&trading)?;
    }
    println!("-------------------------------------");

    // Cancel limit orders left over from previous runs
    let open_orders = client
        .open_orders(&trading.symbol)
        .await
        .context("Failed to list open orders")?;
    for order in &open_orders {
        println!("Cancelling old order: {} @ {}", order.order_id, order.price);
        info!("Cancelling stale order {}", order.order_id);
        client
            .cancel_order(&trading.symbol, order.order_id)
            .await
            .with_context(|| format!("Failed to cancel order {}", order.order_id))?;
    }

    // Current price and volatility-scaled dip percentage
    let price_now = client
        .ticker_price(&trading.symbol)
        .await
        .context("Failed to fetch current price")?
        .price;

    let dip_percent = match client.ticker_24hr(&trading.symbol).await {
        Ok(ticker) => scale_dip_percent(ticker.price_change_percent, &trading.dip_scale),
        Err(e) => {
            // The one locally recovered fault: fall back to the minimum dip
            warn!("Failed to fetch 24h ticker ({}), using minimum dip", e);
            trading.dip_scale.min_dip
        }
    };

    println!(
        "Current {} price: {} {}",
        trading.symbol, price_now, trading.quote_asset
    );
    println!(
        "24h volatility-based dip percentage: {}%\n",
        (dip_percent * dec!(100)).round_dp(1)
    );

    // 1) Baseline market buy
    println!(
        "Executing BASELINE market buy of {} {}...",
        baseline, trading.quote_asset
    );
    let base_order = client
        .market_buy_quote(&trading.symbol, baseline)
        .await
        .context("Baseline market order failed")?;

    for fill in &base_order.fills {
        println!(
            "   Fill: {} {} @ {} (fee {} {})",
            fill.qty, trading.target_asset, fill.price, fill.commission, fill.commission_asset
        );
    }

    let fills = FillSummary::from_fills(&base_order.fills);
    if let Some(avg_price) = fills.average_price {
        println!(
            "BASELINE -> Bought {} {} for {} {} (avg price {})",
            fills.quantity,
            trading.target_asset,
            fills.cost.round_dp(2),
            trading.quote_asset,
            avg_price.round_dp(2)
        );
        if fills.commission > Decimal::ZERO {
            println!(
                "   Total commission: {} {}",
                fills.commission, trading.target_asset
            );
        }
    }
    println!("-------------------------------------");

    // 2) Place limit order for the dip
    let filters = client
        .symbol_filters(&trading.symbol)
        .await
        .context("Failed to fetch trading filters")?;
    info!(
        "Filters for {}: tick={} step={} min_qty={} min_notional={}",
        trading.symbol, filters.tick_size, filters.step_size, filters.min_qty, filters.min_notional
    );

    let target = DipTarget::compute(price_now, dip_percent, baseline, &filters)
        .context("Dip target is not placeable")?;

    println!("Placing DIP order:");
    println!("   Amount {} : {}", trading.quote_asset, baseline);
    println!(
        "   Target price: {} {} ({}% below current)",
        target.price,
        trading.quote_asset,
        (dip_percent * dec!(100)).round_dp(2)
    );
    println!("   Quantity {}: {}", trading.target_asset, target.quantity);

    let dip_order = client
        .limit_buy_gtc(&trading.symbol, target.price, target.quantity)
        .await
        .context("Dip limit order failed")?;
    println!("DIP order placed with ID {}", dip_order.order_id);
    info!("Dip limit order {} resting at {}", dip_order.order_id, target.price);
    println!("-------------------------------------");

    // Final state
    let account = client
        .account()
        .await
        .context("Failed to fetch final balances")?;
    let base_after = account.free_balance(&trading.quote_asset);
    let btc_after = account.free_balance(&trading.target_asset);

    println!("{}", banner("FINAL SUMMARY"));
    println!(
        "Final {} balance : {} ({})",
        trading.quote_asset,
        base_after,
        signed(base_after - base_before)
    );
    println!(
        "Final {} balance : {} ({})",
        trading.target_asset,
        btc_after,
        signed(btc_after - btc_before)
    );
    println!("===================================\n");

    let record = TradeRecord {
        datetime_utc: Utc::now(),
        action: "buy_the_dip".to_string(),
        symbol: trading.symbol.clone(),
        base_currency: trading.quote_asset.clone(),
        base_amount: baseline,
        btc_qty: fills.quantity,
        avg_price: fills.average_price,
        fee: fills.commission,
        dip_price: Some(target.price),
        dip_qty: Some(target.quantity),
        base_before,
        base_after,
        btc_before,
        btc_after,
    };
    append_trade(&history_file, &record).context("Failed to log trade")?;
    println!("Trade logged to {}", history_file);

    let summary = format!(
        "Bitcoin Buy Order Executed ({})\n\n\
         Trading Pair: {}\n\
         Market Buy: {} {}\n\
         Bitcoin Purchased: {}\n\
         Average Price: {} {}\n\
         Trading Fee: {} {}\n\
         Limit Order Price: {} {} (-{}%)\n\
         Limit Order Quantity: {} {}\n\n\
         {} Balance: {} -> {} ({})\n\
         {} Balance: {} -> {} ({})\n\n\
         Strategy: Market buy + limit order placed for next dip\n\
         Executed: {} UTC",
        settings.environment,
        trading.symbol,
        baseline,
        trading.quote_asset,
        fills.quantity,
        fills
            .average_price
            .map(|p| p.round_dp(2).to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        trading.quote_asset,
        fills.commission,
        trading.target_asset,
        target.price,
        trading.quote_asset,
        (dip_percent * dec!(100)).round_dp(1),
        target.quantity,
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

    // Notification failure never unwinds the orders already placed
    let delivery = Notifier::new(&settings.telegram).send(&summary).await;
    if delivery.is_sent() {
        info!("Telegram notification sent");
    } else {
        warn!("Telegram notification {}", delivery);
    }
    println!("Telegram notification: {}", delivery);

    Ok(())
}
