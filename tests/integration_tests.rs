//! Integration tests for the DCA bot
//!
//! These tests exercise the pieces a strategy run wires together: filter
//! parsing feeding the dip maths, the history log, chunked notifications,
//! and the safety checks, all without touching the network.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use dca_bot::binance::types::{ExchangeInfo, Fill, FillSummary, SymbolFilters};
use dca_bot::config::{DipScale, Environment, TradingSettings};
use dca_bot::dip::{floor_to_step, scale_dip_percent, DipTarget};
use dca_bot::history::{append_trade, load_history, HistoryTotals, TradeRecord, HISTORY_HEADER};
use dca_bot::safety;
use dca_bot::telegram::{chunk_message, CHUNK_LIMIT};

// =============================================================================
// Test Utilities
// =============================================================================

fn btc_filters() -> SymbolFilters {
    SymbolFilters {
        tick_size: dec!(0.01),
        step_size: dec!(0.00001),
        min_qty: dec!(0.00001),
        min_notional: dec!(5),
    }
}

fn sample_record(action: &str, qty: Decimal, with_dip: bool) -> TradeRecord {
    TradeRecord {
        datetime_utc: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        action: action.to_string(),
        symbol: "BTCEUR".to_string(),
        base_currency: "EUR".to_string(),
        base_amount: dec!(10.00),
        btc_qty: qty,
        avg_price: Some(dec!(50000.00)),
        fee: dec!(0.00000020),
        dip_price: with_dip.then(|| dec!(49000.00)),
        dip_qty: with_dip.then(|| dec!(0.00020)),
        base_before: dec!(100.00),
        base_after: dec!(90.00),
        btc_before: dec!(0.00100),
        btc_after: dec!(0.00120),
    }
}

// =============================================================================
// Dip arithmetic end to end
// =============================================================================

#[test]
fn test_exchange_info_feeds_dip_target() {
    // Filters parsed off the wire drive the rounding of a real dip order
    let info: ExchangeInfo = serde_json::from_str(
        r#"{"symbols":[{"symbol":"BTCEUR","filters":[
            {"filterType":"PRICE_FILTER","minPrice":"0.01","maxPrice":"1000000.00","tickSize":"0.01"},
            {"filterType":"LOT_SIZE","minQty":"0.00001","maxQty":"9000.0","stepSize":"0.00001"},
            {"filterType":"NOTIONAL","minNotional":"5.00"}
        ]}]}"#,
    )
    .unwrap();
    let filters = SymbolFilters::from_raw(&info.symbols[0].filters).unwrap();

    let target = DipTarget::compute(dec!(50000), dec!(0.02), dec!(10), &filters).unwrap();

    assert_eq!(target.price, dec!(49000.00));
    assert_eq!(target.quantity, dec!(0.00020));
}

#[test]
fn test_floored_values_are_greatest_legal_multiples() {
    let filters = btc_filters();
    let price_now = dec!(51234.5678);
    let dip = dec!(0.035);

    let target = DipTarget::compute(price_now, dip, dec!(25), &filters).unwrap();

    let raw_price = price_now * (Decimal::ONE - dip);
    assert!(target.price <= raw_price);
    assert!(target.price + filters.tick_size > raw_price);
    assert_eq!(target.price % filters.tick_size, Decimal::ZERO);

    let raw_qty = dec!(25) / target.price;
    assert!(target.quantity <= raw_qty);
    assert!(target.quantity + filters.step_size > raw_qty);
    assert_eq!(target.quantity % filters.step_size, Decimal::ZERO);
}

#[test]
fn test_dip_scaling_through_configured_policy() {
    let scale = DipScale::default();

    assert_eq!(scale_dip_percent(dec!(0), &scale), scale.min_dip);
    assert_eq!(scale_dip_percent(dec!(2), &scale), scale.min_dip);
    assert_eq!(
        scale_dip_percent(dec!(5), &scale),
        scale.min_dip + (scale.max_dip - scale.min_dip) / dec!(2)
    );
    assert_eq!(scale_dip_percent(dec!(8), &scale), scale.max_dip);
    assert_eq!(scale_dip_percent(dec!(100), &scale), scale.max_dip);
}

#[test]
fn test_fill_aggregation_matches_logged_row() {
    let fills: Vec<Fill> = serde_json::from_str(
        r#"[
            {"price":"49950.00","qty":"0.00010000","commission":"0.00000010","commissionAsset":"BTC"},
            {"price":"50050.00","qty":"0.00010000","commission":"0.00000010","commissionAsset":"BTC"}
        ]"#,
    )
    .unwrap();

    let summary = FillSummary::from_fills(&fills);
    assert_eq!(summary.quantity, dec!(0.00020));
    assert_eq!(summary.commission, dec!(0.00000020));
    assert_eq!(summary.average_price, Some(dec!(50000)));

    let record = sample_record("simple_dca", summary.quantity, false);
    assert_eq!(record.btc_qty, summary.quantity);
    assert_eq!(record.fee, summary.commission);
}

// =============================================================================
// History log
// =============================================================================

#[test]
fn test_history_file_shape_after_multiple_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");

    append_trade(&path, &sample_record("simple_dca", dec!(0.00020), false)).unwrap();
    append_trade(&path, &sample_record("buy_the_dip", dec!(0.00019), true)).unwrap();
    append_trade(&path, &sample_record("buy_the_dip", dec!(0.00021), true)).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    // one header plus one row per run, columns in fixed order
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], HISTORY_HEADER.join(","));

    let records = load_history(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].action, "simple_dca");
    assert_eq!(records[0].dip_price, None);
    assert_eq!(records[2].dip_price, Some(dec!(49000.00)));

    let totals = HistoryTotals::from_records(&records);
    assert_eq!(totals.total_spent, dec!(30.00));
    assert_eq!(totals.total_qty, dec!(0.00060));
    assert!(totals.average_price().is_some());
}

#[test]
fn test_history_rows_keep_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");

    for i in 1..=5u32 {
        let mut record = sample_record("simple_dca", dec!(0.00001), false);
        record.base_amount = Decimal::from(i);
        append_trade(&path, &record).unwrap();
    }

    let records = load_history(&path).unwrap();
    let amounts: Vec<Decimal> = records.iter().map(|r| r.base_amount).collect();
    assert_eq!(
        amounts,
        vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]
    );
}

// =============================================================================
// Notifier chunking
// =============================================================================

#[test]
fn test_notification_chunk_contract() {
    let chunks = chunk_message(&"a".repeat(9000), CHUNK_LIMIT);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].chars().count(), 4000);
    assert_eq!(chunks[1].chars().count(), 4000);
    assert_eq!(chunks[2].chars().count(), 1000);

    assert_eq!(chunk_message("", CHUNK_LIMIT), vec![String::new()]);
}

// =============================================================================
// Safety checks with default settings
// =============================================================================

#[test]
fn test_default_safety_thresholds() {
    let trading = TradingSettings::for_environment(Environment::Mainnet);

    // baseline 10 with multiplier 2 requires 20 in quote balance
    assert!(safety::check_balance(&trading, dec!(19.99)).is_err());
    assert!(safety::check_balance(&trading, dec!(20.00)).is_ok());

    // baseline 10 sits inside the 50 daily limit
    assert!(safety::check_spend_limit(&trading).is_ok());
}

#[test]
fn test_floor_to_step_shared_by_price_and_quantity() {
    // same primitive floors both dimensions of an order
    assert_eq!(floor_to_step(dec!(49000.009), dec!(0.01)), dec!(49000.00));
    assert_eq!(floor_to_step(dec!(0.000204), dec!(0.00001)), dec!(0.00020));
}
