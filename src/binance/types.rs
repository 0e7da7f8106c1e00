//! Binance Spot API types
//!
//! Serde mappings for the endpoints the strategies use. Binance encodes
//! every decimal as a JSON string; fields use `rust_decimal::serde::str`
//! so monetary values never round-trip through floats.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Time-in-force. Limit orders here are always good-till-cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    #[serde(rename = "GTC")]
    Gtc,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeInForce::Gtc => write!(f, "GTC"),
        }
    }
}

/// One asset's balance inside the account snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub free: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub locked: Decimal,
}

/// Account information (balances only; the rest is ignored)
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub balances: Vec<Balance>,
}

impl AccountInfo {
    /// Free balance of `asset`, zero when the asset is absent
    pub fn free_balance(&self, asset: &str) -> Decimal {
        self.balances
            .iter()
            .find(|b| b.asset == asset)
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Current price for a symbol
#[derive(Debug, Clone, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// 24 hour rolling-window statistics (the fields the dip scaler needs)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_change_percent: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub last_price: Decimal,
}

/// One entry of the per-symbol filter array in `exchangeInfo`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilter {
    pub filter_type: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub tick_size: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub step_size: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_qty: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_notional: Option<Decimal>,
}

/// Per-symbol section of `exchangeInfo`
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub filters: Vec<RawFilter>,
}

/// Top-level `exchangeInfo` response
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

/// Trading constraints for one symbol, extracted from the filter array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolFilters {
    /// Minimum price increment (PRICE_FILTER)
    pub tick_size: Decimal,
    /// Minimum quantity increment (LOT_SIZE)
    pub step_size: Decimal,
    /// Minimum order quantity (LOT_SIZE)
    pub min_qty: Decimal,
    /// Minimum order notional; zero when the exchange reports none
    pub min_notional: Decimal,
}

impl SymbolFilters {
    /// Extract the filters used for order rounding.
    ///
    /// Returns `None` when PRICE_FILTER or LOT_SIZE is missing. A missing
    /// notional filter defaults to zero, mirroring what the exchange
    /// reports for symbols without one.
    pub fn from_raw(filters: &[RawFilter]) -> Option<Self> {
        let price_filter = filters.iter().find(|f| f.filter_type == "PRICE_FILTER")?;
        let lot_size = filters.iter().find(|f| f.filter_type == "LOT_SIZE")?;
        let min_notional = filters
            .iter()
            .find(|f| f.filter_type == "NOTIONAL" || f.filter_type == "MIN_NOTIONAL")
            .and_then(|f| f.min_notional)
            .unwrap_or(Decimal::ZERO);

        Some(SymbolFilters {
            tick_size: price_filter.tick_size?,
            step_size: lot_size.step_size?,
            min_qty: lot_size.min_qty?,
            min_notional,
        })
    }
}

/// One fill record inside a market order response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub commission: Decimal,
    pub commission_asset: String,
}

/// Response to a new-order request (FULL response for market orders)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: u64,
    pub client_order_id: String,
    pub status: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub executed_qty: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub cummulative_quote_qty: Option<Decimal>,
    #[serde(default)]
    pub fills: Vec<Fill>,
}

/// Aggregate view over the fills of one executed order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillSummary {
    /// Total base quantity acquired
    pub quantity: Decimal,
    /// Total quote spent, summed as qty * price per fill
    pub cost: Decimal,
    /// Total commission (in the commission asset, BTC for these buys)
    pub commission: Decimal,
    /// Quote-weighted average price; `None` when nothing filled
    pub average_price: Option<Decimal>,
}

impl FillSummary {
    pub fn from_fills(fills: &[Fill]) -> Self {
        let mut quantity = Decimal::ZERO;
        let mut cost = Decimal::ZERO;
        let mut commission = Decimal::ZERO;

        for fill in fills {
            quantity += fill.qty;
            cost += fill.qty * fill.price;
            commission += fill.commission;
        }

        let average_price = if quantity > Decimal::ZERO {
            Some(cost / quantity)
        } else {
            None
        };

        FillSummary {
            quantity,
            cost,
            commission,
            average_price,
        }
    }
}

/// An open (resting) order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub symbol: String,
    pub order_id: u64,
    pub client_order_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub orig_qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub executed_qty: Decimal,
    pub status: String,
    pub time_in_force: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
}

/// One executed trade from account trade history
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTrade {
    pub symbol: String,
    pub id: u64,
    pub order_id: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub commission: Decimal,
    pub commission_asset: String,
    /// Execution time, milliseconds since epoch
    pub time: i64,
    pub is_buyer: bool,
}

impl AccountTrade {
    pub fn executed_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.time)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Total quote value of the trade
    pub fn notional(&self) -> Decimal {
        self.qty * self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_free_balance_lookup() {
        let account: AccountInfo = serde_json::from_str(
            r#"{"balances":[
                {"asset":"BTC","free":"0.50000000","locked":"0.00000000"},
                {"asset":"EUR","free":"123.45","locked":"10.00"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(account.free_balance("BTC"), dec!(0.50000000));
        assert_eq!(account.free_balance("EUR"), dec!(123.45));
        assert_eq!(account.free_balance("DOGE"), Decimal::ZERO);
    }

    #[test]
    fn test_ticker_price_parsing() {
        let ticker: TickerPrice =
            serde_json::from_str(r#"{"symbol":"BTCEUR","price":"50123.45000000"}"#).unwrap();

        assert_eq!(ticker.symbol, "BTCEUR");
        assert_eq!(ticker.price, dec!(50123.45));
    }

    #[test]
    fn test_ticker_24h_parsing() {
        let ticker: Ticker24h = serde_json::from_str(
            r#"{"symbol":"BTCEUR","priceChangePercent":"-3.214","lastPrice":"48000.00"}"#,
        )
        .unwrap();

        assert_eq!(ticker.price_change_percent, dec!(-3.214));
        assert_eq!(ticker.last_price, dec!(48000.00));
    }

    #[test]
    fn test_symbol_filters_from_exchange_info() {
        let info: ExchangeInfo = serde_json::from_str(
            r#"{"symbols":[{"symbol":"BTCEUR","filters":[
                {"filterType":"PRICE_FILTER","minPrice":"0.01","maxPrice":"1000000.00","tickSize":"0.01"},
                {"filterType":"LOT_SIZE","minQty":"0.00001","maxQty":"9000.0","stepSize":"0.00001"},
                {"filterType":"NOTIONAL","minNotional":"5.00"}
            ]}]}"#,
        )
        .unwrap();

        let filters = SymbolFilters::from_raw(&info.symbols[0].filters).unwrap();
        assert_eq!(filters.tick_size, dec!(0.01));
        assert_eq!(filters.step_size, dec!(0.00001));
        assert_eq!(filters.min_qty, dec!(0.00001));
        assert_eq!(filters.min_notional, dec!(5.00));
    }

    #[test]
    fn test_symbol_filters_missing_notional_defaults_to_zero() {
        let raw: Vec<RawFilter> = serde_json::from_str(
            r#"[
                {"filterType":"PRICE_FILTER","tickSize":"0.01"},
                {"filterType":"LOT_SIZE","minQty":"0.00001","stepSize":"0.00001"}
            ]"#,
        )
        .unwrap();

        let filters = SymbolFilters::from_raw(&raw).unwrap();
        assert_eq!(filters.min_notional, Decimal::ZERO);
    }

    #[test]
    fn test_symbol_filters_missing_lot_size() {
        let raw: Vec<RawFilter> =
            serde_json::from_str(r#"[{"filterType":"PRICE_FILTER","tickSize":"0.01"}]"#).unwrap();

        assert!(SymbolFilters::from_raw(&raw).is_none());
    }

    #[test]
    fn test_order_response_with_fills() {
        let order: OrderResponse = serde_json::from_str(
            r#"{"symbol":"BTCEUR","orderId":42,"clientOrderId":"abc","status":"FILLED",
                "executedQty":"0.00020000","cummulativeQuoteQty":"9.99",
                "fills":[
                    {"price":"49950.00","qty":"0.00010000","commission":"0.00000010","commissionAsset":"BTC"},
                    {"price":"50050.00","qty":"0.00010000","commission":"0.00000010","commissionAsset":"BTC"}
                ]}"#,
        )
        .unwrap();

        assert_eq!(order.order_id, 42);
        assert_eq!(order.fills.len(), 2);

        let summary = FillSummary::from_fills(&order.fills);
        assert_eq!(summary.quantity, dec!(0.00020000));
        assert_eq!(summary.cost, dec!(10.000000));
        assert_eq!(summary.commission, dec!(0.00000020));
        assert_eq!(summary.average_price, Some(dec!(50000)));
    }

    #[test]
    fn test_order_response_without_fills() {
        // Limit order acks carry no fills
        let order: OrderResponse = serde_json::from_str(
            r#"{"symbol":"BTCEUR","orderId":43,"clientOrderId":"def","status":"NEW"}"#,
        )
        .unwrap();

        assert!(order.fills.is_empty());
        let summary = FillSummary::from_fills(&order.fills);
        assert_eq!(summary.quantity, Decimal::ZERO);
        assert_eq!(summary.average_price, None);
    }

    #[test]
    fn test_account_trade_parsing() {
        let trade: AccountTrade = serde_json::from_str(
            r#"{"symbol":"BTCEUR","id":7,"orderId":42,"price":"49000.00","qty":"0.00020000",
                "commission":"0.00000020","commissionAsset":"BTC","time":1700000000000,
                "isBuyer":true,"isMaker":true}"#,
        )
        .unwrap();

        assert!(trade.is_buyer);
        assert_eq!(trade.notional(), dec!(9.80));
        assert_eq!(trade.executed_at().timestamp_millis(), 1700000000000);
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(OrderSide::Buy.to_string(), "BUY");
        assert_eq!(OrderType::Market.to_string(), "MARKET");
        assert_eq!(OrderType::Limit.to_string(), "LIMIT");
        assert_eq!(TimeInForce::Gtc.to_string(), "GTC");
    }
}
