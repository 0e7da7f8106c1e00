//! Binance Spot API client
//!
//! One-shot request semantics throughout: every call is a single blocking
//! HTTP round trip with a fixed timeout, and a transient fault propagates
//! to the caller. Strategy runs are short-lived, so there is no retry
//! layer, rate limiter, or connection state to manage.
//!
//! # Example
//!
//! ```no_run
//! use dca_bot::binance::SpotClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SpotClient::new("api_key", "api_secret", "https://api.binance.com");
//!     let ticker = client.ticker_price("BTCEUR").await?;
//!     println!("BTC/EUR price: {}", ticker.price);
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

use super::auth::{build_query, Credentials};
use super::types::{
    AccountInfo, AccountTrade, ExchangeInfo, OpenOrder, OrderResponse, OrderSide, OrderType,
    SymbolFilters, Ticker24h, TickerPrice, TimeInForce,
};
use crate::config::Settings;

/// Request timeout for every exchange call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Binance Spot exchange client
#[derive(Debug, Clone)]
pub struct SpotClient {
    credentials: Credentials,
    http_client: Client,
    base_url: String,
}

impl SpotClient {
    /// Create a new client against the given REST base URL
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            credentials: Credentials::new(api_key, api_secret),
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Create a client for the environment selected in `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.api_key.clone(),
            settings.api_secret.clone(),
            settings.environment.base_url(),
        )
    }

    /// Make an unauthenticated GET request
    async fn public_get<R>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} params={:?}", endpoint, params);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let text = response.text().await.context("Failed to read response")?;

        if !status.is_success() {
            return Err(anyhow!("Binance API error ({}): {}", status, text));
        }

        serde_json::from_str(&text).context("Failed to parse response")
    }

    /// Make a signed request. Appends `timestamp` and the HMAC `signature`
    /// to the query string and sets the API-key header.
    async fn signed_request<R>(
        &self,
        method: Method,
        endpoint: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        params.push(("timestamp", Utc::now().timestamp_millis().to_string()));

        let query = build_query(&params);
        let signature = self.credentials.sign(&query);
        let url = format!(
            "{}{}?{}&signature={}",
            self.base_url, endpoint, query, signature
        );
        debug!("{} {} (signed)", method, endpoint);

        let response = self
            .http_client
            .request(method, &url)
            .header("X-MBX-APIKEY", self.credentials.api_key())
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let text = response.text().await.context("Failed to read response")?;

        if !status.is_success() {
            return Err(anyhow!("Binance API error ({}): {}", status, text));
        }

        serde_json::from_str(&text).context("Failed to parse response")
    }

    // ==================== PUBLIC ENDPOINTS ====================

    /// Check server connectivity
    pub async fn ping(&self) -> Result<bool> {
        let url = format!("{}/api/v3/ping", self.base_url);
        let response = self.http_client.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// Current price for a symbol
    pub async fn ticker_price(&self, symbol: &str) -> Result<TickerPrice> {
        self.public_get("/api/v3/ticker/price", &[("symbol", symbol.to_string())])
            .await
    }

    /// 24 hour rolling-window statistics for a symbol
    pub async fn ticker_24hr(&self, symbol: &str) -> Result<Ticker24h> {
        self.public_get("/api/v3/ticker/24hr", &[("symbol", symbol.to_string())])
            .await
    }

    /// Trading filters (tick size, step size, minimums) for a symbol
    pub async fn symbol_filters(&self, symbol: &str) -> Result<SymbolFilters> {
        let info: ExchangeInfo = self
            .public_get("/api/v3/exchangeInfo", &[("symbol", symbol.to_string())])
            .await?;

        let symbol_info = info
            .symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| anyhow!("Symbol {} not found in exchange info", symbol))?;

        SymbolFilters::from_raw(&symbol_info.filters)
            .ok_or_else(|| anyhow!("Incomplete trading filters for {}", symbol))
    }

    // ==================== AUTHENTICATED ENDPOINTS ====================

    /// Account snapshot with per-asset balances
    pub async fn account(&self) -> Result<AccountInfo> {
        self.signed_request(Method::GET, "/api/v3/account", Vec::new())
            .await
    }

    /// Free balance of one asset, zero when absent
    pub async fn free_balance(&self, asset: &str) -> Result<Decimal> {
        let account = self.account().await?;
        Ok(account.free_balance(asset))
    }

    /// Market buy spending `quote_amount` of the quote currency
    pub async fn market_buy_quote(
        &self,
        symbol: &str,
        quote_amount: Decimal,
    ) -> Result<OrderResponse> {
        let params = vec![
            ("symbol", symbol.to_string()),
            ("side", OrderSide::Buy.to_string()),
            ("type", OrderType::Market.to_string()),
            ("quoteOrderQty", quote_amount.to_string()),
        ];

        self.signed_request(Method::POST, "/api/v3/order", params)
            .await
    }

    /// Limit buy at `price` for `quantity`, good till cancelled
    pub async fn limit_buy_gtc(
        &self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<OrderResponse> {
        let params = vec![
            ("symbol", symbol.to_string()),
            ("side", OrderSide::Buy.to_string()),
            ("type", OrderType::Limit.to_string()),
            ("timeInForce", TimeInForce::Gtc.to_string()),
            ("price", price.to_string()),
            ("quantity", quantity.to_string()),
        ];

        self.signed_request(Method::POST, "/api/v3/order", params)
            .await
    }

    /// Cancel one order by exchange-assigned id
    pub async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<()> {
        let params = vec![
            ("symbol", symbol.to_string()),
            ("orderId", order_id.to_string()),
        ];

        let _: serde_json::Value = self
            .signed_request(Method::DELETE, "/api/v3/order", params)
            .await?;
        Ok(())
    }

    /// List open orders for a symbol
    pub async fn open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        self.signed_request(
            Method::GET,
            "/api/v3/openOrders",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    /// Recent account trades for a symbol, newest last
    pub async fn my_trades(&self, symbol: &str, limit: u32) -> Result<Vec<AccountTrade>> {
        self.signed_request(
            Method::GET,
            "/api/v3/myTrades",
            vec![
                ("symbol", symbol.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SpotClient::new("test_key", "test_secret", "https://testnet.binance.vision");
        assert_eq!(client.base_url, "https://testnet.binance.vision");
        assert_eq!(client.credentials.api_key(), "test_key");
    }

    #[test]
    fn test_from_settings_selects_environment_url() {
        let mut settings = Settings::load(Some(true));
        settings.api_key = "k".to_string();
        settings.api_secret = "s".to_string();

        let client = SpotClient::from_settings(&settings);
        assert_eq!(client.base_url, "https://testnet.binance.vision");
    }
}
