//! Binance Spot REST API client
//!
//! Covers the handful of endpoints the strategies need: account balances,
//! exchange filters, ticker price / 24h statistics, order placement and
//! cancellation, open orders, and trade history.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::Credentials;
pub use client::SpotClient;
