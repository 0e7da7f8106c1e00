//! Authentication utilities for the Binance API
//!
//! Binance signs private endpoints by appending an HMAC-SHA256 signature of
//! the urlencoded query string (including a `timestamp` parameter) as the
//! `signature` query parameter, hex-encoded.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate the HMAC-SHA256 signature over a query string.
///
/// # Example
///
/// ```
/// use dca_bot::binance::auth::sign_query;
///
/// let secret = "your-api-secret";
/// let query = "symbol=BTCUSDT&timestamp=1234567890";
/// let signature = sign_query(query, secret);
/// ```
pub fn sign_query(query: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a signature against the expected value.
///
/// Useful for testing; comparison is constant-time.
pub fn verify_signature(query: &str, secret: &str, signature: &str) -> bool {
    let computed = sign_query(query, secret);
    constant_time_eq(computed.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Join request parameters into a canonical `k=v&k=v` query string.
///
/// Binance parameter values here are symbols, decimal renderings, and enum
/// words, all of which are urlencoding-neutral, so plain joining matches
/// the urlencoded form the signature must cover.
pub fn build_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// API credentials container
#[derive(Debug, Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Sign a query string with the secret
    pub fn sign(&self, query: &str) -> String {
        sign_query(query, &self.api_secret)
    }
}
