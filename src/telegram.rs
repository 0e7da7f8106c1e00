//! Telegram notifier
//!
//! Best-effort delivery of a plain-text run summary. The notifier never
//! propagates an error past its own boundary: every outcome, including
//! missing credentials, is reported as an explicit [`Delivery`] value and
//! callers decide whether to surface it. A failed notification never
//! affects the financial operation already performed.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TelegramSettings;

/// Telegram Bot API base URL
pub const API_BASE: &str = "https://api.telegram.org";

/// Maximum characters per sendMessage call; longer texts are chunked
pub const CHUNK_LIMIT: usize = 4000;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one notification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Every chunk was accepted by the bot API
    Sent,
    /// Token or chat id is empty; no network call was made
    MissingCredentials,
    /// At least one chunk was rejected or the request failed
    Failed { reason: String },
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

impl std::fmt::Display for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delivery::Sent => write!(f, "sent"),
            Delivery::MissingCredentials => write!(f, "skipped (credentials not configured)"),
            Delivery::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Split a message into chunks of at most `limit` characters.
///
/// An empty message yields one empty chunk, so a summary is always sent
/// as at least one call. Splits on character boundaries, never inside a
/// multi-byte sequence.
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    chunks.push(current);

    chunks
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram bot notifier
#[derive(Debug, Clone)]
pub struct Notifier {
    bot_token: String,
    chat_id: String,
    api_base: String,
    http_client: Client,
}

impl Notifier {
    pub fn new(settings: &TelegramSettings) -> Self {
        Self::with_api_base(settings, API_BASE)
    }

    pub fn with_api_base(settings: &TelegramSettings, api_base: &str) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            bot_token: settings.bot_token.trim().to_string(),
            chat_id: settings.chat_id.trim().to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Send `message`, chunked at [`CHUNK_LIMIT`] characters.
    ///
    /// Every chunk is attempted even after one fails, so a long summary
    /// loses at most the rejected chunks. Overall success requires every
    /// chunk to be accepted; the reported reason is the first failure.
    /// Empty credentials short-circuit without a network call.
    pub async fn send(&self, message: &str) -> Delivery {
        if self.bot_token.is_empty() || self.chat_id.is_empty() {
            debug!("Telegram credentials not configured, skipping notification");
            return Delivery::MissingCredentials;
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let mut first_failure: Option<String> = None;

        for chunk in chunk_message(message, CHUNK_LIMIT) {
            if let Err(reason) = self.send_chunk(&url, &chunk).await {
                if first_failure.is_none() {
                    first_failure = Some(reason);
                }
            }
        }

        match first_failure {
            Some(reason) => Delivery::Failed { reason },
            None => Delivery::Sent,
        }
    }

    async fn send_chunk(&self, url: &str, chunk: &str) -> Result<(), String> {
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", chunk),
            ("disable_web_page_preview", "true"),
        ];

        let response = match self.http_client.post(url).form(&params).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Telegram request failed: {}", e);
                return Err(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Telegram API error ({}): {}", status, body);
            return Err(format!("HTTP {}: {}", status, body));
        }

        match response.json::<SendMessageResponse>().await {
            Ok(parsed) if parsed.ok => Ok(()),
            Ok(parsed) => {
                let reason = parsed
                    .description
                    .unwrap_or_else(|| "bot API reported ok=false".to_string());
                warn!("Telegram rejected message: {}", reason);
                Err(reason)
            }
            Err(e) => {
                warn!("Telegram response unreadable: {}", e);
                Err(e.to_string())
            }
        }
    }
}
