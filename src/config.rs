//! Configuration management
//!
//! Builds one immutable [`Settings`] value at process start from `.env` /
//! environment variables. All environment branching (testnet vs mainnet)
//! happens here; call sites read typed fields.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Binance mainnet REST base URL
pub const MAINNET_BASE_URL: &str = "https://api.binance.com";

/// Binance spot testnet REST base URL
pub const TESTNET_BASE_URL: &str = "https://testnet.binance.vision";

/// Which Binance deployment the process talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Mainnet,
    Testnet,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Mainnet => MAINNET_BASE_URL,
            Environment::Testnet => TESTNET_BASE_URL,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Environment::Testnet)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Mainnet => write!(f, "MAINNET"),
            Environment::Testnet => write!(f, "TESTNET"),
        }
    }
}

/// Telegram bot credentials. Either field empty means notifications are
/// disabled; the notifier reports that instead of calling out.
#[derive(Debug, Clone, Default)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

/// Knots of the volatility-to-dip linear interpolation.
///
/// 24h change magnitude at or below `low_change` maps to `min_dip`, at or
/// above `high_change` maps to `max_dip`, linear in between. The knot values
/// are configuration rather than constants baked into the formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DipScale {
    pub min_dip: Decimal,
    pub max_dip: Decimal,
    pub low_change: Decimal,
    pub high_change: Decimal,
}

impl Default for DipScale {
    fn default() -> Self {
        DipScale {
            min_dip: dec!(0.02),
            max_dip: dec!(0.08),
            low_change: dec!(2),
            high_change: dec!(8),
        }
    }
}

/// Trading parameters, typed per environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSettings {
    /// Trading pair, e.g. "BTCEUR" (mainnet) or "BTCUSDT" (testnet)
    pub symbol: String,
    /// Quote asset spent on buys, e.g. "EUR" or "USDT"
    pub quote_asset: String,
    /// Asset being accumulated
    pub target_asset: String,
    /// Baseline buy amount in quote currency
    pub baseline_amount: Decimal,
    /// Hard cap on a single run's spend (real money only)
    pub max_daily_spend: Decimal,
    /// Abort unless quote balance >= baseline * this multiplier (real money only)
    pub safety_multiplier: Decimal,
    pub dip_scale: DipScale,
}

impl TradingSettings {
    pub fn for_environment(environment: Environment) -> Self {
        let (symbol, quote_asset) = match environment {
            Environment::Mainnet => ("BTCEUR", "EUR"),
            Environment::Testnet => ("BTCUSDT", "USDT"),
        };

        TradingSettings {
            symbol: symbol.to_string(),
            quote_asset: quote_asset.to_string(),
            target_asset: "BTC".to_string(),
            baseline_amount: dec!(10.00),
            max_daily_spend: dec!(50.00),
            safety_multiplier: dec!(2),
            dip_scale: DipScale::default(),
        }
    }
}

/// Immutable process configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub api_key: String,
    pub api_secret: String,
    pub telegram: TelegramSettings,
    pub trading: TradingSettings,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// `testnet_override` (from the CLI) wins over `USE_TESTNET`. Missing
    /// credentials load as empty strings; they surface later as an
    /// authentication fault from the exchange, matching the late-detection
    /// policy for configuration errors.
    pub fn load(testnet_override: Option<bool>) -> Self {
        dotenv::dotenv().ok();

        let use_testnet = testnet_override.unwrap_or_else(|| {
            std::env::var("USE_TESTNET")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false)
        });

        let environment = if use_testnet {
            Environment::Testnet
        } else {
            Environment::Mainnet
        };

        let (api_key, api_secret) = match environment {
            Environment::Testnet => (
                env_or_empty("BINANCE_API_KEY_TEST"),
                env_or_empty("BINANCE_API_SECRET_TEST"),
            ),
            Environment::Mainnet => (
                env_or_empty("BINANCE_API_KEY"),
                env_or_empty("BINANCE_API_SECRET"),
            ),
        };

        let telegram = TelegramSettings {
            bot_token: env_or_empty("TELEGRAM_BOT_TOKEN"),
            chat_id: env_or_empty("TELEGRAM_CHAT_ID"),
        };

        Settings {
            environment,
            api_key,
            api_secret,
            telegram,
            trading: TradingSettings::for_environment(environment),
        }
    }

    /// Override the baseline buy amount (CLI `--amount`)
    pub fn with_baseline_amount(mut self, amount: Decimal) -> Self {
        self.trading.baseline_amount = amount;
        self
    }
}

fn env_or_empty(key: &str) -> String {
    std::env::var(key).unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_base_urls() {
        assert_eq!(Environment::Mainnet.base_url(), "https://api.binance.com");
        assert_eq!(
            Environment::Testnet.base_url(),
            "https://testnet.binance.vision"
        );
    }

    #[test]
    fn test_trading_settings_per_environment() {
        let mainnet = TradingSettings::for_environment(Environment::Mainnet);
        assert_eq!(mainnet.symbol, "BTCEUR");
        assert_eq!(mainnet.quote_asset, "EUR");

        let testnet = TradingSettings::for_environment(Environment::Testnet);
        assert_eq!(testnet.symbol, "BTCUSDT");
        assert_eq!(testnet.quote_asset, "USDT");

        assert_eq!(mainnet.target_asset, "BTC");
        assert_eq!(mainnet.baseline_amount, dec!(10.00));
    }

    #[test]
    fn test_dip_scale_defaults() {
        let scale = DipScale::default();
        assert_eq!(scale.min_dip, dec!(0.02));
        assert_eq!(scale.max_dip, dec!(0.08));
        assert_eq!(scale.low_change, dec!(2));
        assert_eq!(scale.high_change, dec!(8));
    }

    #[test]
    fn test_with_baseline_amount() {
        let settings = Settings {
            environment: Environment::Testnet,
            api_key: String::new(),
            api_secret: String::new(),
            telegram: TelegramSettings::default(),
            trading: TradingSettings::for_environment(Environment::Testnet),
        }
        .with_baseline_amount(dec!(25.50));

        assert_eq!(settings.trading.baseline_amount, dec!(25.50));
    }
}
