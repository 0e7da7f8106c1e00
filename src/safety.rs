//! Pre-trade safety checks
//!
//! Deliberate aborts that run before any order is placed on the real-money
//! configuration. Testnet runs skip these; the command layer decides when
//! to apply them.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::TradingSettings;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SafetyError {
    #[error("Insufficient {asset} balance: {available} available, need at least {required}")]
    InsufficientBalance {
        asset: String,
        available: Decimal,
        required: Decimal,
    },

    #[error("Spend amount {amount} exceeds daily limit {limit}")]
    SpendLimitExceeded { amount: Decimal, limit: Decimal },
}

/// Require the free quote balance to cover the spend times the configured
/// safety multiplier.
pub fn check_balance(trading: &TradingSettings, available: Decimal) -> Result<(), SafetyError> {
    let required = trading.baseline_amount * trading.safety_multiplier;
    if available < required {
        return Err(SafetyError::InsufficientBalance {
            asset: trading.quote_asset.clone(),
            available,
            required,
        });
    }
    Ok(())
}

/// Require the spend amount to stay within the daily limit.
pub fn check_spend_limit(trading: &TradingSettings) -> Result<(), SafetyError> {
    if trading.baseline_amount > trading.max_daily_spend {
        return Err(SafetyError::SpendLimitExceeded {
            amount: trading.baseline_amount,
            limit: trading.max_daily_spend,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trading() -> TradingSettings {
        TradingSettings {
            symbol: "BTCEUR".to_string(),
            quote_asset: "EUR".to_string(),
            target_asset: "BTC".to_string(),
            baseline_amount: dec!(10.00),
            max_daily_spend: dec!(50.00),
            safety_multiplier: dec!(2),
            dip_scale: Default::default(),
        }
    }

    #[test]
    fn test_balance_at_threshold_passes() {
        assert!(check_balance(&trading(), dec!(20.00)).is_ok());
        assert!(check_balance(&trading(), dec!(100.00)).is_ok());
    }

    #[test]
    fn test_balance_below_threshold_fails() {
        let err = check_balance(&trading(), dec!(19.99)).unwrap_err();
        assert_eq!(
            err,
            SafetyError::InsufficientBalance {
                asset: "EUR".to_string(),
                available: dec!(19.99),
                required: dec!(20.00),
            }
        );
    }

    #[test]
    fn test_safety_multiplier_is_configurable() {
        let mut trading = trading();
        trading.safety_multiplier = dec!(3);

        assert!(check_balance(&trading, dec!(29.99)).is_err());
        assert!(check_balance(&trading, dec!(30.00)).is_ok());
    }

    #[test]
    fn test_spend_within_limit_passes() {
        assert!(check_spend_limit(&trading()).is_ok());
    }

    #[test]
    fn test_spend_over_limit_fails() {
        let mut trading = trading();
        trading.baseline_amount = dec!(50.01);

        let err = check_spend_limit(&trading).unwrap_err();
        assert!(matches!(err, SafetyError::SpendLimitExceeded { .. }));
        assert!(err.to_string().contains("exceeds daily limit"));
    }
}
