//! Dip-target arithmetic
//!
//! Pure decimal maths for the buy-the-dip strategy: flooring prices and
//! quantities to exchange granularity and scaling the dip percentage with
//! 24h volatility.

use anyhow::{bail, Result};
use rust_decimal::Decimal;

use crate::binance::types::SymbolFilters;
use crate::config::DipScale;

/// Round `value` down to the nearest multiple of `step`.
///
/// The result is the greatest multiple of `step` not exceeding `value`.
/// A non-positive step returns the value unchanged.
pub fn floor_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    (value / step).floor() * step
}

/// A legally placeable limit order below the current price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DipTarget {
    /// Limit price, floored to the symbol's tick size
    pub price: Decimal,
    /// Order quantity, floored to the symbol's step size
    pub quantity: Decimal,
}

impl DipTarget {
    /// Compute the dip limit order for `spend` quote units.
    ///
    /// Price is `price_now * (1 - dip_fraction)` floored to the tick size;
    /// quantity is `spend / price` floored to the step size. Minimum
    /// quantity and notional are not pre-validated; an order below them is
    /// rejected by the exchange at submission. A target price that floors
    /// to zero (dip at or past 100%, or a price below one tick) is an
    /// error, as no limit order can be placed at it.
    pub fn compute(
        price_now: Decimal,
        dip_fraction: Decimal,
        spend: Decimal,
        filters: &SymbolFilters,
    ) -> Result<Self> {
        let price = floor_to_step(price_now * (Decimal::ONE - dip_fraction), filters.tick_size);
        if price <= Decimal::ZERO {
            bail!(
                "Dip price {} is not placeable (current price {}, dip fraction {})",
                price,
                price_now,
                dip_fraction
            );
        }
        let quantity = floor_to_step(spend / price, filters.step_size);
        Ok(DipTarget { price, quantity })
    }
}

/// Map 24h price-change magnitude to a dip percentage.
///
/// Saturates at `scale.min_dip` below the low knot and `scale.max_dip`
/// above the high knot, linear in between. The caller is responsible for
/// falling back to `scale.min_dip` when the 24h ticker cannot be fetched.
pub fn scale_dip_percent(change_pct: Decimal, scale: &DipScale) -> Decimal {
    let change = change_pct.abs();

    if change <= scale.low_change {
        scale.min_dip
    } else if change >= scale.high_change {
        scale.max_dip
    } else {
        let ratio = (change - scale.low_change) / (scale.high_change - scale.low_change);
        scale.min_dip + ratio * (scale.max_dip - scale.min_dip)
    }
}
