//! CLI subcommand implementations
//!
//! One module per subcommand. Each run is strictly sequential: load
//! settings, call the exchange, print a summary, log, notify.

pub mod cancel;
pub mod dca;
pub mod dip;
pub mod executions;
pub mod history;
pub mod orders;
pub mod ping;

use rust_decimal::Decimal;

/// Format a balance delta with an explicit sign
pub(crate) fn signed(value: Decimal) -> String {
    if value.is_sign_negative() {
        value.to_string()
    } else {
        format!("+{}", value)
    }
}

/// Banner line used by every command's console output
pub(crate) fn banner(title: &str) -> String {
    format!("========== {} ==========", title)
}
