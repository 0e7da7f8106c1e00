//! Bitcoin DCA / buy-the-dip bot
//!
//! Places spot-market orders on Binance using dollar-cost-averaging and
//! buy-the-dip heuristics, logs executed trades to a CSV history file, and
//! pushes best-effort summaries to a Telegram bot. Every run is a linear,
//! one-shot sequence with no retries and no state beyond the history file.
//!
//! # Example (dip maths)
//! ```
//! use dca_bot::binance::types::SymbolFilters;
//! use dca_bot::dip::DipTarget;
//! use rust_decimal_macros::dec;
//!
//! let filters = SymbolFilters {
//!     tick_size: dec!(0.01),
//!     step_size: dec!(0.00001),
//!     min_qty: dec!(0.00001),
//!     min_notional: dec!(5),
//! };
//! let target = DipTarget::compute(dec!(50000), dec!(0.02), dec!(10), &filters).unwrap();
//! assert_eq!(target.price, dec!(49000.00));
//! assert_eq!(target.quantity, dec!(0.00020));
//! ```

pub mod binance;
pub mod commands;
pub mod config;
pub mod dip;
pub mod history;
pub mod safety;
pub mod telegram;

pub use binance::SpotClient;
pub use config::Settings;
pub use history::TradeRecord;
pub use telegram::{Delivery, Notifier};
