//! Bitcoin DCA bot - main entry point
//!
//! Subcommands:
//! - dca: fixed-amount market buy
//! - dip: baseline market buy plus a volatility-scaled dip limit order
//! - executions: detect recently filled dip orders and notify
//! - orders / cancel: inspect or clear open orders
//! - history: print the CSV trade log with running totals
//! - ping: connectivity and account check

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dca_bot::commands;
use dca_bot::history::DEFAULT_HISTORY_FILE;

#[derive(Parser, Debug)]
#[command(name = "dca-bot")]
#[command(about = "Bitcoin DCA and buy-the-dip orders on Binance", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Force the Binance spot testnet regardless of USE_TESTNET
    #[arg(long, global = true)]
    testnet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a fixed-amount DCA market buy
    Dca {
        /// Spend amount in quote currency (overrides the configured baseline)
        #[arg(short, long)]
        amount: Option<Decimal>,

        /// Trade history CSV file
        #[arg(long, default_value = DEFAULT_HISTORY_FILE)]
        history_file: String,
    },

    /// Execute a baseline buy and place a limit order for the next dip
    Dip {
        /// Spend amount in quote currency (overrides the configured baseline)
        #[arg(short, long)]
        amount: Option<Decimal>,

        /// Trade history CSV file
        #[arg(long, default_value = DEFAULT_HISTORY_FILE)]
        history_file: String,
    },

    /// Check for recently executed orders and notify per fill
    Executions {
        /// Lookback window in minutes
        #[arg(long, default_value = "60")]
        window_mins: i64,
    },

    /// List open orders for the trading pair
    Orders,

    /// Cancel all open orders for the trading pair
    Cancel,

    /// Print the trade history with running totals
    History {
        /// Trade history CSV file
        #[arg(long, default_value = DEFAULT_HISTORY_FILE)]
        history_file: String,
    },

    /// Check exchange connectivity, current price, and quote balance
    Ping,
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(true);

    // File layer - same format but without ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Dca { .. } => "dca",
        Commands::Dip { .. } => "dip",
        Commands::Executions { .. } => "executions",
        Commands::Orders => "orders",
        Commands::Cancel => "cancel",
        Commands::History { .. } => "history",
        Commands::Ping => "ping",
    };

    setup_logging(cli.verbose, command_name)?;

    let testnet = cli.testnet.then_some(true);

    match cli.command {
        Commands::Dca {
            amount,
            history_file,
        } => commands::dca::run(testnet, amount, history_file),

        Commands::Dip {
            amount,
            history_file,
        } => commands::dip::run(testnet, amount, history_file),

        Commands::Executions { window_mins } => commands::executions::run(testnet, window_mins),

        Commands::Orders => commands::orders::run(testnet),

        Commands::Cancel => commands::cancel::run(testnet),

        Commands::History { history_file } => commands::history::run(history_file),

        Commands::Ping => commands::ping::run(testnet),
    }
}
