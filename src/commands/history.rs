//! History command - print logged trades with running totals

use anyhow::Result;
use std::path::Path;

use crate::commands::banner;
use crate::history::{load_history, HistoryTotals};

pub fn run(history_file: String) -> Result<()> {
    let path = Path::new(&history_file);

    if !path.exists() {
        println!(
            "No {} found. Run the dca or dip command at least once first.",
            history_file
        );
        return Ok(());
    }

    println!("{}", banner("TRADE HISTORY"));

    let records = load_history(path)?;

    if records.is_empty() {
        println!("No trades recorded yet.");
    } else {
        for record in &records {
            println!("-----------------------------------");
            println!("Datetime   : {}", record.datetime_utc.to_rfc3339());
            println!("Action     : {}", record.action);
            println!("Symbol     : {}", record.symbol);
            println!(
                "Base Amt   : {} {}",
                record.base_amount, record.base_currency
            );
            println!(
                "BTC Bought : {} (avg price {})",
                record.btc_qty,
                record
                    .avg_price
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("Fee        : {}", record.fee);
            match (record.dip_qty, record.dip_price) {
                (Some(qty), Some(price)) => println!("Dip Order  : {} BTC @ {}", qty, price),
                _ => println!("Dip Order  : none"),
            }
            println!(
                "{} Bal    : {} -> {}",
                record.base_currency, record.base_before, record.base_after
            );
            println!(
                "BTC Bal    : {} -> {}",
                record.btc_before, record.btc_after
            );
        }
    }

    let totals = HistoryTotals::from_records(&records);

    println!("===================================");
    println!("{}", banner("TOTAL SUMMARY"));
    println!("Total invested      : {}", totals.total_spent);
    println!("Total BTC bought    : {}", totals.total_qty);
    println!("Total fees (BTC)    : {}", totals.total_fees);
    if let Some(avg) = totals.average_price() {
        println!("Average buy price   : {}", avg.round_dp(2));
    }
    println!("===================================");

    Ok(())
}
