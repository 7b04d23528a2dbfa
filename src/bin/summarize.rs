use std::{
    error::Error,
    fs,
    io::{self, Read},
};

use clap::Parser;
use serde_json::{Value, json};

use finboard::{ChartData, ReportingWindow, Summary, format_summary, local_today, parse_transaction_list};

/// Summarise a transaction list stored as JSON.
///
/// The input is either an array of transaction records or an object with a
/// `transactions` array, as returned by the transaction listing endpoint.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON document. Reads from stdin if omitted.
    input: Option<String>,

    /// Only summarise transactions in this reporting window: 7d, 30d, 365d or all.
    #[arg(long, default_value = "all")]
    freq: ReportingWindow,

    /// The canonical name of the local timezone used to find today's date.
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Include the chart datasets in the output.
    #[arg(long)]
    charts: bool,

    /// Print a human readable report instead of JSON.
    #[arg(long)]
    text: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let document = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let document: Value = serde_json::from_str(&document)?;

    let mut parsed = parse_transaction_list(&document);
    if parsed.rejected > 0 {
        eprintln!("Skipped {} invalid transaction records.", parsed.rejected);
    }

    let record_count = (parsed.transactions.len() + parsed.rejected) as u64;
    if let Some(reported_total) = parsed.reported_total
        && reported_total != record_count
    {
        eprintln!(
            "The document reports {reported_total} transactions but contains {record_count}, \
             only the records present are summarised."
        );
    }

    let today = local_today(&args.timezone)?;
    parsed
        .transactions
        .retain(|transaction| args.freq.contains(transaction.date, today));

    let summary = Summary::from_transactions(&parsed.transactions);

    if args.text {
        print!("{}", format_summary(&summary));
        return Ok(());
    }

    let output = if args.charts {
        json!({
            "summary": summary,
            "charts": ChartData::from_transactions(&parsed.transactions),
        })
    } else {
        serde_json::to_value(&summary)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
