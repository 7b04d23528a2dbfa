//! Plain text rendering of summaries for the command line.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

use crate::summary::{CategoryShare, Summary};

/// Format `number` as a dollar amount with two decimal places, e.g. "$1,234.50".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| currency_formatter("$"));
    let negative_fmt = NEGATIVE_FMT.get_or_init(|| currency_formatter("-$"));

    let formatted = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // numfmt renders zero as "0"
        return "$0.00".to_owned();
    };

    pad_decimals(formatted)
}

fn currency_formatter(prefix: &str) -> Formatter {
    Formatter::currency(prefix)
        .unwrap_or_default()
        .precision(Precision::Decimals(2))
}

/// numfmt drops trailing zeros, so "12.30" comes out as "12.3" and "12.00" as "12".
fn pad_decimals(mut formatted: String) -> String {
    match formatted.rfind('.') {
        None => formatted.push_str(".00"),
        Some(point) => {
            for _ in formatted.len() - point - 1..2 {
                formatted.push('0');
            }
        }
    }

    formatted
}

/// Render `summary` as a human readable report.
pub fn format_summary(summary: &Summary) -> String {
    let totals = &summary.totals;
    let ratios = &summary.ratios;

    let mut report = format!(
        "Transactions: {} ({} income, {} expense)\n\
         Income:   {:>14} ({}% of transactions, {}% of amount)\n\
         Expenses: {:>14} ({}% of transactions, {}% of amount)\n\
         Total:    {:>14}\n",
        totals.total_count,
        totals.income_count,
        totals.expense_count,
        format_currency(totals.income_amount),
        ratios.income_count_share,
        ratios.income_amount_share,
        format_currency(totals.expense_amount),
        ratios.expense_count_share,
        ratios.expense_amount_share,
        format_currency(totals.total_amount),
    );

    report.push_str(&format_categories("Income by category", &summary.income_categories));
    report.push_str(&format_categories("Expenses by category", &summary.expense_categories));

    report
}

fn format_categories(title: &str, categories: &[CategoryShare]) -> String {
    if categories.is_empty() {
        return format!("\n{title}:\n  (none)\n");
    }

    let rows: String = categories
        .iter()
        .map(|share| {
            format!(
                "  {:<20} {:>14} {:>4}%\n",
                share.category,
                format_currency(share.amount),
                share.percentage
            )
        })
        .collect();

    format!("\n{title}:\n{rows}")
}
