//! Summaries of a list of transactions for dashboards.
//!
//! The [Summary] drives the dashboard cards and progress indicators, the
//! [ChartData] drives the charts. Both are recomputed from scratch for every
//! request.

mod aggregation;
mod handlers;

use serde::{Deserialize, Serialize};

pub use aggregation::{
    CategoryComparison, CategoryShare, KindAmount, Totals, compute_category_breakdown,
    compute_category_comparison, compute_kind_split, compute_ratio, compute_totals,
};
pub use handlers::{get_charts_endpoint, get_summary_endpoint};

use crate::transaction::{Kind, Transaction};

/// The percentages shown on the dashboard's progress indicators.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    /// Income transactions as a percentage of all transactions.
    pub income_count_share: u32,
    /// Expense transactions as a percentage of all transactions.
    pub expense_count_share: u32,
    /// Income amount as a percentage of the total amount.
    pub income_amount_share: u32,
    /// Expense amount as a percentage of the total amount.
    pub expense_amount_share: u32,
}

impl Ratios {
    fn from_totals(totals: &Totals) -> Self {
        let total_count = totals.total_count as f64;

        Self {
            income_count_share: compute_ratio(totals.income_count as f64, total_count),
            expense_count_share: compute_ratio(totals.expense_count as f64, total_count),
            income_amount_share: compute_ratio(totals.income_amount, totals.total_amount),
            expense_amount_share: compute_ratio(totals.expense_amount, totals.total_amount),
        }
    }
}

/// Counts, totals, ratios and category breakdowns for a list of transactions.
///
/// [Summary::default] is the zero-state summary shown when there is no data.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Counts and amounts per kind.
    #[serde(flatten)]
    pub totals: Totals,
    /// The progress indicator percentages.
    pub ratios: Ratios,
    /// Income by category, largest first.
    pub income_categories: Vec<CategoryShare>,
    /// Expenses by category, largest first.
    pub expense_categories: Vec<CategoryShare>,
}

impl Summary {
    /// Summarise `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let totals = compute_totals(transactions);

        Self {
            ratios: Ratios::from_totals(&totals),
            totals,
            income_categories: compute_category_breakdown(transactions, &Kind::Income),
            expense_categories: compute_category_breakdown(transactions, &Kind::Expense),
        }
    }
}

/// The datasets for the income vs. expense pie chart and the per-category charts.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Income and expense amounts, income first.
    pub kind_split: Vec<KindAmount>,
    /// Income by category, largest first.
    pub income_categories: Vec<CategoryShare>,
    /// Expenses by category, largest first.
    pub expense_categories: Vec<CategoryShare>,
    /// Income and expense amounts side by side for every category.
    pub category_comparison: Vec<CategoryComparison>,
}

impl ChartData {
    /// Build the chart datasets for `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let income_categories = compute_category_breakdown(transactions, &Kind::Income);
        let expense_categories = compute_category_breakdown(transactions, &Kind::Expense);
        let category_comparison =
            aggregation::combine_breakdowns(&income_categories, &expense_categories);

        Self {
            kind_split: compute_kind_split(transactions).to_vec(),
            income_categories,
            expense_categories,
            category_comparison,
        }
    }
}
