//! Transaction aggregation for the dashboard cards and charts.
//!
//! Provides functions to count and total transactions by kind, break a kind
//! down by category, and compute the rounded percentages shown on progress
//! indicators. Every function is a pure projection of its input.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transaction::{Kind, Transaction};

/// Transaction counts and amounts per kind.
///
/// Transactions whose kind is neither income nor expense are left out of every
/// field, so `total_count == income_count + expense_count` and
/// `total_amount == income_amount + expense_amount`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// The number of income and expense transactions.
    pub total_count: u64,
    /// The number of income transactions.
    pub income_count: u64,
    /// The number of expense transactions.
    pub expense_count: u64,
    /// The sum of income and expense amounts.
    pub total_amount: f64,
    /// The sum of income amounts.
    pub income_amount: f64,
    /// The sum of expense amounts.
    pub expense_amount: f64,
}

/// One category's share of a kind's total amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// The category label.
    pub category: String,
    /// The summed amount of the category's transactions.
    pub amount: f64,
    /// The category's share of the kind's total, rounded to a whole percent.
    pub percentage: u32,
}

/// The summed amount for one kind, used for the income vs. expense pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindAmount {
    /// The kind label, "income" or "expense".
    pub kind: String,
    /// The summed amount.
    pub amount: f64,
}

/// Income and expense amounts for one category, used for the per-category bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryComparison {
    /// The category label.
    pub category: String,
    /// The summed income amount, zero if the category has no income.
    pub income: f64,
    /// The summed expense amount, zero if the category has no expenses.
    pub expense: f64,
}

/// Count and total the transactions by kind.
///
/// Unrecognised kinds are excluded from both partitions and from the totals.
pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        match transaction.kind {
            Kind::Income => {
                totals.income_count += 1;
                totals.income_amount += transaction.amount;
            }
            Kind::Expense => {
                totals.expense_count += 1;
                totals.expense_amount += transaction.amount;
            }
            Kind::Unrecognized(_) => continue,
        }
    }

    totals.total_count = totals.income_count + totals.expense_count;
    totals.total_amount = totals.income_amount + totals.expense_amount;

    totals
}

/// Break the transactions of `kind` down by category.
///
/// Categories are sorted by descending summed amount. Categories with equal
/// sums keep the order in which they were first encountered. Each percentage
/// is rounded independently with [compute_ratio], so they may not add up to
/// exactly 100.
///
/// # Returns
/// One entry per distinct category of `kind`, or an empty vector if no
/// transaction has that kind.
pub fn compute_category_breakdown(transactions: &[Transaction], kind: &Kind) -> Vec<CategoryShare> {
    let mut groups: Vec<(&str, f64)> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    let mut kind_total = 0.0;

    for transaction in transactions.iter().filter(|t| &t.kind == kind) {
        let category = transaction.category.as_str();
        let index = *group_index.entry(category).or_insert_with(|| {
            groups.push((category, 0.0));
            groups.len() - 1
        });

        groups[index].1 += transaction.amount;
        kind_total += transaction.amount;
    }

    // `sort_by` is stable, so ties keep first-encountered order.
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));

    groups
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category: category.to_owned(),
            amount,
            percentage: compute_ratio(amount, kind_total),
        })
        .collect()
}

/// Compute `numerator / denominator` as a whole percentage.
///
/// Rounds half away from zero. Returns zero when `denominator` is not
/// positive. Complementary ratios (e.g. income and expense shares) are rounded
/// independently and are not adjusted to add up to 100.
pub fn compute_ratio(numerator: f64, denominator: f64) -> u32 {
    if denominator > 0.0 {
        // Negative or NaN results saturate to zero.
        (numerator / denominator * 100.0).round() as u32
    } else {
        0
    }
}

/// The summed income and expense amounts, income first.
pub fn compute_kind_split(transactions: &[Transaction]) -> [KindAmount; 2] {
    let totals = compute_totals(transactions);

    [
        KindAmount {
            kind: Kind::Income.to_string(),
            amount: totals.income_amount,
        },
        KindAmount {
            kind: Kind::Expense.to_string(),
            amount: totals.expense_amount,
        },
    ]
}

/// Combine the income and expense breakdowns into one row per category.
///
/// Rows follow the income breakdown order, followed by categories that only
/// appear in the expense breakdown in that breakdown's order.
pub fn compute_category_comparison(transactions: &[Transaction]) -> Vec<CategoryComparison> {
    let income = compute_category_breakdown(transactions, &Kind::Income);
    let expense = compute_category_breakdown(transactions, &Kind::Expense);

    combine_breakdowns(&income, &expense)
}

pub(super) fn combine_breakdowns(
    income: &[CategoryShare],
    expense: &[CategoryShare],
) -> Vec<CategoryComparison> {
    let mut rows: Vec<CategoryComparison> = Vec::with_capacity(income.len() + expense.len());
    let mut row_index: HashMap<&str, usize> = HashMap::new();

    for share in income {
        row_index.insert(&share.category, rows.len());
        rows.push(CategoryComparison {
            category: share.category.clone(),
            income: share.amount,
            expense: 0.0,
        });
    }

    for share in expense {
        match row_index.get(share.category.as_str()) {
            Some(&index) => rows[index].expense = share.amount,
            None => rows.push(CategoryComparison {
                category: share.category.clone(),
                income: 0.0,
                expense: share.amount,
            }),
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        summary::aggregation::{
            CategoryComparison, CategoryShare, Totals, compute_category_breakdown,
            compute_category_comparison, compute_kind_split, compute_ratio, compute_totals,
        },
        transaction::{Kind, Transaction, TransactionId},
    };

    fn create_test_transaction(amount: f64, kind: Kind, category: &str) -> Transaction {
        Transaction::build(amount, kind, date!(2025 - 01 - 15))
            .category(category)
            .finalize(TransactionId::default())
    }

    fn share(category: &str, amount: f64, percentage: u32) -> CategoryShare {
        CategoryShare {
            category: category.to_owned(),
            amount,
            percentage,
        }
    }

    fn salary_and_food() -> Vec<Transaction> {
        vec![
            create_test_transaction(100.0, Kind::Income, "salary"),
            create_test_transaction(50.0, Kind::Expense, "food"),
            create_test_transaction(50.0, Kind::Expense, "food"),
        ]
    }

    #[test]
    fn totals_partition_by_kind() {
        let totals = compute_totals(&salary_and_food());

        assert_eq!(
            totals,
            Totals {
                total_count: 3,
                income_count: 1,
                expense_count: 2,
                total_amount: 200.0,
                income_amount: 100.0,
                expense_amount: 100.0,
            }
        );
    }

    #[test]
    fn expense_breakdown_groups_categories() {
        let breakdown = compute_category_breakdown(&salary_and_food(), &Kind::Expense);

        assert_eq!(breakdown, vec![share("food", 100.0, 100)]);
    }

    #[test]
    fn empty_input_gives_zeros_and_empty_breakdowns() {
        assert_eq!(compute_totals(&[]), Totals::default());
        assert!(compute_category_breakdown(&[], &Kind::Income).is_empty());
        assert!(compute_category_breakdown(&[], &Kind::Expense).is_empty());
        assert_eq!(compute_ratio(0.0, 0.0), 0);
    }

    #[test]
    fn unrecognized_kinds_are_excluded_from_totals() {
        let mut transactions = salary_and_food();
        transactions.push(create_test_transaction(
            999.0,
            Kind::Unrecognized("transfer".to_owned()),
            "savings",
        ));

        let totals = compute_totals(&transactions);

        assert_eq!(totals.total_count, 3);
        assert_eq!(totals.total_amount, 200.0);
        assert_eq!(
            totals.income_count + totals.expense_count,
            totals.total_count
        );
        assert_eq!(
            totals.income_amount + totals.expense_amount,
            totals.total_amount
        );
    }

    #[test]
    fn missing_categories_are_grouped_as_other() {
        let transactions = vec![
            create_test_transaction(10.0, Kind::Expense, ""),
            create_test_transaction(30.0, Kind::Expense, "rent"),
            create_test_transaction(20.0, Kind::Expense, "   "),
        ];

        let breakdown = compute_category_breakdown(&transactions, &Kind::Expense);

        assert_eq!(
            breakdown,
            vec![share("other", 30.0, 50), share("rent", 30.0, 50)]
        );
    }

    #[test]
    fn breakdown_sorts_by_amount_and_keeps_first_seen_order_for_ties() {
        let transactions = vec![
            create_test_transaction(10.0, Kind::Expense, "transport"),
            create_test_transaction(20.0, Kind::Expense, "medical"),
            create_test_transaction(50.0, Kind::Expense, "food"),
            create_test_transaction(20.0, Kind::Expense, "education"),
            create_test_transaction(99.0, Kind::Income, "salary"),
        ];

        let breakdown = compute_category_breakdown(&transactions, &Kind::Expense);

        let categories: Vec<&str> = breakdown.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, vec!["food", "medical", "education", "transport"]);
        let percentages: Vec<u32> = breakdown.iter().map(|s| s.percentage).collect();
        assert_eq!(percentages, vec![50, 20, 20, 10]);
    }

    #[test]
    fn breakdown_percentages_are_rounded_independently() {
        let transactions = vec![
            create_test_transaction(1.0, Kind::Income, "a"),
            create_test_transaction(1.0, Kind::Income, "b"),
            create_test_transaction(1.0, Kind::Income, "c"),
        ];

        let breakdown = compute_category_breakdown(&transactions, &Kind::Income);

        assert!(breakdown.iter().all(|s| s.percentage == 33));
    }

    #[test]
    fn zero_amount_kind_gives_zero_percentages() {
        let transactions = vec![
            create_test_transaction(0.0, Kind::Expense, "food"),
            create_test_transaction(0.0, Kind::Expense, "rent"),
        ];

        let breakdown = compute_category_breakdown(&transactions, &Kind::Expense);

        assert_eq!(breakdown, vec![share("food", 0.0, 0), share("rent", 0.0, 0)]);
    }

    #[test]
    fn breakdown_percentages_stay_within_bounds() {
        let transactions: Vec<Transaction> = (0..20)
            .map(|i| create_test_transaction(i as f64 * 1.7, Kind::Expense, &format!("c{}", i % 7)))
            .collect();

        let breakdown = compute_category_breakdown(&transactions, &Kind::Expense);

        assert_eq!(breakdown.len(), 7);
        assert!(breakdown.iter().all(|s| s.percentage <= 100));
    }

    #[test]
    fn ratio_rounds_each_value() {
        assert_eq!(compute_ratio(1.0, 3.0), 33);
        assert_eq!(compute_ratio(2.0, 3.0), 67);
        assert_eq!(compute_ratio(1.0, 6.0), 17);
        assert_eq!(compute_ratio(5.0, 6.0), 83);
        assert_eq!(compute_ratio(1.0, 2.0), 50);
        assert_eq!(compute_ratio(1.0, 8.0), 13);
        assert_eq!(compute_ratio(3.0, 0.0), 0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let transactions = salary_and_food();

        assert_eq!(compute_totals(&transactions), compute_totals(&transactions));
        assert_eq!(
            compute_category_breakdown(&transactions, &Kind::Expense),
            compute_category_breakdown(&transactions, &Kind::Expense)
        );
        assert_eq!(transactions, salary_and_food());
    }

    #[test]
    fn kind_split_lists_income_then_expense() {
        let split = compute_kind_split(&salary_and_food());

        assert_eq!(split[0].kind, "income");
        assert_eq!(split[0].amount, 100.0);
        assert_eq!(split[1].kind, "expense");
        assert_eq!(split[1].amount, 100.0);
    }

    #[test]
    fn comparison_merges_categories_from_both_kinds() {
        let transactions = vec![
            create_test_transaction(100.0, Kind::Income, "salary"),
            create_test_transaction(40.0, Kind::Income, "freelance"),
            create_test_transaction(30.0, Kind::Expense, "food"),
            create_test_transaction(15.0, Kind::Expense, "freelance"),
        ];

        let rows = compute_category_comparison(&transactions);

        assert_eq!(
            rows,
            vec![
                CategoryComparison {
                    category: "salary".to_owned(),
                    income: 100.0,
                    expense: 0.0
                },
                CategoryComparison {
                    category: "freelance".to_owned(),
                    income: 40.0,
                    expense: 15.0
                },
                CategoryComparison {
                    category: "food".to_owned(),
                    income: 0.0,
                    expense: 30.0
                },
            ]
        );
    }
}
