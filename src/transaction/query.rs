//! Paged, sorted listing of a user's transactions.

use std::ops::RangeInclusive;

use rusqlite::{Connection, params_from_iter};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    pagination::Pagination,
    session::UserId,
    transaction::{
        Transaction,
        core::{TRANSACTION_COLUMNS, map_transaction_row, user_and_date_filter},
    },
};

/// The order in which listed transactions are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    #[serde(rename = "-date")]
    DateDescending,
    /// Oldest first.
    #[serde(rename = "date")]
    DateAscending,
    /// Largest amount first.
    #[serde(rename = "-amount")]
    AmountDescending,
    /// Smallest amount first.
    #[serde(rename = "amount")]
    AmountAscending,
}

impl SortOrder {
    fn order_by_clause(self) -> &'static str {
        match self {
            Self::DateDescending => "date DESC, id DESC",
            Self::DateAscending => "date ASC, id ASC",
            Self::AmountDescending => "amount DESC, id DESC",
            Self::AmountAscending => "amount ASC, id ASC",
        }
    }
}

/// The parameters for listing transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions in this range, or all transactions if `None`.
    pub date_range: Option<RangeInclusive<Date>>,
    /// The order of the results.
    pub sort: SortOrder,
    /// Which page of results to return.
    pub pagination: Pagination,
}

/// One page of transactions and the number of transactions across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    /// The transactions on the requested page.
    pub transactions: Vec<Transaction>,
    /// The number of transactions matching the query, ignoring pagination.
    pub total: u64,
}

/// List a page of the transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn query_transactions(
    user_id: UserId,
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let (filter, mut params) = user_and_date_filter(user_id, query.date_range.as_ref());

    let total: i64 = connection.query_row(
        &format!("SELECT COUNT(id) FROM \"transaction\" WHERE {filter}"),
        params_from_iter(params.iter()),
        |row| row.get(0),
    )?;

    let limit_index = params.len() + 1;
    let offset_index = params.len() + 2;
    params.push(Box::new(to_sql_integer(query.pagination.limit)));
    params.push(Box::new(to_sql_integer(query.pagination.offset())));

    let transactions = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE {filter}
             ORDER BY {} LIMIT ?{limit_index} OFFSET ?{offset_index}",
            query.sort.order_by_clause()
        ))?
        .query_map(params_from_iter(params.iter()), map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()?;

    Ok(TransactionPage {
        transactions,
        total: u64::try_from(total).unwrap_or_default(),
    })
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        pagination::Pagination,
        session::{User, create_user},
        test_utils::get_test_connection,
        transaction::{
            Kind, Transaction, create_transaction,
            query::{SortOrder, TransactionQuery, query_transactions},
        },
    };

    fn populate(conn: &Connection) -> User {
        let user = create_user("alice", conn).unwrap();

        for (amount, date) in [
            (30.0, date!(2025 - 01 - 03)),
            (10.0, date!(2025 - 01 - 01)),
            (50.0, date!(2025 - 01 - 05)),
            (20.0, date!(2025 - 01 - 02)),
            (40.0, date!(2025 - 01 - 04)),
        ] {
            create_transaction(user.id, Transaction::build(amount, Kind::Expense, date), conn)
                .unwrap();
        }

        user
    }

    fn amounts(transactions: &[Transaction]) -> Vec<f64> {
        transactions.iter().map(|t| t.amount).collect()
    }

    #[test]
    fn pages_newest_first_by_default() {
        let conn = get_test_connection();
        let user = populate(&conn);
        let query = TransactionQuery {
            date_range: None,
            sort: SortOrder::default(),
            pagination: Pagination { page: 2, limit: 2 },
        };

        let page = query_transactions(user.id, &query, &conn).unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(amounts(&page.transactions), vec![30.0, 20.0]);
    }

    #[test]
    fn total_counts_matches_in_date_range() {
        let conn = get_test_connection();
        let user = populate(&conn);
        let query = TransactionQuery {
            date_range: Some(date!(2025 - 01 - 02)..=date!(2025 - 01 - 04)),
            sort: SortOrder::AmountDescending,
            pagination: Pagination { page: 1, limit: 10 },
        };

        let page = query_transactions(user.id, &query, &conn).unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(amounts(&page.transactions), vec![40.0, 30.0, 20.0]);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let conn = get_test_connection();
        let user = populate(&conn);
        let query = TransactionQuery {
            date_range: None,
            sort: SortOrder::DateAscending,
            pagination: Pagination { page: 9, limit: 10 },
        };

        let page = query_transactions(user.id, &query, &conn).unwrap();

        assert_eq!(page.total, 5);
        assert!(page.transactions.is_empty());
    }

    #[test]
    fn other_users_transactions_are_not_listed() {
        let conn = get_test_connection();
        populate(&conn);
        let bob = create_user("bob", &conn).unwrap();
        let query = TransactionQuery {
            date_range: None,
            sort: SortOrder::default(),
            pagination: Pagination { page: 1, limit: 10 },
        };

        let page = query_transactions(bob.id, &query, &conn).unwrap();

        assert_eq!(page.total, 0);
        assert!(page.transactions.is_empty());
    }
}
