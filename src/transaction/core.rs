//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, ops::RangeInclusive};

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::DatabaseId, session::UserId};

/// The category used for transactions without a category label.
pub const OTHER_CATEGORY: &str = "other";

// ============================================================================
// MODELS
// ============================================================================

/// An opaque, unique identifier for a transaction.
///
/// Transactions stored by this application use their database ID, transactions
/// parsed from external JSON keep whatever ID the source gave them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create a transaction ID from an opaque string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<DatabaseId> for TransactionId {
    fn from(id: DatabaseId) -> Self {
        Self(id.to_string())
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether money was earned or spent.
///
/// Records parsed from external sources may carry a label that is neither, it
/// is kept as [Kind::Unrecognized] so that summaries can leave it out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Kind {
    /// Money coming in, e.g. a salary.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
    /// Any other label, kept verbatim (trimmed).
    Unrecognized(String),
}

impl Kind {
    /// Parse a kind label.
    ///
    /// Matching ignores case and surrounding whitespace. The labels "entree"
    /// and "sortie" used by older clients are aliases for income and expense.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();

        match label.to_lowercase().as_str() {
            "income" | "entree" | "entrée" => Kind::Income,
            "expense" | "sortie" => Kind::Expense,
            _ => Kind::Unrecognized(label.to_owned()),
        }
    }

    /// The canonical label for the kind.
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
            Kind::Unrecognized(label) => label,
        }
    }
}

impl From<String> for Kind {
    fn from(label: String) -> Self {
        Kind::parse(&label)
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.as_str().to_owned()
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A free-form label for grouping transactions, e.g. "salary" or "food".
///
/// Blank labels are replaced with [OTHER_CATEGORY] so that all unlabelled
/// transactions end up in the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub struct Category(String);

impl Category {
    /// Create a category from a label, trimming surrounding whitespace.
    pub fn new(label: &str) -> Self {
        let label = label.trim();

        if label.is_empty() {
            Self::other()
        } else {
            Self(label.to_owned())
        }
    }

    /// The category for transactions without a label.
    pub fn other() -> Self {
        Self(OTHER_CATEGORY.to_owned())
    }

    /// The category label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::other()
    }
}

impl From<Option<String>> for Category {
    fn from(label: Option<String>) -> Self {
        label.as_deref().map(Category::new).unwrap_or_default()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction, never negative.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub kind: Kind,
    /// The label used to group the transaction in breakdowns.
    pub category: Category,
    /// When the transaction happened.
    pub date: Date,
    /// An external reference, e.g. an invoice number.
    pub reference: String,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(amount: f64, kind: Kind, date: Date) -> NewTransaction {
        NewTransaction {
            amount,
            kind,
            date,
            category: Category::other(),
            reference: String::new(),
            description: String::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The category defaults to [OTHER_CATEGORY] and the reference and description
/// default to empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money, never negative.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub kind: Kind,
    /// When the transaction happened.
    pub date: Date,
    /// The label used to group the transaction in breakdowns.
    pub category: Category,
    /// An external reference, e.g. an invoice number.
    pub reference: String,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl NewTransaction {
    /// Set the category label for the transaction.
    pub fn category(mut self, label: &str) -> Self {
        self.category = Category::new(label);
        self
    }

    /// Set the external reference for the transaction.
    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = reference.to_owned();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Turn the builder into a [Transaction] with the given `id`.
    pub fn finalize(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            date: self.date,
            reference: self.reference,
            description: self.description,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected by every transaction query, in the order expected by
/// [map_transaction_row].
pub(super) const TRANSACTION_COLUMNS: &str =
    "id, amount, kind, category, date, reference, description";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                reference TEXT NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by both the list and summary queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction owned by `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    user_id: UserId,
    builder: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, amount, kind, category, date, reference, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                builder.amount,
                builder.kind.as_str(),
                builder.category.as_str(),
                builder.date,
                builder.reference,
                builder.description,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get all of a user's transactions, optionally restricted to `date_range`.
///
/// Transactions are returned in chronological order, ties broken by the order
/// in which they were created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_in_range(
    user_id: UserId,
    date_range: Option<&RangeInclusive<Date>>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (filter, params) = user_and_date_filter(user_id, date_range);

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE {filter} ORDER BY date ASC, id ASC"
        ))?
        .query_map(params_from_iter(params.iter()), map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Build the `WHERE` clause and its parameters that restrict a query to one
/// user's transactions, optionally within `date_range`.
pub(super) fn user_and_date_filter(
    user_id: UserId,
    date_range: Option<&RangeInclusive<Date>>,
) -> (&'static str, Vec<Box<dyn ToSql>>) {
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.as_i64())];

    match date_range {
        Some(range) => {
            params.push(Box::new(*range.start()));
            params.push(Box::new(*range.end()));
            ("user_id = ?1 AND date BETWEEN ?2 AND ?3", params)
        }
        None => ("user_id = ?1", params),
    }
}

/// Map a database row to a Transaction.
pub(super) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id: DatabaseId = row.get(0)?;
    let amount = row.get(1)?;
    let kind: String = row.get(2)?;
    let category: String = row.get(3)?;
    let date = row.get(4)?;
    let reference = row.get(5)?;
    let description = row.get(6)?;

    Ok(Transaction {
        id: TransactionId::from(id),
        amount,
        kind: Kind::parse(&kind),
        category: Category::new(&category),
        date,
        reference,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================
