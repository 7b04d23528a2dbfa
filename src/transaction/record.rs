//! Converts loosely typed JSON transaction records into [Transaction]s.
//!
//! Records from other services do not always agree on field names or types:
//! amounts may be strings, the kind may be called `type`, and ids may be
//! numbers or strings. Everything is normalised here so the rest of the crate
//! only ever sees well-formed transactions.

use serde_json::{Map, Value};
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

use crate::transaction::{Category, Kind, Transaction, TransactionId};

const ISO_DATE: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const DAY_FIRST_DATE: &[BorrowedFormatItem] = format_description!("[day]-[month]-[year]");

/// Why a single record could not be turned into a [Transaction].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// The record is not a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The record has no date, or the date could not be parsed.
    #[error("missing or invalid date: {0:?}")]
    InvalidDate(Option<String>),
}

/// The valid transactions found in a JSON document and the number of entries
/// that had to be skipped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedList {
    /// The transactions in the order they appeared.
    pub transactions: Vec<Transaction>,
    /// The number of entries that were not valid transaction records.
    pub rejected: usize,
    /// The total reported by the document, if any.
    pub reported_total: Option<u64>,
}

/// Parse a date in one of the accepted formats: `YYYY-MM-DD`, `DD-MM-YYYY` or
/// an RFC 3339 date-time, of which only the date is kept.
pub(crate) fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();

    Date::parse(text, ISO_DATE)
        .or_else(|_| Date::parse(text, DAY_FIRST_DATE))
        .ok()
        .or_else(|| OffsetDateTime::parse(text, &Rfc3339).ok().map(|dt| dt.date()))
}

/// Parse a single transaction record.
///
/// Missing or malformed amounts become zero, missing categories become
/// [crate::OTHER_CATEGORY], and unknown kinds are kept as
/// [Kind::Unrecognized].
///
/// # Errors
/// Returns a [RecordError] if the value is not an object or has no valid date.
pub fn parse_transaction_record(value: &Value) -> Result<Transaction, RecordError> {
    let Value::Object(record) = value else {
        return Err(RecordError::NotAnObject(json_type_name(value)));
    };

    let date_text = field(record, &["date"]).and_then(Value::as_str);
    let date = date_text
        .and_then(parse_date)
        .ok_or_else(|| RecordError::InvalidDate(date_text.map(str::to_owned)))?;

    let kind = field(record, &["kind", "type"])
        .and_then(Value::as_str)
        .map(Kind::parse)
        .unwrap_or_else(|| Kind::Unrecognized(String::new()));

    let category = field(record, &["category"])
        .and_then(Value::as_str)
        .map(Category::new)
        .unwrap_or_default();

    Ok(Transaction {
        id: parse_id(field(record, &["id", "_id"])),
        amount: parse_amount(field(record, &["amount", "montant"])),
        kind,
        category,
        date,
        reference: string_field(record, "reference"),
        description: string_field(record, "description"),
    })
}

/// Parse a list of transaction records.
///
/// `value` may either be a JSON array of records, or an object with a
/// `transactions` array and an optional `total`, as returned by the listing
/// endpoint. Invalid entries are skipped and counted. Anything else yields an
/// empty list.
pub fn parse_transaction_list(value: &Value) -> ParsedList {
    let (entries, reported_total) = match value {
        Value::Array(entries) => (entries.as_slice(), None),
        Value::Object(document) => {
            let entries = document
                .get("transactions")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let total = document.get("total").and_then(Value::as_u64);
            (entries, total)
        }
        other => {
            tracing::warn!(
                "expected a transaction list, got {}; treating it as empty",
                json_type_name(other)
            );
            (&[][..], None)
        }
    };

    let mut parsed = ParsedList {
        transactions: Vec::with_capacity(entries.len()),
        rejected: 0,
        reported_total,
    };

    for (index, entry) in entries.iter().enumerate() {
        match parse_transaction_record(entry) {
            Ok(transaction) => parsed.transactions.push(transaction),
            Err(error) => {
                tracing::warn!("skipping transaction record {index}: {error}");
                parsed.rejected += 1;
            }
        }
    }

    parsed
}

fn field<'a>(record: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| record.get(*name))
        .filter(|value| !value.is_null())
}

fn string_field(record: &Map<String, Value>, name: &str) -> String {
    field(record, &[name])
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn parse_id(value: Option<&Value>) -> TransactionId {
    match value {
        Some(Value::String(id)) => TransactionId::new(id.as_str()),
        Some(Value::Number(id)) => TransactionId::new(id.to_string()),
        _ => TransactionId::default(),
    }
}

/// Amounts that are missing, not numeric, negative or not finite count as zero.
fn parse_amount(value: Option<&Value>) -> f64 {
    let amount = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match amount {
        Some(amount) if amount.is_finite() && amount >= 0.0 => amount,
        Some(amount) => {
            tracing::warn!("treating invalid amount {amount} as zero");
            0.0
        }
        None => 0.0,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use crate::transaction::{
        Category, Kind, RecordError, TransactionId, parse_transaction_list,
        parse_transaction_record, record::parse_date,
    };

    #[test]
    fn parses_well_formed_record() {
        let record = json!({
            "id": 7,
            "amount": 100.5,
            "kind": "income",
            "category": "salary",
            "date": "2025-01-15",
            "reference": "PAY-1",
            "description": "January"
        });

        let transaction = parse_transaction_record(&record).unwrap();

        assert_eq!(transaction.id, TransactionId::new("7"));
        assert_eq!(transaction.amount, 100.5);
        assert_eq!(transaction.kind, Kind::Income);
        assert_eq!(transaction.category.as_str(), "salary");
        assert_eq!(transaction.date, date!(2025 - 01 - 15));
        assert_eq!(transaction.reference, "PAY-1");
        assert_eq!(transaction.description, "January");
    }

    #[test]
    fn parses_legacy_field_names() {
        let record = json!({
            "_id": "66b1f0",
            "montant": "42.10",
            "type": "sortie",
            "date": "2025-01-15T09:30:00.000Z"
        });

        let transaction = parse_transaction_record(&record).unwrap();

        assert_eq!(transaction.id, TransactionId::new("66b1f0"));
        assert_eq!(transaction.amount, 42.1);
        assert_eq!(transaction.kind, Kind::Expense);
        assert_eq!(transaction.category, Category::other());
        assert_eq!(transaction.date, date!(2025 - 01 - 15));
    }

    #[test]
    fn malformed_amounts_become_zero() {
        for amount in [json!("abc"), json!(null), json!(-5), json!(true), json!([1])] {
            let record = json!({"amount": amount, "kind": "expense", "date": "2025-01-01"});

            let transaction = parse_transaction_record(&record).unwrap();

            assert_eq!(transaction.amount, 0.0, "amount {amount} should be zero");
        }
    }

    #[test]
    fn missing_kind_is_unrecognized() {
        let record = json!({"amount": 1, "date": "2025-01-01"});

        let transaction = parse_transaction_record(&record).unwrap();

        assert_eq!(transaction.kind, Kind::Unrecognized(String::new()));
    }

    #[test]
    fn rejects_non_objects_and_missing_dates() {
        assert_eq!(
            parse_transaction_record(&json!([1, 2])),
            Err(RecordError::NotAnObject("an array"))
        );
        assert_eq!(
            parse_transaction_record(&json!({"amount": 1})),
            Err(RecordError::InvalidDate(None))
        );
        assert_eq!(
            parse_transaction_record(&json!({"date": "yesterday"})),
            Err(RecordError::InvalidDate(Some("yesterday".to_owned())))
        );
    }

    #[test]
    fn parses_day_first_dates() {
        assert_eq!(parse_date("05-02-2025"), Some(date!(2025 - 02 - 05)));
        assert_eq!(parse_date(" 2025-02-05 "), Some(date!(2025 - 02 - 05)));
        assert_eq!(parse_date("2025/02/05"), None);
    }

    #[test]
    fn list_accepts_listing_documents_and_counts_rejects() {
        let document = json!({
            "transactions": [
                {"amount": 1, "kind": "income", "date": "2025-01-01"},
                "not a record",
                {"amount": 2, "kind": "expense", "date": "2025-01-02"},
                {"amount": 3, "kind": "expense"}
            ],
            "total": 4
        });

        let parsed = parse_transaction_list(&document);

        assert_eq!(parsed.transactions.len(), 2);
        assert_eq!(parsed.transactions[1].amount, 2.0);
        assert_eq!(parsed.rejected, 2);
        assert_eq!(parsed.reported_total, Some(4));
    }

    #[test]
    fn list_accepts_bare_arrays() {
        let parsed =
            parse_transaction_list(&json!([{"amount": 1, "kind": "income", "date": "2025-01-01"}]));

        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.reported_total, None);
    }

    #[test]
    fn list_of_anything_else_is_empty() {
        let parsed = parse_transaction_list(&json!("oops"));

        assert!(parsed.transactions.is_empty());
        assert_eq!(parsed.rejected, 0);
    }
}
