//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    session::SessionContext,
    timezone::local_today,
    transaction::{Kind, NewTransaction, Transaction, core::create_transaction, record::parse_date},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// An amount as sent by a client, either a JSON number or a numeric string
/// such as "1200.50".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// A JSON number.
    Number(f64),
    /// A string that should contain a number.
    Text(String),
}

/// The request body for creating a transaction.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    /// The value of the transaction.
    #[serde(alias = "montant")]
    pub amount: Option<AmountInput>,
    /// "income" or "expense".
    #[serde(alias = "type")]
    pub kind: Option<String>,
    /// The category label.
    pub category: Option<String>,
    /// The date as `YYYY-MM-DD` or `DD-MM-YYYY`.
    pub date: Option<String>,
    /// An external reference, e.g. an invoice number.
    pub reference: Option<String>,
    /// Optional text detailing the transaction.
    pub description: Option<String>,
}

impl TransactionForm {
    /// Check the form and turn it into a [NewTransaction].
    ///
    /// # Errors
    /// Returns an error naming the first invalid field:
    /// - [Error::MissingField] if a required field is absent or blank,
    /// - [Error::InvalidAmount] if the amount is negative or not a number,
    /// - [Error::UnknownKind] if the kind is not income or expense,
    /// - [Error::InvalidDate] if the date cannot be parsed,
    /// - [Error::FutureDate] if the date is after `today`.
    pub fn validate(self, today: Date) -> Result<NewTransaction, Error> {
        let amount = match self.amount {
            None => return Err(Error::MissingField("amount")),
            Some(AmountInput::Number(amount)) => amount,
            Some(AmountInput::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidAmount(text.clone()))?,
        };

        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount(amount.to_string()));
        }

        let kind = required(self.kind.as_deref(), "kind")?;
        let kind = match Kind::parse(kind) {
            Kind::Unrecognized(label) => return Err(Error::UnknownKind(label)),
            kind => kind,
        };

        let category = required(self.category.as_deref(), "category")?;
        let reference = required(self.reference.as_deref(), "reference")?;

        let date_text = required(self.date.as_deref(), "date")?;
        let date = parse_date(date_text).ok_or_else(|| Error::InvalidDate(date_text.to_owned()))?;

        if date > today {
            return Err(Error::FutureDate(date));
        }

        Ok(Transaction::build(amount, kind, date)
            .category(category)
            .reference(reference.trim())
            .description(self.description.as_deref().unwrap_or_default().trim()))
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, Error> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(Error::MissingField(name))
}

/// A route handler for creating a new transaction, responds with the created
/// transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(session): Extension<SessionContext>,
    WithRejection(Json(form), _): WithRejection<Json<TransactionForm>, Error>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let today = local_today(&state.local_timezone)?;

    let new_transaction = form
        .validate(today)
        .inspect_err(|error| tracing::info!("rejected new transaction: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(session.user_id, new_transaction, &connection)
        .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    tracing::info!(
        "user {} created transaction {}",
        session.user_id,
        transaction.id
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}
