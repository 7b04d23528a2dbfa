//! Route handlers that summarise the caller's transactions for a reporting window.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    session::SessionContext,
    summary::{ChartData, Summary},
    timezone::local_today,
    transaction::{ReportingWindow, Transaction, get_transactions_in_range},
};

/// The state needed for summarising transactions.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for the summary endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    /// The reporting window, defaults to the last 7 days.
    pub freq: Option<ReportingWindow>,
}

/// Get the summary of the caller's transactions in the reporting window.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Extension(session): Extension<SessionContext>,
    WithRejection(Query(params), _): WithRejection<Query<WindowParams>, Error>,
) -> Result<Json<Summary>, Error> {
    let window = params.freq.unwrap_or_default();
    let transactions = load_transactions(&state, &session, window)?;

    Ok(Json(Summary::from_transactions(&transactions)))
}

/// Get the chart datasets for the caller's transactions in the reporting window.
pub async fn get_charts_endpoint(
    State(state): State<SummaryState>,
    Extension(session): Extension<SessionContext>,
    WithRejection(Query(params), _): WithRejection<Query<WindowParams>, Error>,
) -> Result<Json<ChartData>, Error> {
    let window = params.freq.unwrap_or_default();
    let transactions = load_transactions(&state, &session, window)?;

    Ok(Json(ChartData::from_transactions(&transactions)))
}

/// Fetch every transaction the caller has in `window`.
///
/// The database lock is released before returning so aggregation never holds it.
fn load_transactions(
    state: &SummaryState,
    session: &SessionContext,
    window: ReportingWindow,
) -> Result<Vec<Transaction>, Error> {
    let today = local_today(&state.local_timezone)?;
    let date_range = window.date_range(today);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_in_range(session.user_id, date_range.as_ref(), &connection)
        .inspect_err(|error| tracing::error!("could not get transactions for summary: {error}"))?;

    tracing::debug!(
        "summarising {} transactions for user {} ({})",
        transactions.len(),
        session.user_id,
        window.as_query_value()
    );

    Ok(transactions)
}
