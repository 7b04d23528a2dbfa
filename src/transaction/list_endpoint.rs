//! Defines the endpoint for listing a page of transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    pagination::PaginationConfig,
    session::SessionContext,
    timezone::local_today,
    transaction::{
        ReportingWindow, Transaction,
        query::{SortOrder, TransactionQuery, query_transactions},
    },
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The config that controls how to page transactions.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of transactions per page.
    pub limit: Option<u64>,
    /// The order of the transactions, e.g. "-date".
    pub sort: Option<SortOrder>,
    /// The reporting window. All transactions are listed if not given.
    pub freq: Option<ReportingWindow>,
}

/// A page of transactions.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionListResponse {
    /// The transactions on this page.
    pub transactions: Vec<Transaction>,
    /// The number of transactions across all pages.
    pub total: u64,
    /// The page number that was returned.
    pub page: u64,
    /// The page size that was used.
    pub limit: u64,
}

/// A route handler that returns a page of the caller's transactions.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(session): Extension<SessionContext>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> Result<Json<TransactionListResponse>, Error> {
    let today = local_today(&state.local_timezone)?;
    let window = params.freq.unwrap_or(ReportingWindow::All);
    let pagination = state.pagination_config.resolve(params.page, params.limit);

    let query = TransactionQuery {
        date_range: window.date_range(today),
        sort: params.sort.unwrap_or_default(),
        pagination,
    };

    let page = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        query_transactions(session.user_id, &query, &connection)
            .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?
    };

    tracing::debug!(
        "listed {} of {} transactions for user {} ({})",
        page.transactions.len(),
        page.total,
        session.user_id,
        window.as_query_value()
    );

    Ok(Json(TransactionListResponse {
        transactions: page.transactions,
        total: page.total,
        page: pagination.page,
        limit: pagination.limit,
    }))
}
