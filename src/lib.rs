//! Finboard is a personal finance tracker for recording income and expenses
//! and summarising them for dashboards.
//!
//! This library provides:
//! - the transaction model and a lenient parser for loosely typed JSON records,
//! - the aggregation functions that turn a list of transactions into totals,
//!   ratios and per-category breakdowns,
//! - a JSON REST API backed by SQLite that serves transactions, summaries and
//!   chart datasets to authenticated clients, who register and log in with a
//!   password to get a bearer token.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod format;
mod logging;
mod pagination;
mod routing;
mod session;
mod summary;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use format::{format_currency, format_summary};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use session::{
    ApiToken, PasswordHash, SessionContext, User, UserId, ValidatedPassword, create_user,
    create_user_with_password, get_user_by_name, issue_token,
};
pub use summary::{
    CategoryComparison, CategoryShare, ChartData, KindAmount, Ratios, Summary, Totals,
    compute_category_breakdown, compute_category_comparison, compute_kind_split, compute_ratio,
    compute_totals,
};
pub use timezone::{get_local_offset, local_today};
pub use transaction::{
    Category, Kind, NewTransaction, OTHER_CATEGORY, ParsedList, RecordError, ReportingWindow,
    Transaction, TransactionId, parse_transaction_list, parse_transaction_record,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for the ctrl+c signal: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a bearer token, or the token does not belong
    /// to an active session.
    #[error("missing or invalid bearer token")]
    Unauthorized,

    /// The user name and password combination did not match a user.
    #[error("incorrect user name or password")]
    InvalidCredentials,

    /// The password is too weak.
    ///
    /// The message explains why and suggests how to make it stronger.
    #[error("{0}")]
    TooWeak(String),

    /// The password and its confirmation differ.
    #[error("the passwords do not match")]
    PasswordsDoNotMatch,

    /// The request body or query string could not be deserialized.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The amount of a new transaction is not a finite, non-negative number.
    #[error("invalid amount \"{0}\": amounts must be non-negative numbers")]
    InvalidAmount(String),

    /// The kind of a new transaction is neither income nor expense.
    #[error("unknown transaction kind \"{0}\": expected \"income\" or \"expense\"")]
    UnknownKind(String),

    /// A required field was missing or blank.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// The date string could not be parsed.
    ///
    /// Accepted formats are `YYYY-MM-DD` and `DD-MM-YYYY`.
    #[error("could not parse the date \"{0}\", expected YYYY-MM-DD or DD-MM-YYYY")]
    InvalidDate(String),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The user name is already taken.
    #[error("the user \"{0}\" already exists")]
    DuplicateUserName(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unexpected error occurred with the underlying hashing library.
    #[error("could not hash the password: {0}")]
    HashingError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_) | Error::PasswordsDoNotMatch | Error::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::InvalidAmount(_)
            | Error::UnknownKind(_)
            | Error::MissingField(_)
            | Error::InvalidDate(_)
            | Error::FutureDate(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateUserName(_) => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::SqlError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            // Internal errors are only shown in the server logs.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use time::macros::date;

    use crate::Error;

    async fn get_message(error: Error) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        (status, json["message"].as_str().unwrap().to_owned())
    }

    #[tokio::test]
    async fn validation_errors_are_shown_to_the_client() {
        let (status, message) = get_message(Error::FutureDate(date!(2099 - 01 - 01))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            message,
            "2099-01-01 is a date in the future, which is not allowed"
        );
    }

    #[tokio::test]
    async fn internal_errors_are_hidden_from_the_client() {
        let (status, message) = get_message(Error::InvalidTimezoneError("Mars/Base".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("Mars/Base"));
    }

    #[tokio::test]
    async fn malformed_requests_are_bad_requests() {
        let (status, message) =
            get_message(Error::InvalidRequest("unknown variant `14d`".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "invalid request: unknown variant `14d`");
    }

    #[tokio::test]
    async fn hashing_errors_are_hidden_from_the_client() {
        let (status, message) = get_message(Error::HashingError("bad cost".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("bad cost"));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
