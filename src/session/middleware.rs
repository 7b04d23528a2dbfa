//! Middleware that resolves the bearer token of a request into a [SessionContext].

use std::sync::{Arc, Mutex};

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;

use crate::{AppState, Error, session::find_session};

/// The state needed for the session middleware.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The database connection for looking up sessions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The [SessionContext](crate::session::SessionContext) is placed into the
/// request and the request executed normally if the token belongs to a
/// session, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<SessionContext>` to receive the session.
pub async fn session_guard(
    State(state): State<SessionState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let Ok(TypedHeader(Authorization(bearer))) =
        parts.extract::<TypedHeader<Authorization<Bearer>>>().await
    else {
        tracing::debug!("rejecting {} {}: missing bearer token", parts.method, parts.uri);
        return Error::Unauthorized.into_response();
    };

    let session = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        find_session(bearer.token(), &connection)
    };

    match session {
        Ok(Some(session)) => {
            parts.extensions.insert(session);
            next.run(Request::from_parts(parts, body)).await
        }
        Ok(None) => {
            tracing::debug!("rejecting {} {}: unknown bearer token", parts.method, parts.uri);
            Error::Unauthorized.into_response()
        }
        Err(error) => error.into_response(),
    }
}
