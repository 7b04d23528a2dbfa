//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    session::{log_in_endpoint, register_endpoint, session_guard},
    summary::{get_charts_endpoint, get_summary_endpoint},
    transaction::{create_transaction_endpoint, list_transactions_endpoint},
};

/// Return a router with all the app's routes.
///
/// Every route except [endpoints::COFFEE], [endpoints::REGISTER] and
/// [endpoints::LOG_IN] requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTIONS_SUMMARY, get(get_summary_endpoint))
        .route(endpoints::TRANSACTIONS_CHARTS, get(get_charts_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), session_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "the requested resource could not be found" })),
    )
        .into_response()
}
