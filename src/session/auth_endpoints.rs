//! Defines the endpoints for registering a user and logging in with a password.
//!
//! Both respond with a fresh bearer token and the user it belongs to.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    session::{
        PasswordHash, User, ValidatedPassword, create_user_with_password, get_password_hash,
        get_user_by_name, issue_token,
    },
};

/// The state needed to register users and log them in.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The database connection for managing users and sessions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// The request body for registering a user.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// The unique user name. Clients that identify users by email send it as `email`.
    #[serde(alias = "email")]
    pub name: String,
    /// The password for logging in.
    pub password: String,
    /// The password typed a second time. Not checked if absent.
    pub confirm_password: Option<String>,
}

/// The request body for logging in.
#[derive(Debug, Deserialize)]
pub struct LogInForm {
    /// The user name given at registration.
    #[serde(alias = "email")]
    pub name: String,
    /// The password given at registration.
    pub password: String,
}

/// A bearer token and the user it was issued to.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The token to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// A route handler for registering a new user, responds with a token for them.
///
/// # Errors
///
/// - [Error::TooWeak] if the password is easy to guess,
/// - [Error::PasswordsDoNotMatch] if the confirmation differs from the password,
/// - [Error::MissingField] if the name is blank,
/// - [Error::DuplicateUserName] if the name is taken.
pub async fn register_endpoint(
    State(state): State<AuthState>,
    WithRejection(Json(form), _): WithRejection<Json<RegisterForm>, Error>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    if form.name.trim().is_empty() {
        return Err(Error::MissingField("name"));
    }

    let validated_password = ValidatedPassword::new(&form.password)?;

    if form
        .confirm_password
        .as_ref()
        .is_some_and(|confirm_password| *confirm_password != form.password)
    {
        return Err(Error::PasswordsDoNotMatch);
    }

    let password_hash = PasswordHash::new(validated_password, state.password_hash_cost)
        .inspect_err(|error| tracing::error!("could not hash password: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = create_user_with_password(&form.name, &password_hash, &connection)
        .inspect_err(|error| tracing::info!("could not register user: {error}"))?;
    let token = issue_token(user.id, &connection)?;

    tracing::info!("registered user {} ({})", user.id, user.name);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: token.to_string(),
            user,
        }),
    ))
}

/// A route handler for logging in with a user name and password, responds
/// with a new token.
///
/// Unknown users and users without a password get the same
/// [Error::InvalidCredentials] as a wrong password.
pub async fn log_in_endpoint(
    State(state): State<AuthState>,
    WithRejection(Json(form), _): WithRejection<Json<LogInForm>, Error>,
) -> Result<Json<AuthResponse>, Error> {
    let (user, password_hash) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let user = match get_user_by_name(&form.name, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        };
        let password_hash = get_password_hash(user.id, &connection)?;

        (user, password_hash)
    };

    let Some(password_hash) = password_hash else {
        tracing::info!("user {} tried to log in without a password", user.id);
        return Err(Error::InvalidCredentials);
    };

    let is_password_valid = password_hash
        .verify(&form.password)
        .inspect_err(|error| tracing::error!("could not verify password: {error}"))
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        tracing::info!("user {} entered an incorrect password", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        issue_token(user.id, &connection)?
    };

    tracing::info!("user {} logged in", user.id);

    Ok(Json(AuthResponse {
        token: token.to_string(),
        user,
    }))
}

#[cfg(test)]
mod register_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{session::auth_endpoints::AuthResponse, test_utils::TestApp};

    #[tokio::test]
    async fn register_returns_a_token_for_the_new_user() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "name": "alice",
                "password": "roostersgocockledoodledoo",
                "confirm_password": "roostersgocockledoodledoo"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: AuthResponse = response.json();
        assert_eq!(body.user.name, "alice");
        assert!(!body.token.is_empty());

        app.server
            .get("/api/v1/transactions/summary")
            .authorization_bearer(&body.token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn register_accepts_email_as_the_name() {
        let app = TestApp::new();

        let body: AuthResponse = app
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "email": "alice@example.com",
                "password": "roostersgocockledoodledoo",
                "firstName": "Alice"
            }))
            .await
            .json();

        assert_eq!(body.user.name, "alice@example.com");
    }

    #[tokio::test]
    async fn register_fails_with_existing_user() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "name": "test",
                "password": "roostersgocockledoodledoo"
            }))
            .await;

        response.assert_status_conflict();
        response.assert_json(&json!({ "message": "the user \"test\" already exists" }));
    }

    #[tokio::test]
    async fn register_fails_when_password_is_weak() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/v1/auth/register")
            .json(&json!({ "name": "alice", "password": "password1234" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn register_fails_when_passwords_do_not_match() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "name": "alice",
                "password": "roostersgocockledoodledoo",
                "confirm_password": "thisisadifferentpassword"
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "message": "the passwords do not match" }));
    }

    #[tokio::test]
    async fn register_fails_without_a_password() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/v1/auth/register")
            .json(&json!({ "name": "alice" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("invalid request:")
        );
    }
}
