//! Users, API tokens and request authentication.
//!
//! Clients authenticate with `Authorization: Bearer <token>`. The
//! [session_guard] middleware resolves the token into a [SessionContext]
//! that handlers receive as a request extension. Tokens are issued on
//! registration and log-in with a password.

mod auth_endpoints;
mod middleware;
mod password;
mod token;
mod user;

use serde::Serialize;

pub use auth_endpoints::{log_in_endpoint, register_endpoint};
pub use middleware::session_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use token::{ApiToken, create_session_table, find_session, issue_token};
pub use user::{
    User, UserId, create_user, create_user_table, create_user_with_password, get_password_hash,
    get_user_by_name,
};

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionContext {
    /// The ID of the user the token was issued to.
    pub user_id: UserId,
    /// The name of the user the token was issued to.
    pub user_name: String,
}
