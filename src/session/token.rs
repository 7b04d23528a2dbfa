//! API tokens and the session table that maps them to users.
//!
//! Only a SHA-256 digest of each token is stored, the plain token is shown to
//! the user once when it is issued.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    session::{SessionContext, UserId},
};

/// A bearer token that authenticates API requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Generate a new random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The plain token, as sent in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The hex encoded SHA-256 digest of `token`.
pub(crate) fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Create the session table.
///
/// The user table must exist before this table is created.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS session (
                token_hash TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Issue a new API token for the user with `user_id`.
///
/// # Errors
///
/// Returns a [Error::NotFound] if the user does not exist, or [Error::SqlError]
/// if some other SQL error occurred.
pub fn issue_token(user_id: UserId, connection: &Connection) -> Result<ApiToken, Error> {
    let user_exists: bool = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM user WHERE id = ?1)",
        (user_id.as_i64(),),
        |row| row.get(0),
    )?;

    if !user_exists {
        return Err(Error::NotFound);
    }

    let token = ApiToken::generate();

    connection.execute(
        "INSERT INTO session (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
        (
            hash_token(token.as_str()),
            user_id.as_i64(),
            OffsetDateTime::now_utc(),
        ),
    )?;

    Ok(token)
}

/// Find the session that `token` belongs to.
///
/// Returns `Ok(None)` if the token does not match any session.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn find_session(token: &str, connection: &Connection) -> Result<Option<SessionContext>, Error> {
    connection
        .query_row(
            "SELECT user.id, user.name FROM session
            INNER JOIN user ON user.id = session.user_id
            WHERE session.token_hash = ?1",
            (hash_token(token),),
            |row| {
                Ok(SessionContext {
                    user_id: UserId::new(row.get(0)?),
                    user_name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
}
