//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::{Error, session::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's unique name.
    pub name: String,
}

/// Create the user table.
///
/// `password` holds a bcrypt hash and is null for users that only
/// authenticate with tokens issued by an administrator.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                password TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::MissingField] if `name` is blank,
/// - [Error::DuplicateUserName] if a user with the same name exists,
/// - or [Error::SqlError] if some other SQL error occurred.
pub fn create_user(name: &str, connection: &Connection) -> Result<User, Error> {
    insert_user(name, None, connection)
}

/// Create and insert a new user that logs in with a password.
///
/// # Errors
///
/// Returns the same errors as [create_user].
pub fn create_user_with_password(
    name: &str,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    insert_user(name, Some(password_hash), connection)
}

fn insert_user(
    name: &str,
    password_hash: Option<&PasswordHash>,
    connection: &Connection,
) -> Result<User, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::MissingField("name"));
    }

    connection
        .execute(
            "INSERT INTO user (name, password) VALUES (?1, ?2)",
            (name, password_hash.map(PasswordHash::as_str)),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateUserName(name.to_owned()),
            error => error.into(),
        })?;

    Ok(User {
        id: UserId::new(connection.last_insert_rowid()),
        name: name.to_owned(),
    })
}

/// Get the user named `name`.
///
/// # Errors
///
/// Returns a [Error::NotFound] if there is no such user, or [Error::SqlError]
/// if some other SQL error occurred.
pub fn get_user_by_name(name: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            "SELECT id, name FROM user WHERE name = :name",
            &[(":name", name.trim())],
            |row| {
                Ok(User {
                    id: UserId::new(row.get(0)?),
                    name: row.get(1)?,
                })
            },
        )
        .map_err(|error| error.into())
}

/// Get the password hash of the user `user_id`.
///
/// Returns `None` if the user has no password.
///
/// # Errors
///
/// Returns a [Error::NotFound] if there is no such user, or [Error::SqlError]
/// if some other SQL error occurred.
pub fn get_password_hash(
    user_id: UserId,
    connection: &Connection,
) -> Result<Option<PasswordHash>, Error> {
    let password: Option<Option<String>> = connection
        .query_row(
            "SELECT password FROM user WHERE id = ?1",
            (user_id.as_i64(),),
            |row| row.get(0),
        )
        .optional()?;

    match password {
        None => Err(Error::NotFound),
        Some(password) => Ok(password.as_deref().map(PasswordHash::new_unchecked)),
    }
}
