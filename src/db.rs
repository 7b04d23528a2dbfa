//! Database setup for the application's SQLite store.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    session::{create_session_table, create_user_table},
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// The tables are created inside a single exclusive SQL transaction, so either
/// every table exists afterwards or none of the changes are kept.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_session_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
