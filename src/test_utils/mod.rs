#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, PaginationConfig, build_router,
    db::initialize,
    session::{User, create_user, issue_token},
    transaction::{NewTransaction, Transaction, create_transaction},
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

/// A test server for the full router, with one user and a token for them.
pub(crate) struct TestApp {
    pub server: TestServer,
    pub token: String,
    pub user: User,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl TestApp {
    pub fn new() -> Self {
        let mut state =
            AppState::new(get_test_connection(), "Etc/UTC", PaginationConfig::default())
                .expect("Could not create app state.");
        // The lowest cost bcrypt allows, keeps the auth tests fast.
        state.password_hash_cost = 4;

        let (user, token) = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_user("test", &connection).unwrap();
            let token = issue_token(user.id, &connection).unwrap();
            (user, token.to_string())
        };

        let db_connection = state.db_connection.clone();
        let server = TestServer::new(build_router(state)).expect("Could not create test server.");

        Self {
            server,
            token,
            user,
            db_connection,
        }
    }

    /// Store `transaction` for the test user.
    pub fn insert(&self, transaction: NewTransaction) -> Transaction {
        let connection = self.db_connection.lock().unwrap();
        create_transaction(self.user.id, transaction, &connection).unwrap()
    }

    /// Create another user and return a token for them.
    pub fn token_for_new_user(&self, name: &str) -> String {
        let connection = self.db_connection.lock().unwrap();
        let user = create_user(name, &connection).unwrap();
        issue_token(user.id, &connection).unwrap().to_string()
    }
}
