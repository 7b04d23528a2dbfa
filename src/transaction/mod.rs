//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its kind and category, and `NewTransaction` for creating transactions
//! - Parsing of loosely typed JSON records into transactions
//! - Reporting windows used to restrict listings and summaries by date
//! - Database functions for storing and querying transactions
//! - Route handlers for listing and creating transactions

mod core;
mod create_endpoint;
mod list_endpoint;
mod query;
mod record;
mod window;

pub use core::{
    Category, Kind, NewTransaction, OTHER_CATEGORY, Transaction, TransactionId,
    create_transaction, create_transaction_table, get_transactions_in_range,
};
pub use create_endpoint::create_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use record::{ParsedList, RecordError, parse_transaction_list, parse_transaction_record};
pub use window::ReportingWindow;
