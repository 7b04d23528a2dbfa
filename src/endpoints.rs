//! The API endpoints URIs.

/// The route to request a cup of coffee, doubles as a health check.
pub const COFFEE: &str = "/api/coffee";
/// The route to register a user with a password.
pub const REGISTER: &str = "/api/v1/auth/register";
/// The route to log in with a user name and password.
pub const LOG_IN: &str = "/api/v1/auth/login";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/v1/transactions";
/// The route for the dashboard summary of the caller's transactions.
pub const TRANSACTIONS_SUMMARY: &str = "/api/v1/transactions/summary";
/// The route for the chart datasets of the caller's transactions.
pub const TRANSACTIONS_CHARTS: &str = "/api/v1/transactions/charts";
