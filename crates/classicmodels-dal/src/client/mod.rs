//! Connection management
//!
//! This module handles:
//! * The [`Connector`] / [`Session`] seams between the manager and a driver
//! * Connect-with-retry and exponential backoff ([`RetryPolicy`])
//! * The single managed handle and its liveness check ([`ConnectionManager`])
//! * Scoped acquisition that closes on every exit path ([`ScopedConnection`])

mod driver;
mod manager;
mod retry;
mod scoped;

#[cfg(test)]
mod tests;

use mysql::{Params, Row};

pub use driver::MySqlConnector;
pub use manager::ConnectionManager;
pub use retry::RetryPolicy;
pub use scoped::ScopedConnection;

use crate::config::DbConfig;
use crate::{ConnectError, Result};

/// An open session with the backing store.
///
/// Dropping a session closes it.
pub trait Session {
    /// Query-independent round trip proving the session is still usable.
    fn ping(&mut self) -> Result<()>;

    /// Execute one statement and return every row.
    fn fetch_all(&mut self, sql: &str, params: Params) -> Result<Vec<Row>>;

    /// Execute one statement and return the first row, if any.
    fn fetch_one(&mut self, sql: &str, params: Params) -> Result<Option<Row>>;

    /// Execute one mutating statement in its own transaction.
    ///
    /// Commits and returns the affected row count on success; rolls back
    /// before returning the error otherwise.
    fn execute(&mut self, sql: &str, params: Params) -> Result<u64>;
}

/// Opens sessions. One call is one dial; retrying is the manager's job.
pub trait Connector {
    type Connection: Session;

    fn connect(&self, config: &DbConfig) -> std::result::Result<Self::Connection, ConnectError>;
}

/// Whether the manager currently holds a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}
