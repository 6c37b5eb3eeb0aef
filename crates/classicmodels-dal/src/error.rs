//! Error types for the data-access layer.
//!
//! Two layers:
//! - [`ConnectError`]: a single failed dial, classified for diagnostics.
//! - [`Error`]: everything the crate surfaces to callers.

use thiserror::Error;

/// MySQL server error: access denied for user.
pub const ER_ACCESS_DENIED_ERROR: u16 = 1045;

/// MySQL server error: unknown database.
pub const ER_BAD_DB_ERROR: u16 = 1049;

/// Classified failure of a single connection attempt.
///
/// Follows the canonical error struct pattern: the kind stays private and
/// callers classify through the `is_xxx()` predicates. Classification only
/// changes the diagnostic, never the retry decision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct ConnectError {
    kind: ConnectErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
enum ConnectErrorKind {
    #[error("access denied: {0}")]
    Auth(String),

    #[error("unknown database: {0}")]
    UnknownDatabase(String),

    #[error("connectivity error: {0}")]
    Connectivity(String),
}

impl ConnectError {
    /// Wrong username or password.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: ConnectErrorKind::Auth(message.into()),
        }
    }

    /// The configured database does not exist on the server.
    #[must_use]
    pub fn unknown_database(message: impl Into<String>) -> Self {
        Self {
            kind: ConnectErrorKind::UnknownDatabase(message.into()),
        }
    }

    /// Network, timeout, I/O or any other driver-level failure.
    #[must_use]
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self {
            kind: ConnectErrorKind::Connectivity(message.into()),
        }
    }

    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self.kind, ConnectErrorKind::Auth(_))
    }

    #[must_use]
    pub const fn is_unknown_database(&self) -> bool {
        matches!(self.kind, ConnectErrorKind::UnknownDatabase(_))
    }

    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self.kind, ConnectErrorKind::Connectivity(_))
    }

    /// Short human-readable explanation of the failure class.
    #[must_use]
    pub const fn diagnostic(&self) -> &'static str {
        match self.kind {
            ConnectErrorKind::Auth(_) => "Access denied: wrong username or password",
            ConnectErrorKind::UnknownDatabase(_) => "Database does not exist",
            ConnectErrorKind::Connectivity(_) => "Connection error",
        }
    }

    /// Classify a driver error from the `mysql` crate.
    #[must_use]
    pub fn from_mysql(err: &mysql::Error) -> Self {
        match err {
            mysql::Error::MySqlError(server) if server.code == ER_ACCESS_DENIED_ERROR => {
                Self::auth(server.message.clone())
            }
            mysql::Error::MySqlError(server) if server.code == ER_BAD_DB_ERROR => {
                Self::unknown_database(server.message.clone())
            }
            other => Self::connectivity(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect after {attempts} attempt(s): {source}")]
    ConnectFailed {
        attempts: u32,
        #[source]
        source: ConnectError,
    },

    #[error("Database error: {0}")]
    Database(#[from] mysql::Error),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Unknown customer field: {0}")]
    UnknownField(String),

    #[error("Not connected")]
    NotConnected,
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    #[must_use]
    pub const fn is_connect_failed(&self) -> bool {
        matches!(self, Self::ConnectFailed { .. })
    }

    #[must_use]
    pub const fn is_database(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    #[must_use]
    pub const fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected)
    }

    /// The classified cause of an exhausted connect, if this is one.
    #[must_use]
    pub const fn connect_error(&self) -> Option<&ConnectError> {
        match self {
            Self::ConnectFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
