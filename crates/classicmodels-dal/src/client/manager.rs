//! The retrying single-connection manager.

use std::fmt;
use std::time::Duration;

use super::driver::MySqlConnector;
use super::retry::RetryPolicy;
use super::scoped::ScopedConnection;
use super::{ConnectionState, Connector, Session};
use crate::config::DbConfig;
use crate::{Error, Result};

type Sleeper = Box<dyn FnMut(Duration) + Send>;

/// Owns at most one live connection and re-establishes it on demand.
///
/// Every method takes `&mut self`: a manager is meant to be used from one
/// thread at a time. Wrap it in a mutex to share it.
///
/// # Example
///
/// ```rust,ignore
/// use classicmodels_dal::{ConnectionManager, DbConfig};
///
/// let config = DbConfig::builder()
///     .host("db")
///     .user("a")
///     .password("b")
///     .database("classicmodels")
///     .build()?;
/// let mut manager = ConnectionManager::new(config);
/// let conn = manager.get_connection()?;
/// ```
pub struct ConnectionManager<C: Connector = MySqlConnector> {
    config: DbConfig,
    connector: C,
    connection: Option<C::Connection>,
    sleeper: Sleeper,
}

impl ConnectionManager<MySqlConnector> {
    /// Manager that dials MySQL.
    #[must_use]
    pub fn new(config: DbConfig) -> Self {
        Self::with_connector(config, MySqlConnector)
    }
}

impl<C: Connector> ConnectionManager<C> {
    #[must_use]
    pub fn with_connector(config: DbConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            connection: None,
            sleeper: Box::new(std::thread::sleep),
        }
    }

    /// Replace the function used to wait between attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl FnMut(Duration) + Send + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &DbConfig {
        &self.config
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        self.config.retry()
    }

    /// Held-handle state, without touching the network.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        if self.connection.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Open a new connection, retrying with exponential backoff.
    ///
    /// A held handle is only replaced once a new one is open; if every
    /// attempt fails it stays in place. After attempt `i` fails, the manager
    /// waits `unit × delay^i` before the next one; the final allowed attempt
    /// is not followed by a wait.
    pub fn connect(&mut self) -> Result<&mut C::Connection> {
        let policy = *self.config.retry();
        let max_attempts = policy.attempts().get();
        let mut attempt = 1;

        loop {
            match self.connector.connect(&self.config) {
                Ok(conn) => {
                    tracing::info!(
                        database = %self.config.database(),
                        host = %self.config.host(),
                        attempt,
                        "Successfully connected to database"
                    );
                    if self.connection.replace(conn).is_some() {
                        tracing::debug!("Released previous connection");
                    }
                    return self.connection.as_mut().ok_or(Error::NotConnected);
                }
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %err,
                        "{}",
                        err.diagnostic()
                    );

                    if attempt >= max_attempts {
                        tracing::error!(
                            database = %self.config.database(),
                            "Failed to connect after {max_attempts} attempt(s), giving up"
                        );
                        return Err(Error::ConnectFailed {
                            attempts: max_attempts,
                            source: err,
                        });
                    }

                    let backoff = policy.backoff(attempt);
                    tracing::info!(
                        "Retrying ({attempt}/{}) in {backoff:?}",
                        max_attempts - 1
                    );
                    (self.sleeper)(backoff);
                    attempt += 1;
                }
            }
        }
    }

    /// The held handle if it is still alive, otherwise a fresh one.
    pub fn get_connection(&mut self) -> Result<&mut C::Connection> {
        if self.is_connected() {
            return self.connection.as_mut().ok_or(Error::NotConnected);
        }

        if self.connection.is_some() {
            tracing::info!("Held connection failed its liveness check, reconnecting");
        }
        self.connect()
    }

    /// Probe the held handle. Never fails: any probe error means `false`.
    pub fn is_connected(&mut self) -> bool {
        let Some(conn) = self.connection.as_mut() else {
            return false;
        };

        match conn.ping() {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "Liveness check failed");
                false
            }
        }
    }

    /// Release the held handle. A no-op when nothing is held.
    pub fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            drop(conn);
            tracing::info!("Database connection closed");
        }
    }

    /// Validate the configuration with a throwaway connection.
    ///
    /// Dials once without retrying and never touches the managed handle.
    pub fn test_connection(&self) -> bool {
        match self.connector.connect(&self.config) {
            Ok(mut conn) => {
                let alive = conn.ping().is_ok();
                drop(conn);
                if alive {
                    tracing::info!("Connection test successful");
                } else {
                    tracing::warn!("Connection test failed: connection opened but did not respond");
                }
                alive
            }
            Err(err) => {
                tracing::warn!(error = %err, "Connection test failed: {}", err.diagnostic());
                false
            }
        }
    }

    /// Connect and return a guard that closes the connection when dropped.
    pub fn scoped(&mut self) -> Result<ScopedConnection<'_, C>> {
        self.connect()?;
        Ok(ScopedConnection::new(self))
    }

    /// Run `f` on a freshly connected handle and close it afterwards.
    ///
    /// The connection is closed whether `f` returns normally, returns an
    /// error or panics; `f`'s own result is passed through untouched.
    pub fn with_connection<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut C::Connection) -> T,
    {
        let mut scope = self.scoped()?;
        let conn = scope.connection()?;
        Ok(f(conn))
    }

    pub(super) fn held_mut(&mut self) -> Option<&mut C::Connection> {
        self.connection.as_mut()
    }
}

impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: Connector + fmt::Debug> fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("connector", &self.connector)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
