//! MySQL implementation of the connection seams.

use mysql::prelude::Queryable;
use mysql::{Conn, Opts, OptsBuilder, Params, Row, TxOpts};

use super::{Connector, Session};
use crate::config::DbConfig;
use crate::{ConnectError, Result};

/// Dials MySQL with the synchronous `mysql` client.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

impl MySqlConnector {
    /// Driver options for `config`.
    #[must_use]
    pub fn opts(config: &DbConfig) -> Opts {
        OptsBuilder::new()
            .ip_or_hostname(Some(config.host()))
            .tcp_port(config.port())
            .user(Some(config.user()))
            .pass(Some(config.password()))
            .db_name(Some(config.database()))
            .tcp_connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .write_timeout(config.write_timeout())
            .into()
    }
}

impl Connector for MySqlConnector {
    type Connection = Conn;

    fn connect(&self, config: &DbConfig) -> std::result::Result<Conn, ConnectError> {
        Conn::new(Self::opts(config)).map_err(|err| ConnectError::from_mysql(&err))
    }
}

impl Session for Conn {
    /// COM_PING; runs no query.
    fn ping(&mut self) -> Result<()> {
        Conn::ping(self)?;
        Ok(())
    }

    fn fetch_all(&mut self, sql: &str, params: Params) -> Result<Vec<Row>> {
        Ok(self.exec::<Row, _, _>(sql, params)?)
    }

    fn fetch_one(&mut self, sql: &str, params: Params) -> Result<Option<Row>> {
        Ok(self.exec_first::<Row, _, _>(sql, params)?)
    }

    fn execute(&mut self, sql: &str, params: Params) -> Result<u64> {
        let mut tx = self.start_transaction(TxOpts::default())?;
        match tx.exec_drop(sql, params) {
            Ok(()) => {
                let affected = tx.affected_rows();
                tx.commit()?;
                Ok(affected)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err.into())
            }
        }
    }
}
