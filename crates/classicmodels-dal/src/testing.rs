//! In-memory doubles for the connection seams.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use mysql::{Params, Row};
use parking_lot::Mutex;

use crate::client::{Connector, Session};
use crate::config::DbConfig;
use crate::{ConnectError, Error, Result};

/// Everything the doubles observed, shared between connector and sessions.
#[derive(Debug, Default)]
pub struct Probe {
    pub dials: u32,
    pub closes: u32,
    pub pings: u32,
    pub sleeps: Vec<Duration>,
    pub statements: Vec<(String, Params)>,
    pub commits: u32,
    /// Affected-row counts returned by committed statements.
    pub affected: Vec<u64>,
    pub rollbacks: u32,
    pub alive: bool,
    /// Connectors refuse every dial while set.
    pub refuse: bool,
}

pub type SharedProbe = Arc<Mutex<Probe>>;

pub fn probe() -> SharedProbe {
    Arc::new(Mutex::new(Probe {
        alive: true,
        ..Probe::default()
    }))
}

/// Sleeper that records instead of blocking.
pub fn recording_sleeper(probe: &SharedProbe) -> impl FnMut(Duration) + Send + 'static {
    let probe = Arc::clone(probe);
    move |wait| probe.lock().sleeps.push(wait)
}

pub fn config() -> DbConfig {
    DbConfig::builder()
        .host("db")
        .user("a")
        .password("b")
        .database("classicmodels")
        .build()
        .unwrap()
}

/// Connector that fails with the scripted errors, then succeeds.
#[derive(Debug)]
pub struct FakeConnector {
    probe: SharedProbe,
    failures: Mutex<VecDeque<ConnectError>>,
    always_fail: bool,
}

impl FakeConnector {
    pub fn new(probe: &SharedProbe) -> Self {
        Self {
            probe: Arc::clone(probe),
            failures: Mutex::new(VecDeque::new()),
            always_fail: false,
        }
    }

    pub fn failing_first(probe: &SharedProbe, failures: Vec<ConnectError>) -> Self {
        Self {
            failures: Mutex::new(failures.into()),
            ..Self::new(probe)
        }
    }

    pub fn always_failing(probe: &SharedProbe) -> Self {
        Self {
            always_fail: true,
            ..Self::new(probe)
        }
    }
}

impl Connector for FakeConnector {
    type Connection = FakeSession;

    fn connect(&self, _config: &DbConfig) -> std::result::Result<FakeSession, ConnectError> {
        self.probe.lock().dials += 1;

        if self.always_fail || self.probe.lock().refuse {
            return Err(ConnectError::connectivity("connection refused"));
        }
        if let Some(err) = self.failures.lock().pop_front() {
            return Err(err);
        }

        self.probe.lock().alive = true;
        Ok(FakeSession::new(&self.probe))
    }
}

/// Session that records statements and reads back no rows.
#[derive(Debug)]
pub struct FakeSession {
    probe: SharedProbe,
    affected_rows: u64,
    fail: Option<String>,
}

impl FakeSession {
    pub fn new(probe: &SharedProbe) -> Self {
        Self {
            probe: Arc::clone(probe),
            affected_rows: 1,
            fail: None,
        }
    }

    /// Statements report `affected` rows.
    pub fn affecting(mut self, affected: u64) -> Self {
        self.affected_rows = affected;
        self
    }

    /// Every statement fails with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail = Some(message.to_string());
        self
    }

    fn record(&self, sql: &str, params: Params) -> Result<()> {
        self.probe.lock().statements.push((sql.to_string(), params));
        match &self.fail {
            Some(message) => Err(Error::query(message.clone())),
            None => Ok(()),
        }
    }
}

impl Session for FakeSession {
    fn ping(&mut self) -> Result<()> {
        let mut probe = self.probe.lock();
        probe.pings += 1;
        if probe.alive {
            Ok(())
        } else {
            Err(Error::query("server has gone away"))
        }
    }

    fn fetch_all(&mut self, sql: &str, params: Params) -> Result<Vec<Row>> {
        self.record(sql, params)?;
        Ok(Vec::new())
    }

    fn fetch_one(&mut self, sql: &str, params: Params) -> Result<Option<Row>> {
        self.record(sql, params)?;
        Ok(None)
    }

    fn execute(&mut self, sql: &str, params: Params) -> Result<u64> {
        if let Err(err) = self.record(sql, params) {
            self.probe.lock().rollbacks += 1;
            return Err(err);
        }
        let mut probe = self.probe.lock();
        probe.commits += 1;
        probe.affected.push(self.affected_rows);
        Ok(self.affected_rows)
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.probe.lock().closes += 1;
    }
}
