//! Scoped acquisition guard.

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::Connector;
use super::manager::ConnectionManager;
use crate::{Error, Result};

/// Closes the manager's connection when dropped.
///
/// Obtained from [`ConnectionManager::scoped`]. Dereferences to the manager,
/// so `get_connection`, `is_connected` and friends work through the guard.
/// The close runs on normal exit, on `?` early returns and during unwinding;
/// it never swallows the caller's error.
pub struct ScopedConnection<'a, C: Connector> {
    manager: &'a mut ConnectionManager<C>,
}

impl<'a, C: Connector> ScopedConnection<'a, C> {
    pub(super) const fn new(manager: &'a mut ConnectionManager<C>) -> Self {
        Self { manager }
    }

    /// The handle opened on entry, without a liveness probe.
    pub fn connection(&mut self) -> Result<&mut C::Connection> {
        self.manager.held_mut().ok_or(Error::NotConnected)
    }
}

impl<C: Connector> Deref for ScopedConnection<'_, C> {
    type Target = ConnectionManager<C>;

    fn deref(&self) -> &Self::Target {
        self.manager
    }
}

impl<C: Connector> DerefMut for ScopedConnection<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.manager
    }
}

impl<C: Connector> Drop for ScopedConnection<'_, C> {
    fn drop(&mut self) {
        self.manager.close();
    }
}

impl<C: Connector> fmt::Debug for ScopedConnection<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedConnection")
            .field("state", &self.manager.state())
            .finish()
    }
}
