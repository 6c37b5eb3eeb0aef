//! Tests for the connection manager, driven by in-memory doubles.

use std::num::NonZeroU32;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use super::{ConnectionManager, ConnectionState, RetryPolicy};
use crate::testing::{self, FakeConnector, SharedProbe};
use crate::{ConnectError, DbConfig, Error};

fn config_with_attempts(attempts: u32, delay: u32) -> DbConfig {
    DbConfig::builder()
        .host("db")
        .user("a")
        .password("b")
        .database("classicmodels")
        .attempts(NonZeroU32::new(attempts).unwrap())
        .delay(delay)
        .build()
        .unwrap()
}

fn manager(
    probe: &SharedProbe,
    connector: FakeConnector,
    config: DbConfig,
) -> ConnectionManager<FakeConnector> {
    ConnectionManager::with_connector(config, connector)
        .with_sleeper(testing::recording_sleeper(probe))
}

fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_secs).collect()
}

#[test]
fn test_always_failing_makes_exactly_n_attempts() {
    for attempts in 1..=5 {
        let probe = testing::probe();
        let mut manager = manager(
            &probe,
            FakeConnector::always_failing(&probe),
            config_with_attempts(attempts, 2),
        );

        let err = manager.connect().unwrap_err();
        assert!(err.is_connect_failed());

        let observed = probe.lock();
        assert_eq!(observed.dials, attempts);
        let expected: Vec<Duration> = (1..attempts)
            .map(|i| Duration::from_secs(2u64.pow(i)))
            .collect();
        assert_eq!(observed.sleeps, expected);
    }
}

#[test]
fn test_total_sleep_matches_policy() {
    let probe = testing::probe();
    let config = config_with_attempts(4, 3);
    let expected_total = config.retry().total_backoff();
    let mut manager = manager(&probe, FakeConnector::always_failing(&probe), config);

    manager.connect().unwrap_err();

    let slept: Duration = probe.lock().sleeps.iter().sum();
    assert_eq!(slept, expected_total);
    assert_eq!(slept, Duration::from_secs(3 + 9 + 27));
}

#[test]
fn test_single_attempt_never_sleeps() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::always_failing(&probe),
        config_with_attempts(1, 2),
    );

    let err = manager.connect().unwrap_err();

    assert!(matches!(err, Error::ConnectFailed { attempts: 1, .. }));
    assert_eq!(probe.lock().dials, 1);
    assert!(probe.lock().sleeps.is_empty());
}

#[test]
fn test_fail_twice_then_succeed() {
    let probe = testing::probe();
    let connector = FakeConnector::failing_first(
        &probe,
        vec![
            ConnectError::connectivity("timeout"),
            ConnectError::auth("Access denied"),
        ],
    );
    let mut manager = manager(&probe, connector, config_with_attempts(3, 2));

    assert!(manager.connect().is_ok());

    let observed = probe.lock();
    assert_eq!(observed.dials, 3);
    assert_eq!(observed.sleeps, secs(&[2, 4]));
    drop(observed);
    assert_eq!(manager.state(), ConnectionState::Connected);
}

#[test]
fn test_success_stops_further_attempts() {
    let probe = testing::probe();
    let connector =
        FakeConnector::failing_first(&probe, vec![ConnectError::connectivity("refused")]);
    let mut manager = manager(&probe, connector, config_with_attempts(5, 2));

    manager.connect().unwrap();

    assert_eq!(probe.lock().dials, 2);
    assert_eq!(probe.lock().sleeps, secs(&[2]));
}

#[test]
fn test_exhausted_connect_reports_last_classified_error() {
    let probe = testing::probe();
    let connector = FakeConnector::failing_first(
        &probe,
        vec![
            ConnectError::connectivity("timeout"),
            ConnectError::unknown_database("Unknown database 'classicmodels'"),
        ],
    );
    let mut manager = manager(&probe, connector, config_with_attempts(2, 2));

    let err = manager.connect().unwrap_err();

    assert!(
        err.connect_error()
            .is_some_and(ConnectError::is_unknown_database)
    );
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

#[test]
fn test_connect_again_after_exhaustion_resets_counter() {
    let probe = testing::probe();
    let connector = FakeConnector::failing_first(
        &probe,
        vec![
            ConnectError::connectivity("down"),
            ConnectError::connectivity("down"),
        ],
    );
    let mut manager = manager(&probe, connector, config_with_attempts(2, 2));

    assert!(manager.connect().is_err());
    assert!(manager.connect().is_ok());

    let observed = probe.lock();
    assert_eq!(observed.dials, 3);
    assert_eq!(observed.sleeps, secs(&[2]));
}

#[test]
fn test_get_connection_reuses_live_handle() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    manager.get_connection().unwrap();
    manager.get_connection().unwrap();

    assert_eq!(probe.lock().dials, 1);
    assert_eq!(probe.lock().pings, 1);
}

#[test]
fn test_get_connection_redials_stale_handle() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    manager.get_connection().unwrap();
    probe.lock().alive = false;
    manager.get_connection().unwrap();

    let observed = probe.lock();
    assert_eq!(observed.dials, 2);
    // the stale handle was released once the new one was open
    assert_eq!(observed.closes, 1);
}

#[test]
fn test_get_connection_propagates_exhaustion() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::always_failing(&probe),
        config_with_attempts(2, 2),
    );

    assert!(manager.get_connection().unwrap_err().is_connect_failed());
}

#[test]
fn test_connect_replaces_previous_handle() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    manager.connect().unwrap();
    manager.connect().unwrap();

    let observed = probe.lock();
    assert_eq!(observed.dials, 2);
    assert_eq!(observed.closes, 1);
}

#[test]
fn test_failed_reconnect_keeps_previous_handle() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(2, 2),
    );

    manager.connect().unwrap();
    probe.lock().refuse = true;

    assert!(manager.connect().unwrap_err().is_connect_failed());
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert!(manager.is_connected());

    let observed = probe.lock();
    assert_eq!(observed.dials, 3);
    assert_eq!(observed.closes, 0);
}

#[test]
fn test_failed_scoped_keeps_previous_handle() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(1, 2),
    );

    manager.connect().unwrap();
    probe.lock().refuse = true;

    assert!(manager.scoped().is_err());
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert_eq!(probe.lock().closes, 0);
}

#[test]
fn test_is_connected_without_handle() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    assert!(!manager.is_connected());
    assert_eq!(probe.lock().pings, 0);
}

#[test]
fn test_is_connected_fails_closed() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    manager.connect().unwrap();
    assert!(manager.is_connected());

    probe.lock().alive = false;
    assert!(!manager.is_connected());
}

#[test]
fn test_close_then_is_connected_is_false() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    manager.connect().unwrap();
    manager.close();

    assert!(!manager.is_connected());
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(probe.lock().closes, 1);
}

#[test]
fn test_double_close_is_noop() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    manager.connect().unwrap();
    manager.close();
    manager.close();

    assert_eq!(probe.lock().closes, 1);
}

#[test]
fn test_close_without_handle_is_noop() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    manager.close();
    assert_eq!(probe.lock().closes, 0);
}

#[test]
fn test_test_connection_leaves_managed_handle_alone() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    assert!(manager.test_connection());
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(probe.lock().closes, 1);

    manager.connect().unwrap();
    assert!(manager.test_connection());
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert_eq!(probe.lock().closes, 2);
}

#[test]
fn test_test_connection_does_not_retry() {
    let probe = testing::probe();
    let manager = manager(
        &probe,
        FakeConnector::always_failing(&probe),
        config_with_attempts(3, 2),
    );

    assert!(!manager.test_connection());
    assert_eq!(probe.lock().dials, 1);
    assert!(probe.lock().sleeps.is_empty());
}

#[test]
fn test_scoped_closes_on_normal_exit() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    {
        let mut scope = manager.scoped().unwrap();
        assert!(scope.is_connected());
        scope.connection().unwrap();
    }

    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(probe.lock().closes, 1);
}

#[test]
fn test_scoped_closes_and_propagates_error() {
    fn work(manager: &mut ConnectionManager<FakeConnector>) -> crate::Result<()> {
        let mut scope = manager.scoped()?;
        scope.get_connection()?;
        Err(Error::query("boom"))
    }

    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    let err = work(&mut manager).unwrap_err();

    assert!(err.is_query());
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(probe.lock().closes, 1);
}

#[test]
fn test_scoped_closes_on_panic() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _scope = manager.scoped().unwrap();
        panic!("work failed");
    }));

    assert!(result.is_err());
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(probe.lock().closes, 1);
}

#[test]
fn test_scoped_fails_when_connect_exhausts() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::always_failing(&probe),
        config_with_attempts(2, 2),
    );

    assert!(manager.scoped().unwrap_err().is_connect_failed());
    assert_eq!(probe.lock().closes, 0);
}

#[test]
fn test_with_connection_passes_result_through() {
    let probe = testing::probe();
    let mut manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(3, 2),
    );

    let inner: crate::Result<u32> = manager
        .with_connection(|_conn| Err(Error::query("statement failed")))
        .unwrap();

    assert!(inner.unwrap_err().is_query());
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(probe.lock().closes, 1);
}

#[test]
fn test_drop_releases_handle() {
    let probe = testing::probe();
    {
        let mut manager = manager(
            &probe,
            FakeConnector::new(&probe),
            config_with_attempts(3, 2),
        );
        manager.connect().unwrap();
    }
    assert_eq!(probe.lock().closes, 1);
}

#[test]
fn test_retry_policy_comes_from_config() {
    let probe = testing::probe();
    let manager = manager(
        &probe,
        FakeConnector::new(&probe),
        config_with_attempts(7, 5),
    );

    assert_eq!(
        *manager.retry_policy(),
        RetryPolicy::new(NonZeroU32::new(7).unwrap(), 5)
    );
}

#[test]
fn test_debug_hides_password() {
    let probe = testing::probe();
    let manager = manager(&probe, FakeConnector::new(&probe), testing::config());

    let debug = format!("{manager:?}");
    assert!(debug.contains("ConnectionManager"));
    assert!(!debug.contains("\"b\""));
}
