//! Environment variable loading for configuration

use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use super::builder::ConfigBuilder;
use crate::{Error, Result};

/// Environment variable names
pub mod vars {
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const DB_HOST: &str = "DB_HOST";
    pub const DB_PORT: &str = "DB_PORT";
    pub const DB_USER: &str = "DB_USER";
    pub const DB_PASSWORD: &str = "DB_PASSWORD";
    pub const DB_NAME: &str = "DB_NAME";
    pub const DB_CONNECT_ATTEMPTS: &str = "DB_CONNECT_ATTEMPTS";
    pub const DB_CONNECT_DELAY: &str = "DB_CONNECT_DELAY";
    pub const DB_CONNECT_TIMEOUT_SECS: &str = "DB_CONNECT_TIMEOUT_SECS";
    /// Read by the binary's logging setup, not by [`load_from_env`](super::load_from_env).
    pub const LOG_JSON: &str = "LOG_JSON";
}

/// Load configuration from the process environment
pub fn load_from_env(builder: ConfigBuilder) -> Result<ConfigBuilder> {
    load_from_lookup(builder, |key| env::var(key).ok())
}

/// Load configuration through an arbitrary key lookup.
///
/// `DATABASE_URL` is applied first so the individual `DB_*` keys override
/// its parts.
pub fn load_from_lookup<F>(mut builder: ConfigBuilder, lookup: F) -> Result<ConfigBuilder>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url_str) = lookup(vars::DATABASE_URL) {
        let url = Url::parse(&url_str)
            .map_err(|e| Error::config(format!("Invalid {}: {e}", vars::DATABASE_URL)))?;
        builder = builder.connection_url(&url)?;
    }

    if let Some(host) = lookup(vars::DB_HOST) {
        builder = builder.host(host);
    }

    if let Some(port) = lookup(vars::DB_PORT) {
        builder = builder.port(parse_var(vars::DB_PORT, &port)?);
    }

    if let Some(user) = lookup(vars::DB_USER) {
        builder = builder.user(user);
    }

    if let Some(password) = lookup(vars::DB_PASSWORD) {
        builder = builder.password(password);
    }

    if let Some(database) = lookup(vars::DB_NAME) {
        builder = builder.database(database);
    }

    if let Some(attempts) = lookup(vars::DB_CONNECT_ATTEMPTS) {
        let attempts: NonZeroU32 = parse_var(vars::DB_CONNECT_ATTEMPTS, &attempts)?;
        builder = builder.attempts(attempts);
    }

    if let Some(delay) = lookup(vars::DB_CONNECT_DELAY) {
        builder = builder.delay(parse_var(vars::DB_CONNECT_DELAY, &delay)?);
    }

    if let Some(secs) = lookup(vars::DB_CONNECT_TIMEOUT_SECS) {
        let secs: u64 = parse_var(vars::DB_CONNECT_TIMEOUT_SECS, &secs)?;
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }

    Ok(builder)
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("Invalid {name} '{value}': {e}")))
}
