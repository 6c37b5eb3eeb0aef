//! TOML configuration file loading

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::builder::ConfigBuilder;
use crate::{Error, Result};

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./classicmodels.toml",
    "~/.config/classicmodels/config.toml",
    "/etc/classicmodels/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path, builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        Error::config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    apply_file_config(builder, file_config)
}

fn apply_file_config(mut builder: ConfigBuilder, config: FileConfig) -> Result<ConfigBuilder> {
    if let Some(conn) = config.connection {
        if let Some(url_str) = conn.url {
            let url = Url::parse(&url_str)
                .map_err(|e| Error::config(format!("Invalid connection URL: {e}")))?;
            builder = builder.connection_url(&url)?;
        }

        if let Some(host) = conn.host {
            builder = builder.host(host);
        }

        if let Some(port) = conn.port {
            builder = builder.port(port);
        }

        if let Some(user) = conn.user {
            builder = builder.user(user);
        }

        if let Some(password) = conn.password {
            builder = builder.password(password);
        }

        if let Some(database) = conn.database {
            builder = builder.database(database);
        }

        if let Some(secs) = conn.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        if let Some(secs) = conn.read_timeout_secs {
            builder = builder.read_timeout(Duration::from_secs(secs));
        }

        if let Some(secs) = conn.write_timeout_secs {
            builder = builder.write_timeout(Duration::from_secs(secs));
        }
    }

    if let Some(retry) = config.retry {
        if let Some(attempts) = retry.attempts {
            let attempts = NonZeroU32::new(attempts)
                .ok_or_else(|| Error::config("retry.attempts must be at least 1"))?;
            builder = builder.attempts(attempts);
        }

        if let Some(delay) = retry.delay {
            builder = builder.delay(delay);
        }

        if let Some(ms) = retry.unit_ms {
            builder = builder.backoff_unit(Duration::from_millis(ms));
        }
    }

    Ok(builder)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    connection: Option<ConnectionSection>,
    retry: Option<RetrySection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConnectionSection {
    url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    write_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RetrySection {
    attempts: Option<u32>,
    delay: Option<u32>,
    unit_ms: Option<u64>,
}
