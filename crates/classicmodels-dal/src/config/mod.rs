//! Configuration management
//!
//! Supports configuration loading with precedence: env > .env file > TOML file > defaults

mod builder;
mod env;
mod file;

pub use builder::{ConfigBuilder, DbConfig};
pub use env::{load_from_env, load_from_lookup, vars};
pub use file::{find_config_file, load_from_file};

use crate::{Error, Result};

/// Load configuration with precedence: env > .env file > TOML file > defaults
pub fn load_config() -> Result<ConfigBuilder> {
    let mut builder = ConfigBuilder::new();

    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        builder = file::load_from_file(&path, builder)?;
    }

    load_dotenv()?;
    env::load_from_env(builder)
}

/// Load configuration from a specific file path
pub fn load_config_from_path(path: &std::path::Path) -> Result<ConfigBuilder> {
    let builder = file::load_from_file(path, ConfigBuilder::new())?;

    load_dotenv()?;
    env::load_from_env(builder)
}

/// Populate the process environment from a `.env` file, if there is one.
///
/// Variables already set in the environment win over the file.
fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(Error::config(format!("Failed to load .env file: {err}"))),
    }
}
