//! Configuration management following 12-factor app principles
//!
//! Services describe their settings as a `Deserialize` struct; this module
//! fills it from the process environment, optionally seeded from the file
//! named by `ENV_FILE`.

use std::env;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Variable naming an optional env file loaded before the environment is read
pub const ENV_FILE_VAR: &str = "ENV_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to process env variables: {0}")]
    Parse(#[from] config::ConfigError),
}

/// Load `T` from environment variables.
///
/// Variable names map to fields case-insensitively (`DATABASE_URL` fills
/// `database_url`). Each value is converted to the type of the field it
/// fills, so a `String` field keeps `007` verbatim while a `u16` field parses
/// it. Variables already present in the process win over the env file.
pub fn load<T: DeserializeOwned>() -> Result<T, ConfigError> {
    load_from(config::Environment::default())
}

/// Like [`load`], but only variables starting with `{prefix}_` are read and
/// the prefix is stripped (`APP_PORT` fills `port` for prefix `APP`).
pub fn load_with_prefix<T: DeserializeOwned>(prefix: &str) -> Result<T, ConfigError> {
    load_from(config::Environment::with_prefix(prefix))
}

fn load_from<T: DeserializeOwned>(source: config::Environment) -> Result<T, ConfigError> {
    load_env_file()?;

    let cfg = config::Config::builder()
        .add_source(source)
        .build()?
        .try_deserialize()?;

    Ok(cfg)
}

fn load_env_file() -> Result<(), ConfigError> {
    let path = match env::var_os(ENV_FILE_VAR) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => return Ok(()),
    };

    dotenvy::from_path(&path).map_err(|source| ConfigError::EnvFile {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "Loaded env file");
    Ok(())
}
