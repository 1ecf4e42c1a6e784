//! CLI configuration.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. `<ADBOARD_HOME>/config.toml`
//! 3. `ADBOARD_API_URL` / `ADBOARD_TIMEOUT_SECS`
//! 4. Command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use adboard_client::{ClientConfig, DEFAULT_API_URL};
use adboard_common::{AppDirs, DEFAULT_TIMEOUT};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable overriding the API URL.
pub const API_URL_ENV: &str = "ADBOARD_API_URL";

/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "ADBOARD_TIMEOUT_SECS";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigToml {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ConfigToml {
    /// Read `path`. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Values taken from the environment.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let timeout_secs = match std::env::var(TIMEOUT_ENV) {
            Ok(value) if !value.trim().is_empty() => Some(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("{TIMEOUT_ENV} must be a number of seconds"))?,
            ),
            _ => None,
        };
        Ok(Self {
            api_url,
            timeout_secs,
        })
    }

    /// Overlay `other` on top of `self`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub dirs: AppDirs,
}

impl Config {
    /// Resolve the configuration stored under `dirs`, then apply the
    /// environment and `overrides`.
    pub fn load(dirs: AppDirs, overrides: ConfigToml) -> Result<Self> {
        let file = ConfigToml::load(&dirs.config_file())?;
        let resolved = file.merge(ConfigToml::from_env()?).merge(overrides);
        Self::resolve(dirs, resolved)
    }

    fn resolve(dirs: AppDirs, values: ConfigToml) -> Result<Self> {
        let api_url = values
            .api_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            bail!("API URL must start with http:// or https://, got '{api_url}'");
        }

        let timeout = match values.timeout_secs {
            Some(0) => bail!("timeout_secs must be greater than zero"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_url,
            timeout,
            dirs,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            timeout: self.timeout,
        }
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.dirs.credentials_file()
    }
}
