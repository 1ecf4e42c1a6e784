//! Application directories for adboard.
//!
//! Defaults to `~/.adboard`. Can be overridden with the `ADBOARD_HOME`
//! environment variable; relative overrides are resolved against the current
//! directory.

use std::path::PathBuf;

/// Environment variable overriding the application home.
pub const HOME_ENV_VAR: &str = "ADBOARD_HOME";

/// Home directory name under the user's home.
pub const HOME_DIR_NAME: &str = ".adboard";

/// Application directories structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Root directory holding config and credentials.
    pub home: PathBuf,
}

impl AppDirs {
    /// Resolve application directories, respecting `ADBOARD_HOME`.
    pub fn new() -> Option<Self> {
        if let Ok(home) = std::env::var(HOME_ENV_VAR)
            && !home.is_empty()
        {
            let home = PathBuf::from(home);
            let home = if home.is_relative() {
                std::env::current_dir().ok()?.join(home)
            } else {
                home
            };
            tracing::debug!(path = %home.display(), "Using ADBOARD_HOME");
            return Some(Self { home });
        }

        let home = dirs::home_dir()?.join(HOME_DIR_NAME);
        Some(Self { home })
    }

    /// Build directories rooted at an explicit path.
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Path of the configuration file (config.toml)
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Path of the credentials file
    pub fn credentials_file(&self) -> PathBuf {
        self.home.join("credentials.json")
    }

    /// Ensure the home directory exists, owner-only on Unix.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if !self.home.exists() {
            std::fs::create_dir_all(&self.home)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&self.home, std::fs::Permissions::from_mode(0o700))?;
            }
        }
        Ok(())
    }
}

/// Get the application home directory.
pub fn get_adboard_home() -> Option<PathBuf> {
    AppDirs::new().map(|dirs| dirs.home)
}
