// Optional TOML settings file

use crate::error::{RenewError, RenewResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 2 * 60 * 60;
const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 120;

/// Tool settings that rarely change between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the vendor CLI and daemon binaries
    pub install_dir: Option<PathBuf>,
    /// OS service name of the scanner
    pub service_name: Option<String>,
    /// Upper bound for a single vendor command; `update --all` can be slow
    pub command_timeout_secs: u64,
    /// Upper bound for a single service-manager call
    pub service_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            install_dir: None,
            service_name: None,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            service_timeout_secs: DEFAULT_SERVICE_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn parse_toml(content: &str) -> RenewResult<Self> {
        let settings: Settings = toml::from_str(content).map_err(|e| {
            let line = e
                .span()
                .and_then(|span| content.get(..span.start))
                .map(|before| before.matches('\n').count() + 1);
            match line {
                Some(line) => RenewError::config(format!("Failed to parse TOML at line {}: {}", line, e.message())),
                None => RenewError::config(format!("Failed to parse TOML: {}", e.message())),
            }
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> RenewResult<()> {
        if self.command_timeout_secs == 0 {
            return Err(RenewError::config("command_timeout_secs must be greater than zero"));
        }
        if self.service_timeout_secs == 0 {
            return Err(RenewError::config("service_timeout_secs must be greater than zero"));
        }
        if let Some(ref name) = self.service_name {
            if name.trim().is_empty() {
                return Err(RenewError::config("service_name must not be empty"));
            }
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn service_timeout(&self) -> Duration {
        Duration::from_secs(self.service_timeout_secs)
    }
}

/// Per-user settings location, if the platform has one
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nessus-renew").join("config.toml"))
}

/// Load settings from an explicit path, the default location, or built-ins
///
/// An explicit path must exist. The default location is optional.
pub async fn load_settings(explicit: Option<&Path>) -> RenewResult<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_settings_path() {
            Some(path) if path.is_file() => path,
            _ => {
                log::debug!("No settings file found, using defaults");
                return Ok(Settings::default());
            }
        },
    };

    log::debug!("Loading settings from {}", path.display());
    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        RenewError::config(format!("Failed to read settings file {}: {}", path.display(), e))
    })?;

    Settings::parse_toml(&content)
}
