//! Layered settings: built-in defaults, the user config file, an explicit
//! config file, then `SCHOOLDESK_*` environment variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";
const DEFAULT_CHECK_INTERVAL: &str = "15m";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Root of the REST API, with a trailing slash.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// How often to re-check token expiry, as a humantime string ("15m").
    pub check_interval: String,
}

impl SessionSettings {
    pub fn check_interval(&self) -> ConfigResult<Duration> {
        let interval = humantime::parse_duration(&self.check_interval).map_err(|e| {
            ConfigError::Duration {
                key: "session.check_interval",
                message: e.to_string(),
            }
        })?;
        if interval.is_zero() {
            return Err(ConfigError::Duration {
                key: "session.check_interval",
                message: "must be greater than zero".into(),
            });
        }
        Ok(interval)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. "info" or "schooldesk_core=debug".
    pub level: String,
}

impl Settings {
    /// ~/.config/schooldesk/config.toml
    pub fn config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("schooldesk");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from the user config file (if present), then `explicit`
    /// (which must exist when given), then the process environment.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let user_file = Self::config_path().ok();
        Self::build(user_file.as_deref(), explicit, None)
    }

    /// Like [`Settings::load`] with the file locations given explicitly.
    pub fn load_from(user_file: Option<&Path>, explicit: Option<&Path>) -> ConfigResult<Self> {
        Self::build(user_file, explicit, None)
    }

    fn build(
        user_file: Option<&Path>,
        explicit: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("session.check_interval", DEFAULT_CHECK_INTERVAL)?
            .set_default("logging.level", DEFAULT_LOG_LEVEL)?;

        if let Some(path) = user_file {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("SCHOOLDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }

    /// Write a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> ConfigResult<()> {
        let contents = format!(
            "\
# schooldesk configuration

[api]
# Root of the school API:
# base_url = \"{DEFAULT_BASE_URL}\"

[session]
# How often to check whether the session token has expired:
# check_interval = \"{DEFAULT_CHECK_INTERVAL}\"

[logging]
# Log filter (overridden by RUST_LOG):
# level = \"{DEFAULT_LOG_LEVEL}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;

        Ok(())
    }
}
