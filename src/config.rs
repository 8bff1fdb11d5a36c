//! Application-level configuration loading, including the tracked team identity.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "VOLEYSTATS_BACK_CONFIG_PATH";
/// Display name used when the config file does not provide one.
const DEFAULT_TEAM_NAME: &str = "Reyes";
/// Capacity of the live SSE broadcast channel.
const DEFAULT_SSE_CAPACITY: usize = 16;
/// Number of serve target zones on the placement grid.
const DEFAULT_SERVE_ZONES: u8 = 6;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    team_name: String,
    sse_capacity: usize,
    serve_zones: u8,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        team = %app_config.team_name,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Display name of the tracked club team.
    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    /// Capacity of the live SSE broadcast channel.
    pub fn sse_capacity(&self) -> usize {
        self.sse_capacity
    }

    /// Number of serve target zones on the placement grid.
    pub fn serve_zones(&self) -> u8 {
        self.serve_zones
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            team_name: DEFAULT_TEAM_NAME.to_owned(),
            sse_capacity: DEFAULT_SSE_CAPACITY,
            serve_zones: DEFAULT_SERVE_ZONES,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    team_name: Option<String>,
    sse_capacity: Option<usize>,
    serve_zones: Option<u8>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            team_name: value.team_name.unwrap_or(defaults.team_name),
            sse_capacity: value.sse_capacity.unwrap_or(defaults.sse_capacity),
            serve_zones: value.serve_zones.unwrap_or(defaults.serve_zones),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
