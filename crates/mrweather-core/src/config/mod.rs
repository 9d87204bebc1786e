mod defaults;
mod providers;


pub use providers::*;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MrWeatherError;
use defaults::*;

/// Top-level Mr. Weather configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Mirror logs to `{data_dir}/logs/` with daily rotation.
    #[serde(default)]
    pub log_to_file: bool,
    /// Location assigned to users who never set one.
    #[serde(default = "default_location")]
    pub default_location: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            log_to_file: false,
            default_location: default_location(),
        }
    }
}

/// Store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Daily dispatch configuration -- the once-a-day digest for signed-up users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Time of day (UTC, `HH:MM`) at which the digest is sent.
    #[serde(default = "default_dispatch_time")]
    pub time: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_dispatch_time(),
        }
    }
}

impl DispatchConfig {
    /// Parse `time` into a UTC time of day.
    pub fn time_utc(&self) -> Result<NaiveTime, MrWeatherError> {
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M").map_err(|e| {
            MrWeatherError::Config(format!("invalid dispatch time '{}': {e}", self.time))
        })
    }
}

impl Config {
    /// Fill empty API keys from the environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a closure.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys: [(&str, &mut String); 3] = [
            ("WEATHER_API_KEY", &mut self.provider.weather.api_key),
            ("GEMINI_API_KEY", &mut self.provider.text.api_key),
            ("CAT_API_KEY", &mut self.provider.cat.api_key),
        ];
        for (var, slot) in keys {
            if slot.is_empty() {
                if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                    *slot = value;
                }
            }
        }
    }

    /// Directory for rotated log files.
    pub fn log_dir(&self) -> String {
        format!("{}/logs", shellexpand(&self.bot.data_dir))
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. Empty API keys are
/// filled from `WEATHER_API_KEY`, `GEMINI_API_KEY` and `CAT_API_KEY`.
pub fn load(path: &str) -> Result<Config, MrWeatherError> {
    let mut config = parse_file(Path::new(path))?;
    config.apply_env_overrides(|var| std::env::var(var).ok());
    config.dispatch.time_utc()?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<Config, MrWeatherError> {
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        MrWeatherError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;

    toml::from_str(&content)
        .map_err(|e| MrWeatherError::Config(format!("failed to parse config: {}", e)))
}
