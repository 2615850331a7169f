//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TILE_QUEST_CONFIG_PATH";

/// Credits granted to both balances when a membership is created.
const DEFAULT_STARTING_CREDITS: i64 = 50;
/// Interval between periodic leaderboard re-broadcasts.
const DEFAULT_LEADERBOARD_REFRESH_SECS: u64 = 3;
/// Capacity of each per-game broadcast channel.
const DEFAULT_ROOM_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Initial `credits` and `available_credits` for new memberships.
    pub starting_credits: i64,
    /// How often the refresher re-broadcasts the leaderboard to live rooms.
    pub leaderboard_refresh: Duration,
    /// Broadcast channel capacity for each game room.
    pub room_capacity: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration from file");
                    config
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
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            starting_credits: DEFAULT_STARTING_CREDITS,
            leaderboard_refresh: Duration::from_secs(DEFAULT_LEADERBOARD_REFRESH_SECS),
            room_capacity: DEFAULT_ROOM_CAPACITY,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    starting_credits: Option<i64>,
    #[serde(default)]
    leaderboard_refresh_secs: Option<u64>,
    #[serde(default)]
    room_capacity: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            starting_credits: value
                .starting_credits
                .filter(|credits| *credits >= 0)
                .unwrap_or(defaults.starting_credits),
            leaderboard_refresh: value
                .leaderboard_refresh_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.leaderboard_refresh),
            room_capacity: value
                .room_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.room_capacity),
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_fills_missing_fields_with_defaults() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.starting_credits, DEFAULT_STARTING_CREDITS);
        assert_eq!(
            config.leaderboard_refresh,
            Duration::from_secs(DEFAULT_LEADERBOARD_REFRESH_SECS)
        );
        assert_eq!(config.room_capacity, DEFAULT_ROOM_CAPACITY);
    }

    #[test]
    fn raw_config_rejects_nonsensical_values() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"starting_credits": -5, "leaderboard_refresh_secs": 0, "room_capacity": 0}"#,
        )
        .unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.starting_credits, DEFAULT_STARTING_CREDITS);
        assert_eq!(
            config.leaderboard_refresh,
            Duration::from_secs(DEFAULT_LEADERBOARD_REFRESH_SECS)
        );
        assert_eq!(config.room_capacity, DEFAULT_ROOM_CAPACITY);
    }

    #[test]
    fn raw_config_honours_explicit_values() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"starting_credits": 100, "leaderboard_refresh_secs": 10, "room_capacity": 64}"#,
        )
        .unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.starting_credits, 100);
        assert_eq!(config.leaderboard_refresh, Duration::from_secs(10));
        assert_eq!(config.room_capacity, 64);
    }
}
