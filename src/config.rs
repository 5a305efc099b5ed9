//! Application-level configuration loading: playlist location, round timings and scoring.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BLIND_TEST_BACK_CONFIG_PATH";
/// Environment variable that overrides the configured playlist URI.
const PLAYLIST_URI_ENV: &str = "PLAYLIST_URI";

const DEFAULT_PLAYLIST_URI: &str = "https://api.deezer.com/playlist/7530596462/tracks";
const DEFAULT_ROUND_LIMIT: u32 = 10;
const DEFAULT_COLLECT_WINDOW_SECS: u64 = 30;
const DEFAULT_COOLDOWN_SECS: u64 = 10;
const DEFAULT_POINTS_PER_FIELD: u32 = 10;
const DEFAULT_DISCONNECT_GRACE_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// First page of the playlist to load.
    pub playlist_uri: String,
    /// Number of rounds in a session.
    pub round_limit: u32,
    /// How long guesses are accepted after a round starts.
    pub collect_window: Duration,
    /// Pause between a reveal and the next round.
    pub cooldown: Duration,
    /// Points awarded for each guessed field (title or artist).
    pub points_per_field: u32,
    /// How long a disconnected player keeps their seat.
    pub disconnect_grace: Duration,
    /// Origins allowed by CORS; empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        round_limit = app_config.round_limit,
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
        };

        if let Some(uri) = env::var(PLAYLIST_URI_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            config.playlist_uri = uri;
        }

        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    playlist_uri: String,
    round_limit: u32,
    collect_window_secs: u64,
    cooldown_secs: u64,
    points_per_field: u32,
    disconnect_grace_secs: u64,
    allowed_origins: Vec<String>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            playlist_uri: DEFAULT_PLAYLIST_URI.to_string(),
            round_limit: DEFAULT_ROUND_LIMIT,
            collect_window_secs: DEFAULT_COLLECT_WINDOW_SECS,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            points_per_field: DEFAULT_POINTS_PER_FIELD,
            disconnect_grace_secs: DEFAULT_DISCONNECT_GRACE_SECS,
            allowed_origins: Vec::new(),
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            playlist_uri: value.playlist_uri,
            // A session needs at least one round.
            round_limit: value.round_limit.max(1),
            collect_window: Duration::from_secs(value.collect_window_secs),
            cooldown: Duration::from_secs(value.cooldown_secs),
            points_per_field: value.points_per_field,
            disconnect_grace: Duration::from_secs(value.disconnect_grace_secs),
            allowed_origins: value.allowed_origins,
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
