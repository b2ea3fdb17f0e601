//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use hide_seek::session::{ConfigError as MatchConfigError, MatchConfig};
use std::path::PathBuf;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Match rules and phase lengths
    pub game: MatchConfig,
    /// Where `game` was loaded from, if not the built-in defaults
    pub config_file: Option<PathBuf>,
    /// Synthetic player driver
    pub demo: DemoConfig,
}

/// Synthetic player driver configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoConfig {
    /// Participants to generate, zero disables the driver
    pub players: usize,
    /// Matches to play before exiting
    pub rounds: usize,
}

impl DemoConfig {
    pub fn is_enabled(&self) -> bool {
        self.players > 0 && self.rounds > 0
    }
}

/// Values given on the command line, which win over the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub demo_players: Option<usize>,
    pub demo_rounds: Option<usize>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args
    ///
    /// # Errors
    ///
    /// Returns error if the config file cannot be read or a value is invalid
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration with a custom variable source
    pub fn from_lookup<F>(overrides: CliOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_file = overrides
            .config_file
            .or_else(|| lookup("HNS_CONFIG_FILE").map(PathBuf::from));

        // File first, then individual variables on top
        let mut game = match &config_file {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                        path: path.clone(),
                        source,
                    })?;
                MatchConfig::from_json_str(&contents)?
            }
            None => MatchConfig::default(),
        };

        game.countdown_secs = parse_env_or(&lookup, "HNS_COUNTDOWN_SECS", game.countdown_secs);
        game.hide_secs = parse_env_or(&lookup, "HNS_HIDE_SECS", game.hide_secs);
        game.seek_secs = parse_env_or(&lookup, "HNS_SEEK_SECS", game.seek_secs);
        game.ending_grace_secs = parse_env_or(&lookup, "HNS_GRACE_SECS", game.ending_grace_secs);
        game.min_players = parse_env_or(&lookup, "HNS_MIN_PLAYERS", game.min_players);
        game.min_hiders = parse_env_or(&lookup, "HNS_MIN_HIDERS", game.min_hiders);
        game.max_hiders = parse_env_or(&lookup, "HNS_MAX_HIDERS", game.max_hiders);
        game.seed = overrides
            .seed
            .or_else(|| parse_env_opt(&lookup, "HNS_SEED"))
            .or(game.seed);

        let demo = DemoConfig {
            players: overrides
                .demo_players
                .unwrap_or_else(|| parse_env_or(&lookup, "HNS_DEMO_PLAYERS", 0)),
            rounds: overrides
                .demo_rounds
                .unwrap_or_else(|| parse_env_or(&lookup, "HNS_DEMO_ROUNDS", 1)),
        };

        Ok(ServerConfig {
            game,
            config_file,
            demo,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;

        if self.demo.is_enabled() && self.demo.players < self.game.min_players {
            return Err(ConfigError::Invalid {
                var: "HNS_DEMO_PLAYERS".to_string(),
                reason: format!(
                    "Must be at least the minimum players ({})",
                    self.game.min_players
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Match(#[from] MatchConfigError),
}

/// Helper to parse a variable with default fallback
fn parse_env_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparseable {key}={raw}");
            default
        }),
        None => default,
    }
}

/// Like `parse_env_or` for variables without a default
fn parse_env_opt<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparseable {key}={raw}");
            None
        }
    }
}
