//! Match configuration models.

use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, RwLock},
    time::Duration,
};
use thiserror::Error;

use crate::game::Phase;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is outside its allowed range
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: String, reason: String },

    /// Config file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only view of the match configuration.
///
/// The state machine reads every value afresh at each transition, so a
/// provider may change between matches but never mid-transition.
pub trait MatchSettings: Send + Sync {
    fn min_players(&self) -> usize;
    fn min_hiders(&self) -> usize;
    fn max_hiders(&self) -> usize;
    fn countdown_duration(&self) -> Duration;
    fn hiding_duration(&self) -> Duration;
    fn seeking_duration(&self) -> Duration;
    fn ending_grace_duration(&self) -> Duration;

    /// Seed for role assignment. `None` seeds from the OS.
    fn rng_seed(&self) -> Option<u64> {
        None
    }
}

/// Match configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Countdown before roles are assigned, in seconds (default: 10)
    pub countdown_secs: u64,

    /// Hiding phase length in seconds (default: 60)
    pub hide_secs: u64,

    /// Seeking phase length in seconds (default: 300)
    pub seek_secs: u64,

    /// Delay between the result and returning to waiting (default: 10)
    pub ending_grace_secs: u64,

    /// Participants needed before a match can start (default: 2)
    pub min_players: usize,

    /// Lower bound on hiders per match (default: 1)
    pub min_hiders: usize,

    /// Upper bound on hiders per match (default: 10)
    pub max_hiders: usize,

    /// Fixed seed for reproducible team assignment
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 10,
            hide_secs: 60,
            seek_secs: 300,
            ending_grace_secs: 10,
            min_players: 2,
            min_hiders: 1,
            max_hiders: 10,
            seed: None,
        }
    }
}

impl MatchConfig {
    pub const COUNTDOWN_RANGE: (u64, u64) = (3, 30);
    pub const HIDE_RANGE: (u64, u64) = (10, 600);
    pub const SEEK_RANGE: (u64, u64) = (30, 1200);
    pub const GRACE_RANGE: (u64, u64) = (1, 60);
    pub const PLAYERS_RANGE: (usize, usize) = (2, 100);
    pub const HIDERS_RANGE: (usize, usize) = (1, 50);

    /// Parse a JSON config file body and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("countdown_secs", self.countdown_secs, Self::COUNTDOWN_RANGE)?;
        check_range("hide_secs", self.hide_secs, Self::HIDE_RANGE)?;
        check_range("seek_secs", self.seek_secs, Self::SEEK_RANGE)?;
        check_range("ending_grace_secs", self.ending_grace_secs, Self::GRACE_RANGE)?;
        check_range("min_players", self.min_players, Self::PLAYERS_RANGE)?;
        check_range("min_hiders", self.min_hiders, Self::HIDERS_RANGE)?;
        check_range("max_hiders", self.max_hiders, Self::HIDERS_RANGE)?;

        if self.min_hiders > self.max_hiders {
            return Err(ConfigError::Invalid {
                field: "min_hiders".to_string(),
                reason: format!("Must not exceed max_hiders ({})", self.max_hiders),
            });
        }

        Ok(())
    }

    /// Change the length of a timed phase
    ///
    /// Only Starting, Hiding, Seeking and Ending have a duration. The value
    /// is range-checked against the same bounds as `validate`.
    pub fn set_phase_duration(&mut self, phase: Phase, secs: u64) -> Result<(), ConfigError> {
        let (field, range, slot) = match phase {
            Phase::Starting => ("countdown_secs", Self::COUNTDOWN_RANGE, &mut self.countdown_secs),
            Phase::Hiding => ("hide_secs", Self::HIDE_RANGE, &mut self.hide_secs),
            Phase::Seeking => ("seek_secs", Self::SEEK_RANGE, &mut self.seek_secs),
            Phase::Ending => ("ending_grace_secs", Self::GRACE_RANGE, &mut self.ending_grace_secs),
            Phase::Waiting => {
                return Err(ConfigError::Invalid {
                    field: "phase".to_string(),
                    reason: "The waiting phase is not timed".to_string(),
                });
            }
        };
        check_range(field, secs, range)?;
        *slot = secs;
        Ok(())
    }

    /// Duration of a timed phase, zero for `Waiting`
    pub fn phase_duration(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Waiting => Duration::ZERO,
            Phase::Starting => self.countdown_duration(),
            Phase::Hiding => self.hiding_duration(),
            Phase::Seeking => self.seeking_duration(),
            Phase::Ending => self.ending_grace_duration(),
        }
    }
}

impl MatchSettings for MatchConfig {
    fn min_players(&self) -> usize {
        self.min_players
    }

    fn min_hiders(&self) -> usize {
        self.min_hiders
    }

    fn max_hiders(&self) -> usize {
        self.max_hiders
    }

    fn countdown_duration(&self) -> Duration {
        Duration::from_secs(self.countdown_secs)
    }

    fn hiding_duration(&self) -> Duration {
        Duration::from_secs(self.hide_secs)
    }

    fn seeking_duration(&self) -> Duration {
        Duration::from_secs(self.seek_secs)
    }

    fn ending_grace_duration(&self) -> Duration {
        Duration::from_secs(self.ending_grace_secs)
    }

    fn rng_seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Settings that operators can retune while the match runs.
///
/// Clones share the same underlying config. Updates take effect at the next
/// phase transition.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<MatchConfig>>,
}

impl SharedSettings {
    /// Wrap a config after validating it
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(config)),
        })
    }

    /// Copy of the current config
    pub fn current(&self) -> MatchConfig {
        self.read(Clone::clone)
    }

    /// Change the length of a timed phase, see [`MatchConfig::set_phase_duration`]
    pub fn set_phase_duration(&self, phase: Phase, secs: u64) -> Result<(), ConfigError> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.set_phase_duration(phase, secs)?;
        log::info!("{phase} duration set to {secs}s");
        Ok(())
    }

    /// Change the hider bounds
    pub fn set_hider_range(&self, min_hiders: usize, max_hiders: usize) -> Result<(), ConfigError> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let mut candidate = guard.clone();
        candidate.min_hiders = min_hiders;
        candidate.max_hiders = max_hiders;
        candidate.validate()?;
        *guard = candidate;
        log::info!("Hider range set to {min_hiders}-{max_hiders}");
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&MatchConfig) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }
}

impl MatchSettings for SharedSettings {
    fn min_players(&self) -> usize {
        self.read(|c| c.min_players)
    }

    fn min_hiders(&self) -> usize {
        self.read(|c| c.min_hiders)
    }

    fn max_hiders(&self) -> usize {
        self.read(|c| c.max_hiders)
    }

    fn countdown_duration(&self) -> Duration {
        self.read(MatchConfig::countdown_duration)
    }

    fn hiding_duration(&self) -> Duration {
        self.read(MatchConfig::hiding_duration)
    }

    fn seeking_duration(&self) -> Duration {
        self.read(MatchConfig::seeking_duration)
    }

    fn ending_grace_duration(&self) -> Duration {
        self.read(MatchConfig::ending_grace_duration)
    }

    fn rng_seed(&self) -> Option<u64> {
        self.read(|c| c.seed)
    }
}

fn check_range<T>(field: &str, value: T, (min, max): (T, T)) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::Invalid {
            field: field.to_string(),
            reason: format!("Must be between {min} and {max}, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.countdown_duration(), Duration::from_secs(10));
        assert_eq!(config.hiding_duration(), Duration::from_secs(60));
        assert_eq!(config.seeking_duration(), Duration::from_secs(300));
        assert_eq!(config.ending_grace_duration(), Duration::from_secs(10));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = MatchConfig {
            hide_secs: 5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hide_secs"));

        let config = MatchConfig {
            min_players: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_inverted_hider_range() {
        let config = MatchConfig {
            min_hiders: 5,
            max_hiders: 3,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_hiders"));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = MatchConfig::from_json_str(r#"{ "seek_secs": 120, "seed": 7 }"#).unwrap();
        assert_eq!(config.seek_secs, 120);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.hide_secs, 60);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            MatchConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            MatchConfig::from_json_str(r#"{ "countdown_secs": 0 }"#),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_config_errors_name_the_problem() {
        let errors = [
            MatchConfig::from_json_str("{").unwrap_err(),
            MatchConfig::from_json_str(r#"{ "max_hiders": 0 }"#).unwrap_err(),
        ];
        for err in errors {
            let expected = match &err {
                ConfigError::Parse(_) => "Failed to parse",
                ConfigError::Invalid { .. } => "max_hiders",
            };
            assert!(err.to_string().contains(expected));
        }
    }

    #[test]
    fn test_set_phase_duration() {
        let mut config = MatchConfig::default();

        config.set_phase_duration(Phase::Hiding, 90).unwrap();
        assert_eq!(config.phase_duration(Phase::Hiding), Duration::from_secs(90));

        assert!(config.set_phase_duration(Phase::Seeking, 10).is_err());
        assert_eq!(config.seek_secs, 300);

        assert!(config.set_phase_duration(Phase::Waiting, 10).is_err());
        assert_eq!(config.phase_duration(Phase::Waiting), Duration::ZERO);
    }

    #[test]
    fn test_shared_settings_updates_are_visible_to_clones() {
        let settings = SharedSettings::new(MatchConfig::default()).unwrap();
        let view = settings.clone();

        settings.set_phase_duration(Phase::Starting, 5).unwrap();
        settings.set_hider_range(2, 4).unwrap();

        assert_eq!(view.countdown_duration(), Duration::from_secs(5));
        assert_eq!(view.min_hiders(), 2);
        assert_eq!(view.max_hiders(), 4);
    }

    #[test]
    fn test_shared_settings_rejects_invalid_update() {
        let settings = SharedSettings::new(MatchConfig::default()).unwrap();

        assert!(settings.set_hider_range(4, 2).is_err());
        assert_eq!(settings.current(), MatchConfig::default());

        assert!(SharedSettings::new(MatchConfig {
            seek_secs: 0,
            ..Default::default()
        })
        .is_err());
    }
}
