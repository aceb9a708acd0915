use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid completion weights: step {0} + quality {1} must be non-negative and sum to 1")]
    InvalidCompletionWeights(f64, f64),

    #[error("Invalid late_trigger_threshold: {0}. Must be between 0 and 100")]
    InvalidLateTriggerThreshold(f64),

    #[error("Invalid history_window: {0}. Must be at least 1")]
    InvalidHistoryWindow(usize),

    #[error("Invalid cooldown_turns: {0}. Must be at least 1")]
    InvalidCooldownTurns(u64),

    #[error(
        "Invalid gamification window: window_size ({0}) must be at least cooldown_turns ({1})"
    )]
    InvalidWindowSize(usize, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .atelier/config.yaml (project config)
    /// 3. .atelier/local.yaml (local overrides, optional)
    /// 4. Environment variables (ATELIER_* prefix, `__` separates nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".atelier/config.yaml"))
            .merge(Yaml::file(".atelier/local.yaml"))
            .merge(Env::prefixed("ATELIER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("ATELIER_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let engine = &config.engine;

        let weights = engine.completion;
        if weights.step_weight < 0.0
            || weights.quality_weight < 0.0
            || (weights.step_weight + weights.quality_weight - 1.0).abs() > WEIGHT_TOLERANCE
        {
            return Err(ConfigError::InvalidCompletionWeights(
                weights.step_weight,
                weights.quality_weight,
            ));
        }

        if !(0.0..=100.0).contains(&engine.late_trigger_threshold) {
            return Err(ConfigError::InvalidLateTriggerThreshold(
                engine.late_trigger_threshold,
            ));
        }

        if engine.history_window == 0 {
            return Err(ConfigError::InvalidHistoryWindow(engine.history_window));
        }

        let gamification = engine.gamification;
        if gamification.cooldown_turns == 0 {
            return Err(ConfigError::InvalidCooldownTurns(gamification.cooldown_turns));
        }
        // A smaller log could evict a challenge that is still cooling down.
        if (gamification.window_size as u64) < gamification.cooldown_turns {
            return Err(ConfigError::InvalidWindowSize(
                gamification.window_size,
                gamification.cooldown_turns,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
