use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for Atelier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Optional YAML task catalog replacing the built-in table
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// Tuning constants for the phase-task engine.
///
/// The late-trigger threshold and cooldown length were tuned empirically;
/// they live here rather than in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Blend of step coverage and quality in the completion percent
    #[serde(default)]
    pub completion: CompletionWeights,

    /// Completion percent above which missed task windows are recovered
    #[serde(default = "default_late_trigger_threshold")]
    pub late_trigger_threshold: f64,

    /// Number of prior turns the intent classifier may look at
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Challenge frequency control
    #[serde(default)]
    pub gamification: GamificationConfig,
}

const fn default_late_trigger_threshold() -> f64 {
    80.0
}

const fn default_history_window() -> usize {
    6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completion: CompletionWeights::default(),
            late_trigger_threshold: default_late_trigger_threshold(),
            history_window: default_history_window(),
            gamification: GamificationConfig::default(),
        }
    }
}

/// Weights for the completion formula; must sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompletionWeights {
    #[serde(default = "default_step_weight")]
    pub step_weight: f64,

    #[serde(default = "default_quality_weight")]
    pub quality_weight: f64,
}

const fn default_step_weight() -> f64 {
    0.7
}

const fn default_quality_weight() -> f64 {
    0.3
}

impl Default for CompletionWeights {
    fn default() -> Self {
        Self {
            step_weight: default_step_weight(),
            quality_weight: default_quality_weight(),
        }
    }
}

/// Gamification policy and frequency limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GamificationConfig {
    /// Initial value of the per-session `gamification_allowed` flag
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minimum turn distance between two challenges of the same kind
    #[serde(default = "default_cooldown_turns")]
    pub cooldown_turns: u64,

    /// Number of issued challenges kept in the rolling log
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

const fn default_enabled() -> bool {
    true
}

const fn default_cooldown_turns() -> u64 {
    3
}

const fn default_window_size() -> usize {
    8
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            cooldown_turns: default_cooldown_turns(),
            window_size: default_window_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation for file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
