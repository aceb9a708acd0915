//! Completion evidence and per-phase completion state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Evidence of one completed or scored interaction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Checkpoint step this evidence is for. `None` for a scored exchange
    /// that is not tied to a checkpoint.
    #[serde(default)]
    pub step: Option<String>,
    /// Whether the step was passed.
    #[serde(default)]
    pub passed: bool,
    /// Quality score in `[0, 1]`. Falls back to 1.0/0.0 from `passed`.
    #[serde(default)]
    pub quality: Option<f64>,
}

impl StepResult {
    /// A passed checkpoint step.
    pub fn passed(step: impl Into<String>) -> Self {
        Self {
            step: Some(step.into()),
            passed: true,
            quality: None,
        }
    }

    /// A checkpoint step with an explicit quality score.
    pub fn scored(step: impl Into<String>, passed: bool, quality: f64) -> Self {
        Self {
            step: Some(step.into()),
            passed,
            quality: Some(quality),
        }
    }

    /// A scored exchange not tied to a checkpoint.
    pub fn exchange(quality: f64) -> Self {
        Self {
            step: None,
            passed: quality >= 0.5,
            quality: Some(quality),
        }
    }

    /// Quality used for the running average.
    pub fn effective_quality(&self) -> f64 {
        self.quality
            .unwrap_or(if self.passed { 1.0 } else { 0.0 })
    }
}

/// Accumulated completion evidence for one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionState {
    pub phase: Phase,
    pub completed_steps: BTreeSet<String>,
    pub quality_sum: f64,
    pub scored_count: u32,
    pub completion_percent: f64,
    /// Set once the phase has been left; a frozen state never changes again.
    #[serde(default)]
    pub frozen: bool,
}

impl CompletionState {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            completed_steps: BTreeSet::new(),
            quality_sum: 0.0,
            scored_count: 0,
            completion_percent: 0.0,
            frozen: false,
        }
    }

    /// Running average quality, 0 before any scored interaction.
    pub fn average_quality(&self) -> f64 {
        if self.scored_count == 0 {
            0.0
        } else {
            self.quality_sum / f64::from(self.scored_count)
        }
    }

    /// Fraction of the phase's required steps completed so far.
    pub fn step_ratio(&self) -> f64 {
        let total = self.phase.required_steps().len();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.completed_steps.len() as f64 / total as f64;
        ratio.min(1.0)
    }
}

/// Emitted when a phase is left and the tracker resets for the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReset {
    pub from: Phase,
    pub to: Phase,
    /// The left phase's state, frozen for history and export.
    pub frozen: CompletionState,
}
