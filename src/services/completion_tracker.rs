//! Completion tracking for the active phase.
//!
//! Completion is a blend of checkpoint coverage (completed steps over the
//! phase's required steps) and the running average quality of scored
//! interactions. Within a phase the stored percent never goes down; leaving a
//! phase freezes its state and starts the next phase at zero.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::error::{EngineError, EngineResult};
use crate::domain::models::{CompletionState, CompletionWeights, Phase, PhaseReset, StepResult};

/// Derives completion percent from accumulated evidence.
#[derive(Debug, Clone)]
pub struct CompletionTracker {
    weights: CompletionWeights,
    active: Phase,
    states: BTreeMap<Phase, CompletionState>,
}

impl CompletionTracker {
    pub fn new(initial: Phase, weights: CompletionWeights) -> Self {
        let mut states = BTreeMap::new();
        states.insert(initial, CompletionState::new(initial));
        Self {
            weights,
            active: initial,
            states,
        }
    }

    pub fn active_phase(&self) -> Phase {
        self.active
    }

    /// State of the active phase.
    pub fn current(&self) -> &CompletionState {
        // The active phase is inserted on construction and on every phase entry.
        &self.states[&self.active]
    }

    /// State of any phase that has been entered, frozen or not.
    pub fn state(&self, phase: Phase) -> Option<&CompletionState> {
        self.states.get(&phase)
    }

    /// Completion percent of a phase; 0 for phases not yet entered.
    pub fn completion_percent(&self, phase: Phase) -> f64 {
        self.states
            .get(&phase)
            .map_or(0.0, |state| state.completion_percent)
    }

    /// Fold one step result into the active phase's state.
    ///
    /// Fails without touching state when `phase` is not the active phase or the
    /// evidence is malformed.
    pub fn update(&mut self, phase: Phase, result: &StepResult) -> EngineResult<CompletionState> {
        if phase != self.active {
            return Err(EngineError::PhaseMismatch {
                active: self.active,
                requested: phase,
            });
        }
        validate_step(phase, result)?;

        let mut next = self.current().clone();
        if result.passed {
            if let Some(step) = &result.step {
                next.completed_steps.insert(step.clone());
            }
        }
        next.quality_sum += result.effective_quality();
        next.scored_count += 1;

        let computed = compute_percent(self.weights, &next);
        next.completion_percent = computed.max(next.completion_percent).clamp(0.0, 100.0);

        debug!(
            phase = %phase,
            completion = next.completion_percent,
            steps = next.completed_steps.len(),
            avg_quality = next.average_quality(),
            "Completion updated"
        );

        self.states.insert(phase, next.clone());
        Ok(next)
    }

    /// Freeze the active phase and start `next` at zero.
    pub fn enter_phase(&mut self, next: Phase) -> EngineResult<PhaseReset> {
        if !self.active.can_advance_to(next) {
            return Err(EngineError::InvalidPhaseTransition {
                from: self.active,
                to: next,
            });
        }

        let from = self.active;
        let mut frozen = self.current().clone();
        frozen.frozen = true;
        self.states.insert(from, frozen.clone());
        self.states.insert(next, CompletionState::new(next));
        self.active = next;

        Ok(PhaseReset {
            from,
            to: next,
            frozen,
        })
    }
}

fn validate_step(phase: Phase, result: &StepResult) -> EngineResult<()> {
    if let Some(quality) = result.quality {
        if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
            return Err(EngineError::InvalidStepResult(format!(
                "quality {quality} is outside [0, 1]"
            )));
        }
    }
    if let Some(step) = &result.step {
        if !phase.required_steps().contains(&step.as_str()) {
            return Err(EngineError::InvalidStepResult(format!(
                "step '{step}' is not a checkpoint of the {phase} phase"
            )));
        }
    }
    Ok(())
}

fn compute_percent(weights: CompletionWeights, state: &CompletionState) -> f64 {
    let blended =
        weights.step_weight * state.step_ratio() + weights.quality_weight * state.average_quality();
    (blended * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> CompletionTracker {
        CompletionTracker::new(Phase::Ideation, CompletionWeights::default())
    }

    #[test]
    fn test_starts_at_zero() {
        let tracker = tracker();
        assert_eq!(tracker.active_phase(), Phase::Ideation);
        assert!(tracker.completion_percent(Phase::Ideation).abs() < f64::EPSILON);
        assert!(tracker.completion_percent(Phase::Materialization).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blends_steps_and_quality() {
        let mut tracker = tracker();
        // 1 of 4 steps at quality 1.0: 0.7 * 0.25 + 0.3 * 1.0 = 0.475
        let state = tracker
            .update(Phase::Ideation, &StepResult::passed("site_analysis"))
            .unwrap();
        assert!((state.completion_percent - 47.5).abs() < 1e-9);
    }

    #[test]
    fn test_all_steps_at_full_quality_reaches_hundred() {
        let mut tracker = tracker();
        for step in Phase::Ideation.required_steps() {
            tracker
                .update(Phase::Ideation, &StepResult::passed(*step))
                .unwrap();
        }
        assert!((tracker.completion_percent(Phase::Ideation) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_never_decreases_within_phase() {
        let mut tracker = tracker();
        let first = tracker
            .update(Phase::Ideation, &StepResult::passed("site_analysis"))
            .unwrap()
            .completion_percent;
        // A poor exchange drags the average down but not the stored percent.
        let second = tracker
            .update(Phase::Ideation, &StepResult::exchange(0.0))
            .unwrap()
            .completion_percent;
        assert!(second >= first);
    }

    #[test]
    fn test_repeated_step_counts_once() {
        let mut tracker = tracker();
        tracker
            .update(Phase::Ideation, &StepResult::scored("site_analysis", true, 0.5))
            .unwrap();
        let state = tracker
            .update(Phase::Ideation, &StepResult::scored("site_analysis", true, 0.5))
            .unwrap();
        assert_eq!(state.completed_steps.len(), 1);
        assert_eq!(state.scored_count, 2);
    }

    #[test]
    fn test_rejects_wrong_phase() {
        let mut tracker = tracker();
        let err = tracker
            .update(Phase::Visualization, &StepResult::passed("spatial_layout"))
            .unwrap_err();
        assert!(matches!(err, EngineError::PhaseMismatch { .. }));
    }

    #[test]
    fn test_rejects_malformed_evidence_without_mutation() {
        let mut tracker = tracker();
        assert!(tracker
            .update(Phase::Ideation, &StepResult::exchange(f64::NAN))
            .is_err());
        assert!(tracker
            .update(Phase::Ideation, &StepResult::passed("massing_study"))
            .is_err());
        assert_eq!(tracker.current().scored_count, 0);
    }

    #[test]
    fn test_enter_phase_freezes_and_resets() {
        let mut tracker = tracker();
        tracker
            .update(Phase::Ideation, &StepResult::passed("site_analysis"))
            .unwrap();
        let reset = tracker.enter_phase(Phase::Visualization).unwrap();

        assert_eq!(reset.from, Phase::Ideation);
        assert!(reset.frozen.frozen);
        assert!((reset.frozen.completion_percent - 47.5).abs() < 1e-9);
        assert!(tracker.completion_percent(Phase::Visualization).abs() < f64::EPSILON);
        assert!((tracker.completion_percent(Phase::Ideation) - 47.5).abs() < 1e-9);
    }

    #[test]
    fn test_enter_phase_rejects_regression() {
        let mut tracker = tracker();
        tracker.enter_phase(Phase::Visualization).unwrap();
        assert!(tracker.enter_phase(Phase::Ideation).is_err());
        assert!(tracker.enter_phase(Phase::Visualization).is_err());
        assert_eq!(tracker.active_phase(), Phase::Visualization);
    }
}
