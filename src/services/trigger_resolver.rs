//! Task trigger resolution.
//!
//! Given the active phase, its completion percent, and the session's task
//! history, selects at most one catalog definition to fire. Resolution is a
//! pure query; activation happens in the lifecycle manager.
//!
//! Selection order:
//! 1. definitions owned by the phase
//! 2. minus trigger-once definitions that already fired, and repeatable
//!    definitions that are still active
//! 3. minus definitions whose prerequisites are not all completed
//! 4. keep those whose window contains the percent
//! 5. if none remain, recover missed windows once completion is past the
//!    late-trigger threshold
//! 6. lowest `min_percent` wins, ties go to declaration order

use std::sync::Arc;

use crate::domain::models::{Phase, TaskDefinition, TaskHistory};

use super::task_catalog::TaskCatalog;

/// A definition selected to fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub definition: &'a TaskDefinition,
    /// Selected by late-trigger recovery rather than an in-window match.
    pub late_recovery: bool,
}

/// Prerequisites that should be auto-completed so `successor` can fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoCompletionPlan {
    pub successor: String,
    pub prerequisites: Vec<String>,
}

/// Selects the next task to activate.
#[derive(Debug, Clone)]
pub struct TriggerResolver {
    catalog: Arc<TaskCatalog>,
    late_trigger_threshold: f64,
}

impl TriggerResolver {
    pub fn new(catalog: Arc<TaskCatalog>, late_trigger_threshold: f64) -> Self {
        Self {
            catalog,
            late_trigger_threshold,
        }
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    /// Select at most one definition to fire.
    pub fn resolve(
        &self,
        phase: Phase,
        completion_percent: f64,
        history: &TaskHistory,
    ) -> Option<Resolution<'_>> {
        self.select(phase, completion_percent, history, |def| {
            def.prerequisites.iter().all(|p| history.is_completed(p))
        })
    }

    /// Find the definition that would fire if fired-but-still-active
    /// prerequisites counted as satisfied, and list those prerequisites.
    ///
    /// Returns `None` when nothing needs auto-completing.
    pub fn plan_auto_completion(
        &self,
        phase: Phase,
        completion_percent: f64,
        history: &TaskHistory,
    ) -> Option<AutoCompletionPlan> {
        let selected = self.select(phase, completion_percent, history, |def| {
            def.prerequisites.iter().all(|p| history.has_fired(p))
        })?;

        let prerequisites: Vec<String> = selected
            .definition
            .prerequisites
            .iter()
            .filter(|p| history.active_instance(p).is_some())
            .cloned()
            .collect();

        if prerequisites.is_empty() {
            return None;
        }

        Some(AutoCompletionPlan {
            successor: selected.definition.id.clone(),
            prerequisites,
        })
    }

    fn select<F>(
        &self,
        phase: Phase,
        percent: f64,
        history: &TaskHistory,
        prerequisites_met: F,
    ) -> Option<Resolution<'_>>
    where
        F: Fn(&TaskDefinition) -> bool,
    {
        let candidates: Vec<&TaskDefinition> = self
            .catalog
            .for_phase(phase)
            .filter(|def| !already_satisfied(*def, history))
            .filter(|def| prerequisites_met(*def))
            .collect();

        let in_window: Vec<&TaskDefinition> = candidates
            .iter()
            .copied()
            .filter(|def| def.in_window(percent))
            .collect();

        if !in_window.is_empty() {
            return self.earliest(in_window).map(|definition| Resolution {
                definition,
                late_recovery: false,
            });
        }

        if percent < self.late_trigger_threshold {
            return None;
        }

        // Only definitions that never fired are recoverable.
        let missed: Vec<&TaskDefinition> = candidates
            .into_iter()
            .filter(|def| def.overshot(percent) && !history.has_fired(&def.id))
            .collect();

        self.earliest(missed).map(|definition| Resolution {
            definition,
            late_recovery: true,
        })
    }

    fn earliest<'a>(&self, defs: Vec<&'a TaskDefinition>) -> Option<&'a TaskDefinition> {
        defs.into_iter().min_by(|a, b| {
            a.min_percent
                .total_cmp(&b.min_percent)
                .then_with(|| self.catalog.position(&a.id).cmp(&self.catalog.position(&b.id)))
        })
    }
}

fn already_satisfied(def: &TaskDefinition, history: &TaskHistory) -> bool {
    if def.trigger_once {
        history.has_fired(&def.id)
    } else {
        history.active_instance(&def.id).is_some()
    }
}
