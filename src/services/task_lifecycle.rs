//! Task lifecycle management.
//!
//! Owns the session's `TaskHistory` and is the only writer to it. Guards
//! activation against duplicates and unmet prerequisites, and completes
//! instances explicitly or by auto-completion.

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::error::{EngineError, EngineResult};
use crate::domain::models::{CompletionReason, Phase, TaskDefinition, TaskHistory, TaskInstance};

#[derive(Debug, Clone, Default)]
pub struct TaskLifecycle {
    history: TaskHistory,
}

impl TaskLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &TaskHistory {
        &self.history
    }

    /// The most recently activated task that is still active.
    pub fn active_task(&self) -> Option<&TaskInstance> {
        self.history.latest_active()
    }

    /// Append a new active instance of `definition`.
    pub fn activate(&mut self, definition: &TaskDefinition, turn: u64) -> EngineResult<TaskInstance> {
        if definition.trigger_once && self.history.has_fired(&definition.id) {
            return Err(EngineError::DuplicateActivation {
                definition_id: definition.id.clone(),
            });
        }
        if !definition.trigger_once && self.history.active_instance(&definition.id).is_some() {
            return Err(EngineError::DuplicateActivation {
                definition_id: definition.id.clone(),
            });
        }

        let missing: Vec<String> = definition
            .prerequisites
            .iter()
            .filter(|p| !self.history.is_completed(p))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::PrerequisiteUnsatisfied {
                definition_id: definition.id.clone(),
                missing,
            });
        }

        let mut instance = TaskInstance::new(definition);
        instance.activate(turn)?;
        info!(
            definition_id = %definition.id,
            instance_id = %instance.id,
            turn,
            "Task activated"
        );
        self.history.push(instance.clone());
        Ok(instance)
    }

    /// Mark an active instance completed.
    pub fn complete(
        &mut self,
        instance_id: Uuid,
        reason: CompletionReason,
        turn: u64,
    ) -> EngineResult<TaskInstance> {
        let instance = self
            .history
            .get_mut(instance_id)
            .ok_or(EngineError::TaskNotFound(instance_id))?;
        instance.complete(turn, reason)?;
        debug!(
            definition_id = %instance.definition_id,
            instance_id = %instance.id,
            turn,
            reason = ?instance.completion_reason,
            "Task completed"
        );
        Ok(instance.clone())
    }

    /// Complete the active instance of a definition, if there is one.
    pub fn auto_complete(
        &mut self,
        definition_id: &str,
        reason: CompletionReason,
        turn: u64,
    ) -> EngineResult<Option<TaskInstance>> {
        let Some(active_id) = self.history.active_instance(definition_id).map(|i| i.id) else {
            return Ok(None);
        };
        self.complete(active_id, reason, turn).map(Some)
    }

    /// Complete every active instance owned by `phase`.
    pub fn complete_phase(
        &mut self,
        phase: Phase,
        reason: &CompletionReason,
        turn: u64,
    ) -> EngineResult<Vec<TaskInstance>> {
        let ids: Vec<Uuid> = self
            .history
            .active()
            .filter(|i| i.phase == phase)
            .map(|i| i.id)
            .collect();
        ids.into_iter()
            .map(|id| self.complete(id, reason.clone(), turn))
            .collect()
    }
}
