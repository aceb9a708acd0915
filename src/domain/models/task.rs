//! Task domain model.
//!
//! A `TaskDefinition` is a static catalog entry: the pedagogical activity, the
//! phase it belongs to, and the completion window in which it may fire.
//! A `TaskInstance` is one firing of a definition within a session, and the
//! `TaskHistory` is the append-only log of every instance the session has seen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::gamification::ChallengeKind;
use super::phase::Phase;
use crate::domain::error::{EngineError, EngineResult};

fn default_true() -> bool {
    true
}

/// Static, immutable description of a pedagogical task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Unique identifier, conventionally `<phase>.<name>`.
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// Phase that owns this task.
    pub phase: Phase,
    /// Lower bound of the trigger window (inclusive).
    pub min_percent: f64,
    /// Upper bound of the trigger window (inclusive).
    pub max_percent: f64,
    /// Definitions that must be completed before this one may fire.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Fire at most once per session.
    #[serde(default = "default_true")]
    pub trigger_once: bool,
    /// Challenge kind used when the task is delivered as a game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<ChallengeKind>,
}

impl TaskDefinition {
    /// Whether `percent` falls inside the trigger window.
    pub fn in_window(&self, percent: f64) -> bool {
        percent >= self.min_percent && percent <= self.max_percent
    }

    /// Whether completion has already passed the end of the window.
    pub fn overshot(&self, percent: f64) -> bool {
        percent > self.max_percent
    }

    /// Whether the windows of two definitions intersect.
    pub fn window_overlaps(&self, other: &Self) -> bool {
        self.min_percent <= other.max_percent && other.min_percent <= self.max_percent
    }
}

/// Lifecycle status of a task instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not yet handed to the learner
    Pending,
    /// Currently presented to the learner
    Active,
    /// Done; never reopened
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> &'static [TaskStatus] {
        match self {
            Self::Pending => &[Self::Active],
            Self::Active => &[Self::Completed],
            Self::Completed => &[],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a task instance was completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionReason {
    /// The learner (or the session controller on their behalf) finished it.
    LearnerAction,
    /// A successor became eligible, so this prerequisite is assumed satisfied.
    SuccessorEligible { successor: String },
    /// The session moved on to a later phase.
    PhaseAdvanced { to: Phase },
}

/// One firing of a task definition within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: Uuid,
    pub definition_id: String,
    pub phase: Phase,
    pub status: TaskStatus,
    pub activated_turn: Option<u64>,
    pub activated_at: Option<DateTime<Utc>>,
    pub completed_turn: Option<u64>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completion_reason: Option<CompletionReason>,
}

impl TaskInstance {
    /// Create a pending instance of `definition`.
    pub fn new(definition: &TaskDefinition) -> Self {
        Self {
            id: Uuid::new_v4(),
            definition_id: definition.id.clone(),
            phase: definition.phase,
            status: TaskStatus::Pending,
            activated_turn: None,
            activated_at: None,
            completed_turn: None,
            completed_at: None,
            completion_reason: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Pending -> Active.
    pub fn activate(&mut self, turn: u64) -> EngineResult<()> {
        self.transition_to(TaskStatus::Active)?;
        self.activated_turn = Some(turn);
        self.activated_at = Some(Utc::now());
        Ok(())
    }

    /// Active -> Completed.
    pub fn complete(&mut self, turn: u64, reason: CompletionReason) -> EngineResult<()> {
        self.transition_to(TaskStatus::Completed)?;
        self.completed_turn = Some(turn);
        self.completed_at = Some(Utc::now());
        self.completion_reason = Some(reason);
        Ok(())
    }

    fn transition_to(&mut self, next: TaskStatus) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Append-only log of task instances for a session.
///
/// The single source of truth for "has this task fired" and "is this
/// prerequisite satisfied". Instances are never removed; only their status
/// moves forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskHistory {
    instances: Vec<TaskInstance>,
}

impl TaskHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskInstance> {
        self.instances.iter()
    }

    pub fn as_slice(&self) -> &[TaskInstance] {
        &self.instances
    }

    pub fn get(&self, id: Uuid) -> Option<&TaskInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut TaskInstance> {
        self.instances.iter_mut().find(|i| i.id == id)
    }

    pub(crate) fn push(&mut self, instance: TaskInstance) {
        self.instances.push(instance);
    }

    /// Whether any instance of the definition exists, in any status.
    pub fn has_fired(&self, definition_id: &str) -> bool {
        self.instances.iter().any(|i| i.definition_id == definition_id)
    }

    /// Whether an instance of the definition has been completed.
    pub fn is_completed(&self, definition_id: &str) -> bool {
        self.instances
            .iter()
            .any(|i| i.definition_id == definition_id && i.is_completed())
    }

    /// The active instance of a definition, if one exists.
    pub fn active_instance(&self, definition_id: &str) -> Option<&TaskInstance> {
        self.instances
            .iter()
            .find(|i| i.definition_id == definition_id && i.is_active())
    }

    /// All currently active instances, oldest first.
    pub fn active(&self) -> impl Iterator<Item = &TaskInstance> {
        self.instances.iter().filter(|i| i.is_active())
    }

    /// The most recently activated instance that is still active.
    pub fn latest_active(&self) -> Option<&TaskInstance> {
        self.instances.iter().rev().find(|i| i.is_active())
    }
}
