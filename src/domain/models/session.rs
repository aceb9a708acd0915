//! Session records handed to persistence collaborators.
//!
//! The engine defines the shape of these records; where and how they are
//! stored is up to the `SessionRecorder` implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::completion::CompletionState;
use super::gamification::ChallengeKind;
use super::phase::Phase;
use super::task::{CompletionReason, TaskInstance, TaskStatus};

/// One entry in a session's exportable log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionRecord {
    /// A task instance changed status.
    TaskTransition {
        session_id: Uuid,
        instance_id: Uuid,
        definition_id: String,
        phase: Phase,
        from: TaskStatus,
        to: TaskStatus,
        turn: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<CompletionReason>,
        at: DateTime<Utc>,
    },
    /// Completion state after an update, or frozen at phase exit.
    CompletionSnapshot {
        session_id: Uuid,
        state: CompletionState,
        turn: u64,
        at: DateTime<Utc>,
    },
    /// The session moved to a later phase.
    PhaseChanged {
        session_id: Uuid,
        from: Phase,
        to: Phase,
        turn: u64,
        at: DateTime<Utc>,
    },
    /// A gamified challenge was issued.
    ChallengeIssued {
        session_id: Uuid,
        kind: ChallengeKind,
        turn: u64,
        at: DateTime<Utc>,
    },
}

impl SessionRecord {
    /// Record a status change of `instance`, whose status is the new one.
    pub fn task_transition(
        session_id: Uuid,
        instance: &TaskInstance,
        from: TaskStatus,
        turn: u64,
    ) -> Self {
        Self::TaskTransition {
            session_id,
            instance_id: instance.id,
            definition_id: instance.definition_id.clone(),
            phase: instance.phase,
            from,
            to: instance.status,
            turn,
            reason: instance.completion_reason.clone(),
            at: Utc::now(),
        }
    }

    pub fn completion_snapshot(session_id: Uuid, state: &CompletionState, turn: u64) -> Self {
        Self::CompletionSnapshot {
            session_id,
            state: state.clone(),
            turn,
            at: Utc::now(),
        }
    }

    pub fn phase_changed(session_id: Uuid, from: Phase, to: Phase, turn: u64) -> Self {
        Self::PhaseChanged {
            session_id,
            from,
            to,
            turn,
            at: Utc::now(),
        }
    }

    pub fn challenge_issued(session_id: Uuid, kind: ChallengeKind, turn: u64) -> Self {
        Self::ChallengeIssued {
            session_id,
            kind,
            turn,
            at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        match self {
            Self::TaskTransition { session_id, .. }
            | Self::CompletionSnapshot { session_id, .. }
            | Self::PhaseChanged { session_id, .. }
            | Self::ChallengeIssued { session_id, .. } => *session_id,
        }
    }

    pub fn turn(&self) -> u64 {
        match self {
            Self::TaskTransition { turn, .. }
            | Self::CompletionSnapshot { turn, .. }
            | Self::PhaseChanged { turn, .. }
            | Self::ChallengeIssued { turn, .. } => *turn,
        }
    }
}
