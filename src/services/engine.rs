//! Phase-task progression and response routing engine.
//!
//! One engine per session. Each learner message is one atomic turn:
//! completion update, task resolution and activation, intent classification,
//! then routing. Task progression is applied to a staged copy and committed
//! only on success, so a fault never leaves a half-applied resolution behind,
//! and routing always produces a response mode.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::EngineResult;
use crate::domain::models::{
    CompletionReason, CompletionState, ConversationTurn, EngineConfig, IntentSignal, Phase,
    PhaseReset, ResponseMode, RoutingDecision, SessionRecord, StepResult, TaskHistory,
    TaskInstance, TaskStatus,
};

use super::completion_tracker::CompletionTracker;
use super::gamification_controller::GamificationState;
use super::intent_classifier::IntentClassifier;
use super::response_router::{ResponseRouter, TaskContext};
use super::task_catalog::TaskCatalog;
use super::task_lifecycle::TaskLifecycle;
use super::trigger_resolver::TriggerResolver;

/// Everything a turn produced, for the presentation and generation layers.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub turn_index: u64,
    pub phase: Phase,
    pub completion_percent: f64,
    pub activated_task: Option<TaskInstance>,
    /// Whether the activation recovered a missed window.
    pub late_recovery: bool,
    /// Prerequisites auto-completed so the activation could happen.
    pub auto_completed: Vec<TaskInstance>,
    pub response_mode: ResponseMode,
    pub routing: RoutingDecision,
    pub intent_signal: IntentSignal,
    /// Local faults that were recovered from during this turn.
    pub faults: Vec<String>,
}

/// Result of moving to a later phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseAdvance {
    pub reset: PhaseReset,
    /// Tasks of the left phase closed by the advance.
    pub auto_completed: Vec<TaskInstance>,
    /// Phase-entry task fired by the resolution pass at 0%.
    pub activated_task: Option<TaskInstance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

#[derive(Debug, Default)]
struct Progress {
    activated: Option<TaskInstance>,
    late_recovery: bool,
    auto_completed: Vec<TaskInstance>,
}

/// Single-session state machine.
#[derive(Debug, Clone)]
pub struct PhaseTaskEngine {
    session_id: Uuid,
    resolver: TriggerResolver,
    classifier: IntentClassifier,
    router: ResponseRouter,
    tracker: CompletionTracker,
    lifecycle: TaskLifecycle,
    gamification: GamificationState,
    recent: VecDeque<ConversationTurn>,
    history_window: usize,
    turn: u64,
    records: Vec<SessionRecord>,
}

impl PhaseTaskEngine {
    pub fn new(session_id: Uuid, catalog: Arc<TaskCatalog>, config: &EngineConfig) -> Self {
        Self {
            session_id,
            resolver: TriggerResolver::new(catalog, config.late_trigger_threshold),
            classifier: IntentClassifier::new(config.history_window),
            router: ResponseRouter::new(),
            tracker: CompletionTracker::new(Phase::default(), config.completion),
            lifecycle: TaskLifecycle::new(),
            gamification: GamificationState::new(config.gamification),
            recent: VecDeque::with_capacity(config.history_window),
            history_window: config.history_window.max(1),
            turn: 0,
            records: Vec::new(),
        }
    }

    /// Replace the built-in phrase table.
    #[must_use]
    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn current_phase(&self) -> Phase {
        self.tracker.active_phase()
    }

    /// Index the next turn will get.
    pub fn turn_index(&self) -> u64 {
        self.turn
    }

    /// Run the entry resolution for the initial phase so its phase-entry task
    /// fires before the first message. Safe to call more than once.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn begin(&mut self) -> Option<TaskInstance> {
        match self.progress_tasks(self.turn) {
            Ok(progress) => progress.activated,
            Err(err) => {
                warn!(error = %err, "Entry task resolution failed");
                None
            }
        }
    }

    /// Process one learner message, optionally with evidence of a scored step.
    #[instrument(
        skip(self, message, scored_step),
        fields(session_id = %self.session_id, turn = self.turn, phase = %self.current_phase())
    )]
    pub fn on_turn(&mut self, message: &str, scored_step: Option<&StepResult>) -> TurnOutcome {
        let turn = self.turn;
        let phase = self.current_phase();
        let mut faults = Vec::new();

        if let Some(step) = scored_step {
            match self.tracker.update(phase, step) {
                Ok(state) => self
                    .records
                    .push(SessionRecord::completion_snapshot(self.session_id, &state, turn)),
                Err(err) => {
                    warn!(error = %err, "Completion update rejected");
                    faults.push(err.to_string());
                }
            }
        }

        let progress = self.progress_tasks(turn).unwrap_or_else(|err| {
            warn!(error = %err, "Task resolution failed; routing without activation");
            faults.push(err.to_string());
            Progress::default()
        });

        let history: Vec<ConversationTurn> = self.recent.iter().cloned().collect();
        let intent_signal = self.classifier.classify(message, &history);

        let active_definition = self
            .lifecycle
            .active_task()
            .and_then(|task| self.resolver.catalog().get(&task.definition_id));
        let context = TaskContext {
            turn_index: turn,
            active_task: active_definition,
            newly_activated: progress.activated.is_some(),
        };
        let routing = self
            .router
            .route(&intent_signal, &context, &self.gamification);

        self.push_turn(ConversationTurn::learner(message));
        if let Some(kind) = routing.mode.challenge_kind() {
            self.gamification.record(kind, turn);
            self.records
                .push(SessionRecord::challenge_issued(self.session_id, kind, turn));
            self.push_turn(ConversationTurn::system(kind.marker()));
        }

        info!(
            mode = %routing.mode,
            reason = %routing.reason,
            activated = progress.activated.as_ref().map(|t| t.definition_id.as_str()),
            "Turn routed"
        );

        self.turn += 1;

        TurnOutcome {
            turn_index: turn,
            phase,
            completion_percent: self.tracker.completion_percent(phase),
            activated_task: progress.activated,
            late_recovery: progress.late_recovery,
            auto_completed: progress.auto_completed,
            response_mode: routing.mode,
            routing,
            intent_signal,
            faults,
        }
    }

    /// Move to a later phase and fire its entry task.
    ///
    /// Fails without changing state when `next` is not after the current
    /// phase. A failed entry resolution does not undo the advance.
    #[instrument(skip(self), fields(session_id = %self.session_id, from = %self.current_phase()))]
    pub fn advance_phase(&mut self, next: Phase) -> EngineResult<PhaseAdvance> {
        let turn = self.turn;
        let from = self.current_phase();

        let mut tracker = self.tracker.clone();
        let reset = tracker.enter_phase(next)?;
        let mut lifecycle = self.lifecycle.clone();
        let closed =
            lifecycle.complete_phase(from, &CompletionReason::PhaseAdvanced { to: next }, turn)?;

        self.tracker = tracker;
        self.lifecycle = lifecycle;

        self.records.push(SessionRecord::completion_snapshot(
            self.session_id,
            &reset.frozen,
            turn,
        ));
        for instance in &closed {
            self.records.push(SessionRecord::task_transition(
                self.session_id,
                instance,
                TaskStatus::Active,
                turn,
            ));
        }
        self.records
            .push(SessionRecord::phase_changed(self.session_id, from, next, turn));
        info!(to = %next, frozen_percent = reset.frozen.completion_percent, "Phase advanced");

        let (activated_task, fault) = match self.progress_tasks(turn) {
            Ok(progress) => (progress.activated, None),
            Err(err) => {
                warn!(error = %err, "Entry task resolution failed after phase advance");
                (None, Some(err.to_string()))
            }
        };

        Ok(PhaseAdvance {
            reset,
            auto_completed: closed,
            activated_task,
            fault,
        })
    }

    /// Explicit learner completion of a task instance.
    pub fn complete_task(&mut self, instance_id: Uuid) -> EngineResult<TaskInstance> {
        let turn = self.turn;
        let done = self
            .lifecycle
            .complete(instance_id, CompletionReason::LearnerAction, turn)?;
        self.records.push(SessionRecord::task_transition(
            self.session_id,
            &done,
            TaskStatus::Active,
            turn,
        ));
        Ok(done)
    }

    /// Upstream policy switch for challenges.
    pub fn set_gamification_allowed(&mut self, allowed: bool) {
        self.gamification.gamification_allowed = allowed;
    }

    pub fn gamification(&self) -> &GamificationState {
        &self.gamification
    }

    /// Add a system-side turn (e.g. the generated reply) to the recent history.
    pub fn record_system_turn(&mut self, text: impl Into<String>) {
        self.push_turn(ConversationTurn::system(text));
    }

    pub fn recent_turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.recent.iter()
    }

    pub fn get_active_task(&self) -> Option<&TaskInstance> {
        self.lifecycle.active_task()
    }

    pub fn get_task_history(&self) -> &TaskHistory {
        self.lifecycle.history()
    }

    pub fn get_completion_percent(&self, phase: Phase) -> f64 {
        self.tracker.completion_percent(phase)
    }

    pub fn completion_state(&self, phase: Phase) -> Option<&CompletionState> {
        self.tracker.state(phase)
    }

    /// Hand over buffered session records, oldest first.
    pub fn drain_records(&mut self) -> Vec<SessionRecord> {
        std::mem::take(&mut self.records)
    }

    /// Auto-complete eligible prerequisites, then activate the resolved task,
    /// all on a staged lifecycle that is committed only if every step succeeds.
    fn progress_tasks(&mut self, turn: u64) -> EngineResult<Progress> {
        let phase = self.current_phase();
        let percent = self.tracker.completion_percent(phase);
        let mut staged = self.lifecycle.clone();
        let mut progress = Progress::default();

        if let Some(plan) = self
            .resolver
            .plan_auto_completion(phase, percent, staged.history())
        {
            for prerequisite in &plan.prerequisites {
                let reason = CompletionReason::SuccessorEligible {
                    successor: plan.successor.clone(),
                };
                if let Some(done) = staged.auto_complete(prerequisite, reason, turn)? {
                    progress.auto_completed.push(done);
                }
            }
        }

        if let Some(resolution) = self.resolver.resolve(phase, percent, staged.history()) {
            let instance = staged.activate(resolution.definition, turn)?;
            info!(
                definition_id = %instance.definition_id,
                completion = percent,
                late_recovery = resolution.late_recovery,
                "Task triggered"
            );
            progress.late_recovery = resolution.late_recovery;
            progress.activated = Some(instance);
        }

        self.lifecycle = staged;
        for instance in &progress.auto_completed {
            self.records.push(SessionRecord::task_transition(
                self.session_id,
                instance,
                TaskStatus::Active,
                turn,
            ));
        }
        if let Some(instance) = &progress.activated {
            self.records.push(SessionRecord::task_transition(
                self.session_id,
                instance,
                TaskStatus::Pending,
                turn,
            ));
        }
        Ok(progress)
    }

    fn push_turn(&mut self, turn: ConversationTurn) {
        if self.recent.len() == self.history_window {
            self.recent.pop_front();
        }
        self.recent.push_back(turn);
    }
}
