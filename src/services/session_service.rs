//! Multi-session service.
//!
//! Holds one isolated `PhaseTaskEngine` per session. Sessions share only the
//! immutable task catalog. Each session's engine sits behind its own mutex so
//! turns of one session never interleave, while different sessions proceed
//! independently. Session records are forwarded to the recorder port after
//! every call; recorder failures are logged and never touch engine state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::error::{EngineError, EngineResult};
use crate::domain::models::{EngineConfig, Phase, StepResult, TaskHistory, TaskInstance};
use crate::domain::ports::SessionRecorder;

use super::engine::{PhaseAdvance, PhaseTaskEngine, TurnOutcome};
use super::task_catalog::TaskCatalog;

type SessionHandle = Arc<Mutex<PhaseTaskEngine>>;

pub struct SessionService {
    catalog: Arc<TaskCatalog>,
    config: EngineConfig,
    recorder: Arc<dyn SessionRecorder>,
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionService {
    pub fn new(
        catalog: Arc<TaskCatalog>,
        config: EngineConfig,
        recorder: Arc<dyn SessionRecorder>,
    ) -> Self {
        Self {
            catalog,
            config,
            recorder,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    /// Start a session in the first phase and fire its entry task.
    pub async fn create_session(&self) -> (Uuid, Option<TaskInstance>) {
        let session_id = Uuid::new_v4();
        let mut engine = PhaseTaskEngine::new(session_id, self.catalog.clone(), &self.config);
        let entry = engine.begin();
        self.flush(&mut engine).await;

        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(Mutex::new(engine)));
        info!(%session_id, "Session created");
        (session_id, entry)
    }

    pub async fn on_turn(
        &self,
        session_id: Uuid,
        message: &str,
        scored_step: Option<StepResult>,
    ) -> EngineResult<TurnOutcome> {
        let handle = self.handle(session_id).await?;
        let mut engine = handle.lock().await;
        let outcome = engine.on_turn(message, scored_step.as_ref());
        self.flush(&mut engine).await;
        Ok(outcome)
    }

    pub async fn advance_phase(&self, session_id: Uuid, next: Phase) -> EngineResult<PhaseAdvance> {
        let handle = self.handle(session_id).await?;
        let mut engine = handle.lock().await;
        let advance = engine.advance_phase(next)?;
        self.flush(&mut engine).await;
        Ok(advance)
    }

    pub async fn complete_task(
        &self,
        session_id: Uuid,
        instance_id: Uuid,
    ) -> EngineResult<TaskInstance> {
        let handle = self.handle(session_id).await?;
        let mut engine = handle.lock().await;
        let done = engine.complete_task(instance_id)?;
        self.flush(&mut engine).await;
        Ok(done)
    }

    pub async fn set_gamification_allowed(&self, session_id: Uuid, allowed: bool) -> EngineResult<()> {
        let handle = self.handle(session_id).await?;
        handle.lock().await.set_gamification_allowed(allowed);
        Ok(())
    }

    pub async fn record_system_turn(&self, session_id: Uuid, text: &str) -> EngineResult<()> {
        let handle = self.handle(session_id).await?;
        handle.lock().await.record_system_turn(text);
        Ok(())
    }

    pub async fn active_task(&self, session_id: Uuid) -> EngineResult<Option<TaskInstance>> {
        let handle = self.handle(session_id).await?;
        let engine = handle.lock().await;
        Ok(engine.get_active_task().cloned())
    }

    pub async fn task_history(&self, session_id: Uuid) -> EngineResult<TaskHistory> {
        let handle = self.handle(session_id).await?;
        let engine = handle.lock().await;
        Ok(engine.get_task_history().clone())
    }

    pub async fn completion_percent(&self, session_id: Uuid, phase: Phase) -> EngineResult<f64> {
        let handle = self.handle(session_id).await?;
        let engine = handle.lock().await;
        Ok(engine.get_completion_percent(phase))
    }

    pub async fn current_phase(&self, session_id: Uuid) -> EngineResult<Phase> {
        let handle = self.handle(session_id).await?;
        let engine = handle.lock().await;
        Ok(engine.current_phase())
    }

    /// Tear a session down; its history goes with it.
    pub async fn close_session(&self, session_id: Uuid) -> EngineResult<()> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|_| info!(%session_id, "Session closed"))
            .ok_or(EngineError::SessionNotFound(session_id))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn handle(&self, session_id: Uuid) -> EngineResult<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(EngineError::SessionNotFound(session_id))
    }

    async fn flush(&self, engine: &mut PhaseTaskEngine) {
        let records = engine.drain_records();
        if records.is_empty() {
            return;
        }
        if let Err(err) = self.recorder.record(&records).await {
            warn!(
                session_id = %engine.session_id(),
                error = %err,
                dropped = records.len(),
                "Failed to record session records"
            );
        }
    }
}
