/// Session recorder port (trait) for dependency injection.
///
/// Defines the contract for persisting the engine's session records.
/// Services depend on this trait, not concrete implementations.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::EngineResult;
use crate::domain::models::SessionRecord;

/// Sink for task transitions and completion snapshots.
///
/// Implementations should handle:
/// - Preserving record order within a session
/// - Concurrent calls from independent sessions
#[async_trait]
pub trait SessionRecorder: Send + Sync {
    /// Appends records in the order given
    ///
    /// # Errors
    /// Returns error if the underlying store cannot be written. The engine's
    /// state is unaffected either way.
    async fn record(&self, records: &[SessionRecord]) -> EngineResult<()>;

    /// Returns every record stored for a session, oldest first
    async fn records_for(&self, session_id: Uuid) -> EngineResult<Vec<SessionRecord>>;
}
