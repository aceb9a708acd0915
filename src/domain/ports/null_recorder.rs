//! Null session recorder implementation.
//!
//! Used when export is not needed but the type system
//! requires a SessionRecorder implementation.

use async_trait::async_trait;
use uuid::Uuid;

use super::SessionRecorder;
use crate::domain::error::EngineResult;
use crate::domain::models::SessionRecord;

/// A no-op recorder that stores nothing.
#[derive(Debug, Clone, Default)]
pub struct NullSessionRecorder;

impl NullSessionRecorder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionRecorder for NullSessionRecorder {
    async fn record(&self, _records: &[SessionRecord]) -> EngineResult<()> {
        Ok(())
    }

    async fn records_for(&self, _session_id: Uuid) -> EngineResult<Vec<SessionRecord>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ChallengeKind, SessionRecord};

    #[test]
    fn test_null_recorder_discards() {
        let recorder = NullSessionRecorder::new();
        let session = Uuid::new_v4();
        tokio_test::block_on(async {
            recorder
                .record(&[SessionRecord::challenge_issued(session, ChallengeKind::RolePlay, 0)])
                .await
                .unwrap();
            assert!(recorder.records_for(session).await.unwrap().is_empty());
        });
    }
}
