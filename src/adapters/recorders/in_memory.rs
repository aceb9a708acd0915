use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::error::EngineResult;
use crate::domain::models::SessionRecord;
use crate::domain::ports::SessionRecorder;

/// Keeps every record in memory, in arrival order.
#[derive(Debug, Default)]
pub struct InMemorySessionRecorder {
    records: RwLock<Vec<SessionRecord>>,
}

impl InMemorySessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record across all sessions.
    pub async fn all(&self) -> Vec<SessionRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionRecorder for InMemorySessionRecorder {
    async fn record(&self, records: &[SessionRecord]) -> EngineResult<()> {
        self.records.write().await.extend_from_slice(records);
        Ok(())
    }

    async fn records_for(&self, session_id: Uuid) -> EngineResult<Vec<SessionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.session_id() == session_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ChallengeKind, Phase};

    #[tokio::test]
    async fn test_records_are_filtered_by_session() {
        let recorder = InMemorySessionRecorder::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        recorder
            .record(&[
                SessionRecord::phase_changed(a, Phase::Ideation, Phase::Visualization, 4),
                SessionRecord::challenge_issued(b, ChallengeKind::RolePlay, 1),
                SessionRecord::challenge_issued(a, ChallengeKind::Transformation, 5),
            ])
            .await
            .unwrap();

        let for_a = recorder.records_for(a).await.unwrap();
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].turn(), 4);
        assert_eq!(for_a[1].turn(), 5);
        assert_eq!(recorder.len().await, 3);
    }
}
