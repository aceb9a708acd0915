use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::domain::error::{EngineError, EngineResult};
use crate::domain::models::SessionRecord;
use crate::domain::ports::SessionRecorder;

/// Appends records to a JSON Lines file, one record per line.
///
/// Writes are serialized through a lock so concurrent sessions never
/// interleave partial lines.
#[derive(Debug)]
pub struct JsonlSessionRecorder {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlSessionRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record in the file.
    pub async fn read_all(&self) -> EngineResult<Vec<SessionRecord>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    EngineError::Recorder(format!(
                        "{}:{}: {e}",
                        self.path.display(),
                        n + 1
                    ))
                })
            })
            .collect()
    }
}

#[async_trait]
impl SessionRecorder for JsonlSessionRecorder {
    async fn record(&self, records: &[SessionRecord]) -> EngineResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), count = records.len(), "Session records appended");
        Ok(())
    }

    async fn records_for(&self, session_id: Uuid) -> EngineResult<Vec<SessionRecord>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .filter(|r| r.session_id() == session_id)
            .collect())
    }
}
