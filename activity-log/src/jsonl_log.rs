//! File-backed activity log: one JSON object per line, append-only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::errors::activity_log_error::ActivityLogError;
use crate::store::{ActivityLog, index_events, sorted_users};
use crate::structs::activity_event::ActivityEvent;

/// JSONL log with an in-memory per-user index.
///
/// Writes hold the file mutex for the whole line and the index update, so
/// lines never interleave and the index order matches the file order.
#[derive(Debug)]
pub struct JsonlActivityLog {
    path: PathBuf,
    file: Mutex<LogFile>,
    by_user: RwLock<HashMap<u64, Vec<ActivityEvent>>>,
}

/// Append handle plus whether the file currently ends mid-line.
#[derive(Debug)]
struct LogFile {
    file: File,
    torn_tail: bool,
}

impl LogFile {
    /// Write one complete line. A failed write is cut back to the previous
    /// length; if that fails too, the next line starts on a fresh line.
    async fn append_line(&mut self, line: &[u8]) -> Result<(), ActivityLogError> {
        let len_before = self.file.metadata().await?.len();

        let result = async {
            if self.torn_tail {
                self.file.write_all(b"\n").await?;
            }
            self.file.write_all(line).await?;
            self.file.flush().await
        }
        .await;

        match result {
            Ok(()) => {
                self.torn_tail = false;
                Ok(())
            }
            Err(e) => {
                if let Err(trunc) = self.file.set_len(len_before).await {
                    warn!(
                        target: "activity_log::jsonl",
                        error = %trunc,
                        "could not roll back partial activity line"
                    );
                    self.torn_tail = true;
                }
                Err(e.into())
            }
        }
    }
}

impl JsonlActivityLog {
    /// Open (or create) the log at `path` and replay existing lines.
    ///
    /// # Errors
    /// I/O failures creating or reading the file. Malformed lines are
    /// skipped with a warning, not reported.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ActivityLogError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let existing = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut skipped = 0usize;
        let mut events = Vec::new();
        for (lineno, line) in existing.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ActivityEvent>(line) {
                Ok(ev) => events.push(ev),
                Err(e) => {
                    skipped += 1;
                    warn!(
                        target: "activity_log::jsonl",
                        line = lineno + 1,
                        error = %e,
                        "skipping malformed activity line"
                    );
                }
            }
        }

        let torn_tail = !existing.is_empty() && !existing.ends_with('\n');
        if torn_tail {
            warn!(
                target: "activity_log::jsonl",
                path = %path.display(),
                "activity log ends mid-line, next append starts a new line"
            );
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        info!(
            target: "activity_log::jsonl",
            path = %path.display(),
            events = events.len(),
            skipped,
            "activity log opened"
        );

        Ok(Self {
            path,
            file: Mutex::new(LogFile { file, torn_tail }),
            by_user: RwLock::new(index_events(events)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ActivityLog for JsonlActivityLog {
    async fn query(&self, user_id: u64) -> Result<Vec<ActivityEvent>, ActivityLogError> {
        Ok(self
            .by_user
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, event: ActivityEvent) -> Result<(), ActivityLogError> {
        event.validate()?;
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.append_line(&line).await?;

        self.by_user
            .write()
            .await
            .entry(event.user_id)
            .or_default()
            .push(event);
        Ok(())
    }

    async fn users(&self) -> Result<Vec<u64>, ActivityLogError> {
        Ok(sorted_users(&*self.by_user.read().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::activity_type::ActivityType;
    use std::sync::Arc;

    #[tokio::test]
    async fn appended_events_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("activity.jsonl");

        {
            let log = JsonlActivityLog::open(&path).await.unwrap();
            log.append(ActivityEvent::new(5, 1, ActivityType::View)).await.unwrap();
            log.append(ActivityEvent::new(5, 2, ActivityType::Favourite).with_quantity(2))
                .await
                .unwrap();
        }

        let reopened = JsonlActivityLog::open(&path).await.unwrap();
        let evs = reopened.query(5).await.unwrap();
        assert_eq!(evs.len(), 2);
        assert_eq!(evs[1].activity_type, ActivityType::Favourite);
        assert_eq!(evs[1].quantity, 2);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let good = serde_json::to_string(&ActivityEvent::new(1, 9, ActivityType::Select)).unwrap();
        std::fs::write(
            &path,
            format!("{good}\nnot json\n{{\"user_id\":1,\"product_id\":3,\"activity_type\":\"like\",\"timestamp\":\"2024-01-01T00:00:00Z\"}}\n\n"),
        )
        .unwrap();

        let log = JsonlActivityLog::open(&path).await.unwrap();
        let evs = log.query(1).await.unwrap();
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].product_id, 9);
    }

    #[tokio::test]
    async fn append_after_torn_tail_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let good = serde_json::to_string(&ActivityEvent::new(1, 9, ActivityType::Select)).unwrap();
        std::fs::write(&path, format!("{good}\n{{\"user_id\":1,\"prod")).unwrap();

        {
            let log = JsonlActivityLog::open(&path).await.unwrap();
            log.append(ActivityEvent::new(2, 4, ActivityType::View)).await.unwrap();
            log.append(ActivityEvent::new(2, 5, ActivityType::Favourite)).await.unwrap();
        }

        let reopened = JsonlActivityLog::open(&path).await.unwrap();
        let evs = reopened.query(2).await.unwrap();
        assert_eq!(evs.len(), 2);
        assert_eq!(evs[0].product_id, 4);
        assert_eq!(evs[1].product_id, 5);
        assert_eq!(reopened.query(1).await.unwrap().len(), 1);
        assert!(std::fs::read_to_string(&path).unwrap().ends_with('\n'));
    }

    #[tokio::test]
    async fn concurrent_appends_write_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let log = Arc::new(JsonlActivityLog::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for user in 0..8u64 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                for p in 0..25u64 {
                    log.append(ActivityEvent::new(user, p + 1, ActivityType::View))
                        .await
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 200);
        for line in lines {
            serde_json::from_str::<ActivityEvent>(line).unwrap();
        }
        assert_eq!(log.users().await.unwrap().len(), 8);
    }
}
