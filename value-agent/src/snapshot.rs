//! Agent snapshot persistence.
//!
//! A snapshot is a JSON document holding the network weights, the Adam
//! moment estimates and the current exploration rate. Writes go to a sibling
//! temp file which is then renamed over the target, so readers never see a
//! truncated snapshot.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::errors::agent_error::AgentError;
use crate::network::QNetwork;
use crate::structs::agent_config::AgentConfig;
use crate::optimizer::Adam;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub version: u32,
    /// Hyper-parameters in effect when the snapshot was taken.
    pub config: AgentConfig,
    pub epsilon: f32,
    pub network: QNetwork,
    pub optimizer: Adam,
}

/// Read a snapshot. `Ok(None)` when nothing exists at `path`.
pub async fn read_snapshot(path: &Path) -> Result<Option<AgentSnapshot>, AgentError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let snapshot: AgentSnapshot = serde_json::from_slice(&bytes)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(AgentError::UnsupportedVersion(snapshot.version));
    }
    Ok(Some(snapshot))
}

/// Serialize and atomically replace the snapshot at `path`.
pub async fn write_snapshot(path: &Path, snapshot: &AgentSnapshot) -> Result<(), AgentError> {
    let bytes = serde_json::to_vec(snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample() -> AgentSnapshot {
        let mut rng = StdRng::seed_from_u64(11);
        AgentSnapshot {
            version: SNAPSHOT_VERSION,
            config: AgentConfig::new(4, 3),
            epsilon: 0.5,
            network: QNetwork::new(4, &[5], 3, &mut rng),
            optimizer: Adam::new(0.001),
        }
    }

    #[tokio::test]
    async fn write_then_read_restores_identical_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("agent.json");

        write_snapshot(&path, &sample()).await.unwrap();
        assert!(!temp_path(&path).exists());

        let loaded = read_snapshot(&path).await.unwrap().unwrap();
        assert_eq!(loaded, sample());
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_snapshot(&dir.path().join("nope.json")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn garbage_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(read_snapshot(&path).await, Err(AgentError::Json(_))));
    }
}
