//! Process configuration read from environment variables.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use content_filter::Category;
use serde::Serialize;
use tracing::warn;
use value_agent::AgentConfig;

use crate::errors::recommender_error::RecommenderError;

const DEFAULT_CATEGORY_FILES: &str =
    "fashion=data/vectors/fashion.json,book=data/vectors/book.json";

/// Top-level runtime configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RecConfig {
    /// Listen address for the HTTP surface.
    pub api_address: String,
    /// Vector file per category.
    pub category_files: BTreeMap<Category, PathBuf>,
    /// Product catalog (one JSON object per line).
    pub catalog_path: PathBuf,
    /// Append-only activity log.
    pub activity_log_path: PathBuf,
    /// Agent snapshot.
    pub model_path: PathBuf,
    /// Wall-clock interval between training sweeps.
    pub model_update_interval: Duration,
    pub state_size: usize,
    pub action_size: usize,
    pub batch_size: usize,
    pub memory_capacity: usize,
    /// How many interaction-list products seed neighbour expansion.
    pub neighbor_seeds: usize,
    /// Neighbours fetched per seed.
    pub neighbor_top_k: usize,
}

impl Default for RecConfig {
    fn default() -> Self {
        Self {
            api_address: "0.0.0.0:8080".to_string(),
            category_files: BTreeMap::from([
                (Category::Fashion, PathBuf::from("data/vectors/fashion.json")),
                (Category::Book, PathBuf::from("data/vectors/book.json")),
            ]),
            catalog_path: PathBuf::from("data/catalog.jsonl"),
            activity_log_path: PathBuf::from("data/activity_log.jsonl"),
            model_path: PathBuf::from("data/agent_model.json"),
            model_update_interval: Duration::from_secs(120),
            state_size: 10,
            action_size: 50,
            batch_size: 32,
            memory_capacity: 2000,
            neighbor_seeds: 5,
            neighbor_top_k: 15,
        }
    }
}

impl RecConfig {
    /// Build configuration from the process environment.
    ///
    /// Environment variables used:
    /// - `API_ADDRESS` (default: "0.0.0.0:8080")
    /// - `CATEGORY_VECTOR_FILES` (default: "fashion=data/vectors/fashion.json,book=data/vectors/book.json")
    /// - `CATALOG_JSONL_PATH` (default: "data/catalog.jsonl")
    /// - `ACTIVITY_LOG_PATH` (default: "data/activity_log.jsonl")
    /// - `MODEL_PATH` (default: "data/agent_model.json")
    /// - `MODEL_UPDATE_INTERVAL_SECS` (default: 120)
    /// - `STATE_SIZE` (default: 10)
    /// - `ACTION_SIZE` (default: 50)
    /// - `AGENT_BATCH_SIZE` (default: 32)
    /// - `AGENT_MEMORY_CAPACITY` (default: 2000)
    /// - `NEIGHBOR_SEEDS` (default: 5)
    /// - `NEIGHBOR_TOP_K` (default: 15)
    ///
    /// # Errors
    /// `EnvParse` for unparseable numbers, `InvalidConfig` for zero sizes or
    /// an empty category mapping.
    pub fn from_env() -> Result<Self, RecommenderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RecConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RecommenderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();

        let category_files = parse_category_files(
            &lookup("CATEGORY_VECTOR_FILES").unwrap_or_else(|| DEFAULT_CATEGORY_FILES.into()),
        )?;

        let cfg = Self {
            api_address: lookup("API_ADDRESS").unwrap_or(d.api_address),
            category_files,
            catalog_path: lookup("CATALOG_JSONL_PATH").map(PathBuf::from).unwrap_or(d.catalog_path),
            activity_log_path: lookup("ACTIVITY_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(d.activity_log_path),
            model_path: lookup("MODEL_PATH").map(PathBuf::from).unwrap_or(d.model_path),
            model_update_interval: Duration::from_secs(read_or(
                &lookup,
                "MODEL_UPDATE_INTERVAL_SECS",
                d.model_update_interval.as_secs(),
            )?),
            state_size: read_or(&lookup, "STATE_SIZE", d.state_size)?,
            action_size: read_or(&lookup, "ACTION_SIZE", d.action_size)?,
            batch_size: read_or(&lookup, "AGENT_BATCH_SIZE", d.batch_size)?,
            memory_capacity: read_or(&lookup, "AGENT_MEMORY_CAPACITY", d.memory_capacity)?,
            neighbor_seeds: read_or(&lookup, "NEIGHBOR_SEEDS", d.neighbor_seeds)?,
            neighbor_top_k: read_or(&lookup, "NEIGHBOR_TOP_K", d.neighbor_top_k)?,
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RecommenderError> {
        let sizes = [
            ("MODEL_UPDATE_INTERVAL_SECS", self.model_update_interval.as_secs() as usize),
            ("STATE_SIZE", self.state_size),
            ("ACTION_SIZE", self.action_size),
            ("AGENT_BATCH_SIZE", self.batch_size),
            ("AGENT_MEMORY_CAPACITY", self.memory_capacity),
            ("NEIGHBOR_TOP_K", self.neighbor_top_k),
        ];
        if let Some((key, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(RecommenderError::InvalidConfig(format!("{key} must be > 0")));
        }
        if self.memory_capacity < self.batch_size {
            return Err(RecommenderError::InvalidConfig(
                "AGENT_MEMORY_CAPACITY must be >= AGENT_BATCH_SIZE".into(),
            ));
        }
        if self.category_files.is_empty() {
            return Err(RecommenderError::InvalidConfig(
                "CATEGORY_VECTOR_FILES names no known category".into(),
            ));
        }
        Ok(())
    }

    /// Agent hyper-parameters: configured shape, default learning schedule.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            state_size: self.state_size,
            action_size: self.action_size,
            batch_size: self.batch_size,
            memory_capacity: self.memory_capacity,
            ..AgentConfig::default()
        }
    }
}

/// Parse `label=path` pairs separated by `,`. Unknown labels are skipped
/// with a warning; a pair without `=` is an error.
pub fn parse_category_files(raw: &str) -> Result<BTreeMap<Category, PathBuf>, RecommenderError> {
    let mut out = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((label, path)) = pair.split_once('=') else {
            return Err(RecommenderError::EnvParse {
                key: "CATEGORY_VECTOR_FILES".into(),
                value: pair.to_string(),
            });
        };
        let (label, path) = (label.trim(), path.trim());
        if path.is_empty() {
            return Err(RecommenderError::EnvParse {
                key: "CATEGORY_VECTOR_FILES".into(),
                value: pair.to_string(),
            });
        }
        match Category::parse(label) {
            Some(category) => {
                out.insert(category, PathBuf::from(path));
            }
            None => warn!(
                target: "recommender::config",
                label,
                "ignoring vector file for unknown category"
            ),
        }
    }
    Ok(out)
}

fn read_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, RecommenderError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(v) => v.trim().parse::<T>().map_err(|_| RecommenderError::EnvParse {
            key: key.into(),
            value: v,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = RecConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.api_address, "0.0.0.0:8080");
        assert_eq!(cfg.model_update_interval, Duration::from_secs(120));
        assert_eq!(cfg.state_size, 10);
        assert_eq!(cfg.action_size, 50);
        assert_eq!(cfg.neighbor_top_k, 15);
        assert_eq!(cfg.category_files.len(), 2);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = RecConfig::from_lookup(lookup(&[
            ("STATE_SIZE", "6"),
            ("CATEGORY_VECTOR_FILES", "book=/tmp/b.json"),
            ("MODEL_PATH", "/tmp/m.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.state_size, 6);
        assert_eq!(cfg.agent_config().state_size, 6);
        assert_eq!(
            cfg.category_files,
            BTreeMap::from([(Category::Book, PathBuf::from("/tmp/b.json"))])
        );
        assert_eq!(cfg.model_path, PathBuf::from("/tmp/m.json"));
    }

    #[test]
    fn bad_number_is_env_parse() {
        let err = RecConfig::from_lookup(lookup(&[("ACTION_SIZE", "many")])).unwrap_err();
        assert!(matches!(err, RecommenderError::EnvParse { key, .. } if key == "ACTION_SIZE"));
    }

    #[test]
    fn zero_size_is_invalid() {
        let err = RecConfig::from_lookup(lookup(&[("STATE_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, RecommenderError::InvalidConfig(_)));
    }

    #[test]
    fn unknown_labels_are_skipped() {
        let files = parse_category_files("toys=/t.json, Fashion = /f.json").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[&Category::Fashion], PathBuf::from("/f.json"));
        assert!(parse_category_files("fashion").is_err());
    }
}
