//! Error type for the recommender crate.

use activity_log::ActivityLogError;
use thiserror::Error;
use value_agent::AgentError;

#[derive(Debug, Error)]
pub enum RecommenderError {
    // ── Configuration ───────────────────────────────────────────────────────
    /// Environment variable present but not parseable.
    #[error("invalid value for {key}: '{value}'")]
    EnvParse { key: String, value: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // ── Components ──────────────────────────────────────────────────────────
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    ActivityLog(#[from] ActivityLogError),

    // ── I/O ─────────────────────────────────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("training task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
