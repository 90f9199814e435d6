//! Unified error type for the value-agent crate.

use thiserror::Error;

/// Errors produced by the value-function agent.
#[derive(Debug, Error)]
pub enum AgentError {
    // ── Configuration ───────────────────────────────────────────────────────
    /// Hyper-parameter combination is invalid.
    #[error("invalid agent configuration: {0}")]
    InvalidConfig(String),

    // ── Snapshot persistence ────────────────────────────────────────────────
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error.
    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot was produced for a different network shape.
    #[error("snapshot shape mismatch: got {got_state}x{got_action}, want {want_state}x{want_action}")]
    ShapeMismatch {
        got_state: usize,
        got_action: usize,
        want_state: usize,
        want_action: usize,
    },

    /// Snapshot layers do not form a consistent network.
    #[error("malformed network: {0}")]
    MalformedNetwork(String),

    /// Snapshot format version is not understood.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}
