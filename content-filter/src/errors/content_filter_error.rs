//! Unified error type for the content-filter crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading vector stores.
///
/// Query paths never return these: a malformed store yields an empty
/// recommendation list instead.
#[derive(Debug, Error)]
pub enum ContentFilterError {
    // ── Configuration ───────────────────────────────────────────────────────
    /// Configured vector file does not exist.
    #[error("vector file not found for category '{category}': {path}")]
    VectorFileMissing { category: String, path: PathBuf },

    // ── I/O & parsing ───────────────────────────────────────────────────────
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Store shape ─────────────────────────────────────────────────────────
    /// A column required by the category schema is absent from the file.
    #[error("category '{category}' is missing column '{column}'")]
    MissingColumn {
        category: &'static str,
        column: &'static str,
    },

    /// Primary vectors disagree on dimensionality.
    #[error("primary vector size mismatch at row {row}: got {got}, want {want}")]
    DimensionMismatch { row: usize, got: usize, want: usize },

    /// The primary column holds no vectors at all.
    #[error("category '{0}' has no primary vectors")]
    EmptyStore(&'static str),
}
