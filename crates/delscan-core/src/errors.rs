use std::path::PathBuf;

use crate::ports::TransportError;

/// Core error type for a scrape run.
///
/// Adapter crates map their specific failures into this type so the
/// orchestrator can handle fatal paths consistently. Per-entity resolution
/// failures never surface here; they are folded into error-variant profiles.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot write report to {path}: {reason}")]
    Report { path: PathBuf, reason: String },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, Error>;
