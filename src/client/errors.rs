use thiserror::Error;

use crate::model::PaletteError;

/// Errors emitted by [`PaletteClient`](super::PaletteClient) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (refused, timed out, ...).
    #[error("network unreachable: {0}")]
    NetworkUnreachable(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("server responded {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
    /// The server rejected a delete because the index was stale or invalid.
    #[error("index {0} is out of range")]
    IndexOutOfRange(i64),
    /// An import document was not a JSON array of palettes.
    #[error("invalid palette file: {0}")]
    InvalidImportFormat(String),
    /// A palette failed creation rules before being sent.
    #[error(transparent)]
    InvalidPalette(#[from] PaletteError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
