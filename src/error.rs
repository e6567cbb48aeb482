use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by Inliner operations.
#[derive(Error, Debug)]
pub enum InlinerError {
    /// A request was rejected locally before any network call was made.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The API returned a non-success HTTP status.
    #[error("Inliner returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// An image payload carried malformed base64.
    #[error("{context}: {source}")]
    Decode {
        context: String,
        source: base64::DecodeError,
    },

    /// The polling budget ran out before the image was ready.
    #[error("{label} timed out after {max_seconds}s")]
    Timeout { label: String, max_seconds: u64 },

    /// The caller raised the cancellation flag while polling.
    #[error("{label} was cancelled")]
    Cancelled { label: String },

    /// The smart URL recommendation failed and the policy requires it.
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),

    /// The response from Inliner was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// A local file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InlinerError {
    /// True for failures raised by the HTTP layer (status or network).
    pub fn is_transport(&self) -> bool {
        matches!(self, InlinerError::Http { .. } | InlinerError::Network { .. })
    }

    /// Errors that end a polling loop immediately instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InlinerError::Validation(_) | InlinerError::Cancelled { .. }
        )
    }
}

/// Why the smart URL recommendation could not supply a slug.
#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("Smart URL recommendation request failed: {0}")]
    Request(Box<InlinerError>),

    #[error("Smart URL recommendation returned no usable slug")]
    EmptySuggestion,
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, InlinerError>;
