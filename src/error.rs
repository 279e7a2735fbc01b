use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Book, chapter or image not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Chapter index outside the book's spine.
    #[error("Chapter {index} out of range (book has {len} chapters)")]
    ChapterOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of chapters in the spine.
        len: usize,
    },

    /// Record file exists but could not be decoded.
    #[error("Corrupt record in {folder}: {source}")]
    CorruptRecord {
        /// Folder holding the record.
        folder: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Migration target already taken.
    #[error("Migration blocked by {0} conflict(s)")]
    Conflict(usize),

    /// Some migration entries failed.
    #[error("Migration incomplete: {succeeded}/{attempted} succeeded")]
    PartialMigration {
        /// Entries migrated successfully.
        succeeded: usize,
        /// Entries attempted.
        attempted: usize,
    },

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be reported to clients as 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::ChapterOutOfRange { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) | AppError::ChapterOutOfRange { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (status, self.to_string()).into_response()
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
