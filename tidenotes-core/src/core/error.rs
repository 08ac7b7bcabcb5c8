//! Error types for the Tidenotes core library.

use thiserror::Error;

/// All errors that can occur within the Tidenotes core library.
#[derive(Debug, Error)]
pub enum TidenotesError {
    /// A SQLite operation in the local backend failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A request to the note backend failed (transport or service error).
    #[error("Backend error: {0}")]
    Backend(String),

    /// A note ID was requested that does not exist in the collection.
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// A subscription could not be established for the given owner.
    #[error("Subscription failed: {0}")]
    SubscriptionFailed(String),

    /// The opened file is not a valid Tidenotes note store.
    #[error("Invalid note store: {0}")]
    InvalidStore(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored note data or a stream payload could not be deserialized from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`TidenotesError`].
pub type Result<T> = std::result::Result<T, TidenotesError>;

impl TidenotesError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::Backend(msg) => format!("Request failed: {msg}"),
            Self::NoteNotFound(_) => "Note no longer exists".to_string(),
            Self::SubscriptionFailed(_) => "Live updates are unavailable".to_string(),
            Self::InvalidStore(_) => "Could not open note store".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}
