use amity_shared::{Actor, ObjectUrl};
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No object exists at the given url.
    #[error("Object not found: {0}")]
    NotFound(ObjectUrl),

    /// The session actor does not own the object it tried to modify.
    #[error("{actor} may not modify an object owned by {owner}")]
    Unauthorized { actor: Actor, owner: Actor },

    /// The session was never issued by this store, or has been logged out.
    #[error("Invalid or expired session")]
    InvalidSession,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A thread panicked while holding the store lock.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
