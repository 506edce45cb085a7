//! Store errors
//!
//! Wraps sqlx errors and classifies the conflict cases the engine retries.

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Write conflict persisted after retries")]
    Contention,
}

/// Result type alias for StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Create a NotFound error
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Whether this is a unique-constraint violation (e.g. a lost race on
    /// the one-active-session-per-owner index).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db)) => {
                matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
            }
            _ => false,
        }
    }

    /// Whether re-running the failed unit of work may succeed: a unique
    /// violation from a lost insert race, or a SQLite busy/locked condition
    /// from a concurrent writer.
    pub fn is_retryable(&self) -> bool {
        if self.is_unique_violation() {
            return true;
        }
        match self {
            // SQLITE_BUSY (5), SQLITE_LOCKED (6) and their extended codes
            // SQLITE_BUSY_RECOVERY (261) and SQLITE_BUSY_SNAPSHOT (517).
            Self::Database(sqlx::Error::Database(db)) => {
                matches!(db.code().as_deref(), Some("5" | "6" | "261" | "517"))
            }
            _ => false,
        }
    }
}
