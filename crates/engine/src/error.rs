//! The engine's failure taxonomy
//!
//! Everything except `Store` is an expected, recoverable outcome with a
//! stable boundary code; `Store` is the internal-failure class and the only
//! one a caller may treat as fatal.

use spree_store::StoreError;
use thiserror::Error;

/// Errors that can occur in ledger operations
#[derive(Debug, Error)]
pub enum GameError {
    #[error("authentication rejected")]
    Unauthenticated,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("session {0} not found")]
    NotFound(i64),

    #[error("session {0} belongs to another identity")]
    Forbidden(i64),

    #[error("session {0} is closed")]
    SessionClosed(i64),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}
