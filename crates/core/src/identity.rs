//! Identity - The verified principal behind a request
//!
//! An `Identity` is only ever produced by the verifier after the signed
//! token checks out; everything downstream trusts it by construction.

use serde::{Deserialize, Serialize};

/// The verified principal on whose behalf requests are made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Platform user id. Always positive.
    pub user_id: i64,

    /// Optional public handle, used as the leaderboard display name.
    pub username: Option<String>,
}

impl Identity {
    /// Create a new identity
    pub fn new(user_id: i64, username: Option<String>) -> Self {
        Self { user_id, username }
    }

    /// The display name to record on sessions, if any.
    ///
    /// Empty handles are treated as absent.
    pub fn display_name(&self) -> Option<&str> {
        self.username.as_deref().filter(|name| !name.is_empty())
    }
}
