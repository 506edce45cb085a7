//! Typed request/response shapes for the transport boundary
//!
//! Requests deserialize strictly: unknown fields are rejected, and a parse
//! failure becomes `invalid_input` before anything reaches the engine.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use spree_projection::LeaderboardEntry;

use crate::error::ApiError;

/// Hard cap on leaderboard rows per query
pub const MAX_LEADERBOARD_LIMIT: u32 = 20;

/// The identity the client *claims* to act as.
///
/// Only ever cross-checked against the verified token; never trusted on
/// its own.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityHint {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartRequest {
    pub auth_token: String,
    #[serde(default)]
    pub identity_hint: Option<IdentityHint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpendRequest {
    pub auth_token: String,
    #[serde(default)]
    pub identity_hint: Option<IdentityHint>,
    pub session_id: i64,
    pub item_label: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinishRequest {
    pub auth_token: String,
    #[serde(default)]
    pub identity_hint: Option<IdentityHint>,
    pub session_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardRequest {
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub session_id: i64,
    pub spent: i64,
    pub expires_at: i64,
    pub now: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendResponse {
    pub applied: bool,
    pub spent: i64,
    pub remaining: i64,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinishResponse {
    pub finished: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub items: Vec<LeaderboardEntry>,
}

/// Parse a raw JSON body into a typed request.
///
/// Unknown or malformed shapes are rejected here, at the boundary.
pub fn parse_request<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body)
        .map_err(|err| ApiError::invalid_input(format!("malformed request: {err}")))
}
