//! Leaderboard projection - ranks finished sessions by total spent

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::ProjectionError;

/// Label reported for sessions without a display name
pub const FALLBACK_DISPLAY_NAME: &str = "anon";

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub spent: i64,
}

/// Leaderboard projection - the ranked top-N view over finished sessions
pub struct LeaderboardProjection {
    pool: SqlitePool,
}

impl LeaderboardProjection {
    /// Create a new leaderboard projection
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Up to `limit` finished sessions, biggest spender first; ties go to
    /// the session that started earlier.
    pub async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, ProjectionError> {
        let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            r#"
            SELECT display_name, spent
            FROM sessions
            WHERE finished = 1
            ORDER BY spent DESC, started_at ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(display_name, spent)| LeaderboardEntry {
                display_name: display_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string()),
                spent,
            })
            .collect())
    }
}
