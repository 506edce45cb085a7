//! Database schema definitions
//!
//! Row types for sqlx mapping, plus the idempotent schema bootstrap.
//! Timestamps are epoch seconds throughout; `finished` is stored as an
//! INTEGER 0/1 and mapped to `bool`.

use serde::{Deserialize, Serialize};
use spree_core::{Session, Spend};
use sqlx::SqlitePool;

use crate::error::StoreResult;

/// Row type for the `sessions` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: i64,
    pub owner_identity: i64,
    pub display_name: Option<String>,
    pub started_at: i64,
    pub expires_at: i64,
    pub balance_start: i64,
    pub spent: i64,
    pub finished: bool,
}

/// Row type for the `spends` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SpendRow {
    pub id: i64,
    pub session_id: i64,
    pub item_label: String,
    pub amount: i64,
    pub timestamp: i64,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            owner_identity: row.owner_identity,
            display_name: row.display_name,
            started_at: row.started_at,
            expires_at: row.expires_at,
            balance_start: row.balance_start,
            spent: row.spent,
            finished: row.finished,
        }
    }
}

impl From<SpendRow> for Spend {
    fn from(row: SpendRow) -> Self {
        Spend {
            id: row.id,
            session_id: row.session_id,
            item_label: row.item_label,
            amount: row.amount,
            timestamp: row.timestamp,
        }
    }
}

/// Apply the schema. Safe to run on every startup.
///
/// The partial unique index on `owner_identity WHERE finished = 0` is what
/// makes "at most one active session per identity" a store-level guarantee;
/// the engine finalizes expired sessions before inserting a replacement.
pub async fn apply(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_identity INTEGER NOT NULL,
            display_name TEXT,
            started_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            balance_start INTEGER NOT NULL,
            spent INTEGER NOT NULL DEFAULT 0,
            finished INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS spends (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            item_label TEXT NOT NULL,
            amount INTEGER NOT NULL,
            timestamp INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sessions_owner
        ON sessions(owner_identity, started_at DESC)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_owner_active
        ON sessions(owner_identity) WHERE finished = 0
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_spends_session
        ON spends(session_id)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("schema ready");
    Ok(())
}
