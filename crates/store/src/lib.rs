//! Spree Store - Durable sessions and the append-only spend ledger
//!
//! Two relations back the whole game: a mutable `sessions` summary (one row
//! per session) and an append-only `spends` ledger. The store owns nothing
//! but the SQLite pool; all state transitions are driven by the engine.

pub mod error;
pub mod repos;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use repos::{AuditRow, SessionRepo, SpendRepo};
pub use schema::{SessionRow, SpendRow};

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;

/// Handle to the game database.
///
/// Created once at startup by the composing application and shared from
/// there; the pool is the single shared mutable resource of the system.
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database at `path` and make sure the
    /// schema is in place.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        schema::apply(&pool).await?;

        Ok(Self { pool })
    }

    /// The underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for in-flight connections to finish
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
