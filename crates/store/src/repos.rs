//! Repository implementations for the game database
//!
//! Methods are generic over the executor so the same queries run directly
//! on the pool or inside an engine transaction.

use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;

use crate::error::{StoreError, StoreResult};
use crate::schema::{SessionRow, SpendRow};

// ============================================================================
// Session Repository
// ============================================================================

/// Repository for the `sessions` table
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a fresh session and return its id.
    ///
    /// Fails with a unique violation when the owner already has an
    /// unfinished session; callers resolve that by re-reading.
    pub async fn insert(
        ex: impl SqliteExecutor<'_>,
        owner_identity: i64,
        display_name: Option<&str>,
        started_at: i64,
        expires_at: i64,
        balance_start: i64,
    ) -> StoreResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions
                (owner_identity, display_name, started_at, expires_at, balance_start, spent, finished)
            VALUES (?, ?, ?, ?, ?, 0, 0)
            "#,
        )
        .bind(owner_identity)
        .bind(display_name)
        .bind(started_at)
        .bind(expires_at)
        .bind(balance_start)
        .execute(ex)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a session by id
    pub async fn get(ex: impl SqliteExecutor<'_>, id: i64) -> StoreResult<Option<SessionRow>> {
        let row = sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(ex)
            .await?;
        Ok(row)
    }

    /// The owner's most recently started session, if any
    pub async fn latest_for_owner(
        ex: impl SqliteExecutor<'_>,
        owner_identity: i64,
    ) -> StoreResult<Option<SessionRow>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT * FROM sessions
            WHERE owner_identity = ?
            ORDER BY started_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(owner_identity)
        .fetch_optional(ex)
        .await?;
        Ok(row)
    }

    /// Set `finished = 1`. The flag never moves the other way.
    pub async fn mark_finished(ex: impl SqliteExecutor<'_>, id: i64) -> StoreResult<()> {
        let result = sqlx::query("UPDATE sessions SET finished = 1 WHERE id = ?")
            .bind(id)
            .execute(ex)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Session", id));
        }
        Ok(())
    }

    /// Compare-and-swap update of the session summary.
    ///
    /// Applies only when `spent` still equals `expected_spent`; returns the
    /// number of rows updated (0 means another writer got there first and
    /// the whole unit of work must be re-run). `finished` is ORed with the
    /// stored flag so a concurrent finalization is never undone.
    pub async fn update_progress(
        ex: impl SqliteExecutor<'_>,
        id: i64,
        new_spent: i64,
        finished: bool,
        expected_spent: i64,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET spent = ?, finished = (finished OR ?) WHERE id = ? AND spent = ?",
        )
        .bind(new_spent)
        .bind(finished)
        .bind(id)
        .bind(expected_spent)
        .execute(ex)
        .await?;
        Ok(result.rows_affected())
    }
}

// ============================================================================
// Spend Repository
// ============================================================================

/// Repository for the append-only `spends` ledger
pub struct SpendRepo;

impl SpendRepo {
    /// Append a ledger entry and return its id
    pub async fn insert(
        ex: impl SqliteExecutor<'_>,
        session_id: i64,
        item_label: &str,
        amount: i64,
        timestamp: i64,
    ) -> StoreResult<i64> {
        let result = sqlx::query(
            "INSERT INTO spends (session_id, item_label, amount, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(item_label)
        .bind(amount)
        .bind(timestamp)
        .execute(ex)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All entries for a session, in insertion order
    pub async fn list_for_session(
        ex: impl SqliteExecutor<'_>,
        session_id: i64,
    ) -> StoreResult<Vec<SpendRow>> {
        let rows = sqlx::query_as::<_, SpendRow>(
            "SELECT * FROM spends WHERE session_id = ? ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(ex)
        .await?;
        Ok(rows)
    }

    /// Sum of applied amounts for a session
    pub async fn sum_for_session(
        ex: impl SqliteExecutor<'_>,
        session_id: i64,
    ) -> StoreResult<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(amount), 0) FROM spends WHERE session_id = ?")
                .bind(session_id)
                .fetch_one(ex)
                .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Audit
// ============================================================================

/// One session's summary next to its ledger total
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AuditRow {
    pub session_id: i64,
    pub spent: i64,
    pub ledger_total: i64,
}

impl AuditRow {
    /// Ledger and summary must never diverge
    pub fn consistent(&self) -> bool {
        self.spent == self.ledger_total
    }

    /// Every session's summary joined against its ledger total
    pub async fn collect(ex: impl SqliteExecutor<'_>) -> StoreResult<Vec<AuditRow>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT s.id AS session_id,
                   s.spent AS spent,
                   COALESCE(SUM(p.amount), 0) AS ledger_total
            FROM sessions s
            LEFT JOIN spends p ON p.session_id = s.id
            GROUP BY s.id
            ORDER BY s.id ASC
            "#,
        )
        .fetch_all(ex)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use spree_core::{SESSION_DURATION_SECS, STARTING_BALANCE};
    use tempfile::TempDir;

    async fn open_store(dir: &TempDir) -> Store {
        Store::open(dir.path().join("game.db")).await.unwrap()
    }

    async fn insert_session(store: &Store, owner: i64, started_at: i64) -> i64 {
        SessionRepo::insert(
            store.pool(),
            owner,
            Some("alice"),
            started_at,
            started_at + SESSION_DURATION_SECS,
            STARTING_BALANCE,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let id = insert_session(&store, 42, 1_000).await;
        let row = SessionRepo::get(store.pool(), id).await.unwrap().unwrap();

        assert_eq!(row.owner_identity, 42);
        assert_eq!(row.display_name.as_deref(), Some("alice"));
        assert_eq!(row.expires_at, 1_000 + SESSION_DURATION_SECS);
        assert_eq!(row.spent, 0);
        assert!(!row.finished);
    }

    #[tokio::test]
    async fn test_latest_for_owner_picks_newest() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let first = insert_session(&store, 42, 1_000).await;
        SessionRepo::mark_finished(store.pool(), first).await.unwrap();
        let second = insert_session(&store, 42, 2_000).await;

        let latest = SessionRepo::latest_for_owner(store.pool(), 42)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second);
    }

    #[tokio::test]
    async fn test_one_unfinished_session_per_owner() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        insert_session(&store, 42, 1_000).await;
        let err = SessionRepo::insert(
            store.pool(),
            42,
            None,
            2_000,
            2_000 + SESSION_DURATION_SECS,
            STARTING_BALANCE,
        )
        .await
        .unwrap_err();

        assert!(err.is_unique_violation());
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_finished_session_unblocks_owner() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let first = insert_session(&store, 42, 1_000).await;
        SessionRepo::mark_finished(store.pool(), first).await.unwrap();

        // A new active session may now be created
        insert_session(&store, 42, 2_000).await;
    }

    #[tokio::test]
    async fn test_spend_requires_existing_session() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let result = SpendRepo::insert(store.pool(), 999, "ghost", 10, 1_000).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_progress_cas() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let id = insert_session(&store, 42, 1_000).await;

        let applied = SessionRepo::update_progress(store.pool(), id, 100, false, 0)
            .await
            .unwrap();
        assert_eq!(applied, 1);

        // Stale expectation no longer matches
        let missed = SessionRepo::update_progress(store.pool(), id, 200, false, 0)
            .await
            .unwrap();
        assert_eq!(missed, 0);
    }

    #[tokio::test]
    async fn test_sum_and_audit() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let id = insert_session(&store, 42, 1_000).await;

        SpendRepo::insert(store.pool(), id, "hat", 30, 1_001).await.unwrap();
        SpendRepo::insert(store.pool(), id, "boat", 70, 1_002).await.unwrap();
        SessionRepo::update_progress(store.pool(), id, 100, false, 0)
            .await
            .unwrap();

        let sum = SpendRepo::sum_for_session(store.pool(), id).await.unwrap();
        assert_eq!(sum, 100);

        let audit = AuditRow::collect(store.pool()).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert!(audit[0].consistent());
    }
}
