//! The session ledger engine.
//!
//! Every operation is a single read-compute-write transaction. Within one
//! session, writers are serialized by a compare-and-swap on the summary's
//! `spent` column: a missed swap or a SQLite busy/snapshot/unique conflict
//! re-runs the whole unit of work against fresh state, a bounded number of
//! times. Expiry is evaluated lazily inside the same unit, never by a
//! background sweep.

use spree_core::{
    Identity, ItemLabel, Session, SpendAmount, SpendOutcome, SpendReceipt,
    SESSION_DURATION_SECS, STARTING_BALANCE,
};
use spree_store::{SessionRepo, SpendRepo, StoreError};
use sqlx::SqlitePool;

use crate::error::GameError;

/// Attempts per operation before conceding to contention
const MAX_WRITE_ATTEMPTS: u32 = 4;

/// The session ledger engine.
///
/// Holds nothing but the injected pool handle; session state is re-read
/// from the store on every call.
pub struct LedgerEngine {
    pool: SqlitePool,
}

impl LedgerEngine {
    /// Create an engine on top of an opened store pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Return the identity's active session, creating one if none exists.
    ///
    /// Idempotent under rapid repeated calls: the store's partial unique
    /// index makes a second concurrent insert fail, and the loser simply
    /// re-reads the winner's session.
    pub async fn start(
        &self,
        identity: &Identity,
        display_name: Option<&str>,
        now: i64,
    ) -> Result<Session, GameError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            match self.try_start(identity, display_name, now).await {
                Ok(Some(session)) => return Ok(session),
                Ok(None) => continue,
                Err(GameError::Store(err)) if err.is_retryable() => continue,
                Err(err) => return Err(err),
            }
        }
        Err(GameError::Store(StoreError::Contention))
    }

    async fn try_start(
        &self,
        identity: &Identity,
        display_name: Option<&str>,
        now: i64,
    ) -> Result<Option<Session>, GameError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        if let Some(row) = SessionRepo::latest_for_owner(&mut *tx, identity.user_id).await? {
            let session: Session = row.into();
            if session.is_active(now) {
                return Ok(Some(session));
            }
            if !session.finished {
                // The window elapsed but the flag was never set; finalize
                // before the unique index lets a replacement in.
                SessionRepo::mark_finished(&mut *tx, session.id).await?;
                tracing::debug!(session_id = session.id, "finalized expired session");
            }
        }

        let inserted = SessionRepo::insert(
            &mut *tx,
            identity.user_id,
            display_name,
            now,
            now + SESSION_DURATION_SECS,
            STARTING_BALANCE,
        )
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(err) if err.is_unique_violation() => {
                // Lost the creation race; the next attempt re-reads the
                // session the winner created.
                tx.rollback().await.ok();
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        tx.commit().await.map_err(StoreError::from)?;
        tracing::info!(session_id = id, owner = identity.user_id, "session started");

        Ok(Some(Session {
            id,
            owner_identity: identity.user_id,
            display_name: display_name.map(str::to_string),
            started_at: now,
            expires_at: now + SESSION_DURATION_SECS,
            balance_start: STARTING_BALANCE,
            spent: 0,
            finished: false,
        }))
    }

    /// Apply a spend request against a session's remaining balance.
    ///
    /// The requested amount is clamped down to the remaining balance; an
    /// exhausted-but-open session yields the soft
    /// [`SpendOutcome::NoBalance`] no-op instead of an error.
    pub async fn spend(
        &self,
        session_id: i64,
        identity: &Identity,
        item_label: &str,
        requested_amount: i64,
        now: i64,
    ) -> Result<SpendOutcome, GameError> {
        let label =
            ItemLabel::new(item_label).map_err(|err| GameError::InvalidInput(err.to_string()))?;
        let amount = SpendAmount::new(requested_amount)
            .map_err(|err| GameError::InvalidInput(err.to_string()))?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            match self.try_spend(session_id, identity, &label, amount, now).await {
                Ok(Some(outcome)) => return Ok(outcome),
                Ok(None) => continue,
                Err(GameError::Store(err)) if err.is_retryable() => continue,
                Err(err) => return Err(err),
            }
        }
        Err(GameError::Store(StoreError::Contention))
    }

    async fn try_spend(
        &self,
        session_id: i64,
        identity: &Identity,
        label: &ItemLabel,
        amount: SpendAmount,
        now: i64,
    ) -> Result<Option<SpendOutcome>, GameError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        let session: Session = SessionRepo::get(&mut *tx, session_id)
            .await?
            .ok_or(GameError::NotFound(session_id))?
            .into();

        if session.owner_identity != identity.user_id {
            return Err(GameError::Forbidden(session_id));
        }

        if session.finished || session.is_expired(now) {
            if !session.finished {
                // Lazy finalization: the rejection must leave the flag set.
                SessionRepo::mark_finished(&mut *tx, session_id).await?;
                tx.commit().await.map_err(StoreError::from)?;
                tracing::debug!(session_id, "finalized expired session");
            }
            return Err(GameError::SessionClosed(session_id));
        }

        let applied = session.clamp(amount);
        if applied == 0 {
            // Balance already exhausted: no ledger entry, summary untouched.
            return Ok(Some(SpendOutcome::NoBalance(SpendReceipt {
                spent: session.spent,
                remaining: 0,
                finished: false,
            })));
        }

        SpendRepo::insert(&mut *tx, session_id, label.as_str(), applied, now).await?;

        let new_spent = session.spent + applied;
        let finished = new_spent >= session.balance_start;
        let updated =
            SessionRepo::update_progress(&mut *tx, session_id, new_spent, finished, session.spent)
                .await?;
        if updated == 0 {
            // Another writer advanced the summary between our read and the
            // swap; throw the whole unit away and replay it.
            tx.rollback().await.ok();
            return Ok(None);
        }

        tx.commit().await.map_err(StoreError::from)?;

        if finished {
            tracing::info!(session_id, spent = new_spent, "session finished: balance exhausted");
        }

        Ok(Some(SpendOutcome::Applied(SpendReceipt {
            spent: new_spent,
            remaining: (session.balance_start - new_spent).max(0),
            finished,
        })))
    }

    /// Re-evaluate and persist the terminal flag.
    ///
    /// Idempotent: repeated calls yield the same evaluation, and the flag
    /// never reverts once set.
    pub async fn finish(
        &self,
        session_id: i64,
        identity: &Identity,
        now: i64,
    ) -> Result<bool, GameError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            match self.try_finish(session_id, identity, now).await {
                Ok(finished) => return Ok(finished),
                Err(GameError::Store(err)) if err.is_retryable() => continue,
                Err(err) => return Err(err),
            }
        }
        Err(GameError::Store(StoreError::Contention))
    }

    async fn try_finish(
        &self,
        session_id: i64,
        identity: &Identity,
        now: i64,
    ) -> Result<bool, GameError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        let session: Session = SessionRepo::get(&mut *tx, session_id)
            .await?
            .ok_or(GameError::NotFound(session_id))?
            .into();

        if session.owner_identity != identity.user_id {
            return Err(GameError::Forbidden(session_id));
        }

        let finished = session.terminal(now);
        if finished && !session.finished {
            SessionRepo::mark_finished(&mut *tx, session_id).await?;
            tracing::info!(session_id, "session finished");
        }

        tx.commit().await.map_err(StoreError::from)?;
        Ok(finished)
    }
}
