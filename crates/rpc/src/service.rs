//! GameService - the request/response facade a transport talks to
//!
//! Authenticates every mutating call, dispatches to the engine or the
//! projection, and maps outcomes onto the stable code set.

use chrono::Utc;
use spree_auth::InitDataVerifier;
use spree_core::Identity;
use spree_engine::LedgerEngine;
use spree_projection::LeaderboardProjection;

use crate::error::ApiError;
use crate::requests::{
    FinishRequest, FinishResponse, IdentityHint, LeaderboardRequest, LeaderboardResponse,
    SpendRequest, SpendResponse, StartRequest, StartResponse, MAX_LEADERBOARD_LIMIT,
};

/// The boundary facade over verifier, engine and projection
pub struct GameService {
    verifier: InitDataVerifier,
    engine: LedgerEngine,
    leaderboard: LeaderboardProjection,
}

impl GameService {
    /// Wire a service from its parts
    pub fn new(
        verifier: InitDataVerifier,
        engine: LedgerEngine,
        leaderboard: LeaderboardProjection,
    ) -> Self {
        Self {
            verifier,
            engine,
            leaderboard,
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    /// Verify the token and cross-check the optional client hint.
    ///
    /// The verified token's own `user` field is authoritative; the hint may
    /// only agree with it, never override it.
    fn authenticate(
        &self,
        auth_token: &str,
        hint: Option<&IdentityHint>,
    ) -> Result<Identity, ApiError> {
        let identity = self.verifier.verify(auth_token).map_err(|err| {
            tracing::warn!(%err, "rejected auth token");
            ApiError::unauthenticated()
        })?;

        if let Some(hint) = hint {
            if hint.id != identity.user_id {
                tracing::warn!(
                    verified = identity.user_id,
                    claimed = hint.id,
                    "identity hint does not match verified token"
                );
                return Err(ApiError::unauthenticated());
            }
        }

        Ok(identity)
    }

    /// Start (or resume) the caller's session
    pub async fn start(&self, req: StartRequest) -> Result<StartResponse, ApiError> {
        let identity = self.authenticate(&req.auth_token, req.identity_hint.as_ref())?;
        let now = Self::now();

        let display_name = identity.display_name().map(str::to_string);
        let session = self
            .engine
            .start(&identity, display_name.as_deref(), now)
            .await?;

        Ok(StartResponse {
            session_id: session.id,
            spent: session.spent,
            expires_at: session.expires_at,
            now,
        })
    }

    /// Record a purchase against the caller's session
    pub async fn spend(&self, req: SpendRequest) -> Result<SpendResponse, ApiError> {
        let identity = self.authenticate(&req.auth_token, req.identity_hint.as_ref())?;

        let outcome = self
            .engine
            .spend(
                req.session_id,
                &identity,
                &req.item_label,
                req.amount,
                Self::now(),
            )
            .await?;

        let receipt = *outcome.receipt();
        Ok(SpendResponse {
            applied: outcome.applied(),
            spent: receipt.spent,
            remaining: receipt.remaining,
            finished: receipt.finished,
            reason: if outcome.applied() {
                None
            } else {
                Some("no_balance")
            },
        })
    }

    /// Finalize the caller's session if its terminal condition holds
    pub async fn finish(&self, req: FinishRequest) -> Result<FinishResponse, ApiError> {
        let identity = self.authenticate(&req.auth_token, req.identity_hint.as_ref())?;

        let finished = self
            .engine
            .finish(req.session_id, &identity, Self::now())
            .await?;

        Ok(FinishResponse { finished })
    }

    /// The ranked view over finished sessions. Requires no authentication.
    pub async fn leaderboard(
        &self,
        req: LeaderboardRequest,
    ) -> Result<LeaderboardResponse, ApiError> {
        let limit = req
            .limit
            .unwrap_or(MAX_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);

        let items = self.leaderboard.top(limit).await.map_err(|err| {
            tracing::error!(%err, "leaderboard query failed");
            ApiError::new(crate::error::ErrorCode::Internal, "internal error")
        })?;

        Ok(LeaderboardResponse { items })
    }
}
