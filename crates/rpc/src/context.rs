//! Application context - wires everything together
//!
//! Owns the store lifecycle: the pool is opened here at startup and closed
//! when the context is dropped, never reached through global state.

use std::path::{Path, PathBuf};

use spree_auth::InitDataVerifier;
use spree_engine::LedgerEngine;
use spree_projection::LeaderboardProjection;
use spree_store::Store;

use crate::service::GameService;

/// Env var holding the bot token init data is verified against
pub const BOT_TOKEN_ENV: &str = "SPREE_BOT_TOKEN";

/// Application context - wires together all components
pub struct AppContext {
    pub store: Store,
    pub leaderboard: LeaderboardProjection,
    pub service: Option<GameService>,
    db_path: PathBuf,
}

impl AppContext {
    /// Open the database under `data_path` and wire the components.
    ///
    /// The game service needs `SPREE_BOT_TOKEN`; without it only the
    /// read-only operator commands are available.
    pub async fn new(data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref();
        std::fs::create_dir_all(data_path)?;

        let db_path = data_path.join("game.db");
        let store = Store::open(&db_path).await?;
        let leaderboard = LeaderboardProjection::new(store.pool().clone());

        let service = std::env::var(BOT_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
            .map(|token| {
                GameService::new(
                    InitDataVerifier::new(&token),
                    LedgerEngine::new(store.pool().clone()),
                    LeaderboardProjection::new(store.pool().clone()),
                )
            });
        if service.is_none() {
            tracing::warn!("{BOT_TOKEN_ENV} not set; game service disabled");
        }

        Ok(Self {
            store,
            leaderboard,
            service,
            db_path,
        })
    }

    /// Path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
