//! Spree Projection - Read-only leaderboard over finished sessions
//!
//! The projector never writes; it is a single ranked SELECT over the
//! session summaries, so it can never observe a session mid-update.

pub mod error;
pub mod leaderboard;

pub use error::ProjectionError;
pub use leaderboard::{LeaderboardEntry, LeaderboardProjection, FALLBACK_DISPLAY_NAME};
