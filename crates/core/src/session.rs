//! Session - One player's timed attempt at the spending game
//!
//! A session moves through exactly one transition, ACTIVE -> FINISHED, and
//! FINISHED is absorbing. The helpers here hold the whole state-machine
//! logic so that the engine and the store never re-derive it.

use crate::amount::SpendAmount;
use serde::{Deserialize, Serialize};

/// Length of a session window, in seconds
pub const SESSION_DURATION_SECS: i64 = 300;

/// Virtual balance granted at session start, in game units
pub const STARTING_BALANCE: i64 = 1_000_000;

/// One timed attempt at the spending game.
///
/// # Invariants
/// - `expires_at == started_at + SESSION_DURATION_SECS`, fixed at creation
/// - `0 <= spent <= balance_start`, and `spent` never decreases
/// - `finished` never reverts to `false`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique id, assigned by the store on creation
    pub id: i64,

    /// Owning identity; immutable after creation
    pub owner_identity: i64,

    /// Optional leaderboard label; immutable after creation
    pub display_name: Option<String>,

    /// Epoch seconds
    pub started_at: i64,

    /// Epoch seconds; `started_at + SESSION_DURATION_SECS`
    pub expires_at: i64,

    /// Initial allowance, fixed at creation
    pub balance_start: i64,

    /// Cumulative applied amount
    pub spent: i64,

    /// Terminal flag
    pub finished: bool,
}

impl Session {
    /// Whether the session window has elapsed at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Whether the session can still accept spends at `now`:
    /// not finished and not past its expiry time.
    pub fn is_active(&self, now: i64) -> bool {
        !self.finished && !self.is_expired(now)
    }

    /// The balance still available to spend. Never negative.
    pub fn remaining(&self) -> i64 {
        (self.balance_start - self.spent).max(0)
    }

    /// The amount a spend request would actually apply: the requested
    /// amount, clamped down to the remaining balance.
    pub fn clamp(&self, requested: SpendAmount) -> i64 {
        requested.get().min(self.remaining())
    }

    /// Evaluate the terminal condition at `now`: the session is finished
    /// once the balance is exhausted or the window has elapsed. ORed with
    /// any prior `finished` value, so the flag never reverts.
    pub fn terminal(&self, now: i64) -> bool {
        self.finished || self.spent >= self.balance_start || self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(spent: i64, finished: bool) -> Session {
        Session {
            id: 1,
            owner_identity: 42,
            display_name: None,
            started_at: 1_000,
            expires_at: 1_000 + SESSION_DURATION_SECS,
            balance_start: STARTING_BALANCE,
            spent,
            finished,
        }
    }

    #[test]
    fn test_active_inside_window() {
        let s = session(0, false);
        assert!(s.is_active(1_100));
    }

    #[test]
    fn test_not_active_at_expiry_instant() {
        let s = session(0, false);
        assert!(!s.is_active(1_300));
    }

    #[test]
    fn test_not_active_once_finished() {
        let s = session(0, true);
        assert!(!s.is_active(1_001));
    }

    #[test]
    fn test_clamp_caps_at_remaining() {
        let s = session(STARTING_BALANCE - 10, false);
        let requested = SpendAmount::new(50).unwrap();
        assert_eq!(s.clamp(requested), 10);
    }

    #[test]
    fn test_clamp_passes_small_amounts() {
        let s = session(0, false);
        let requested = SpendAmount::new(50).unwrap();
        assert_eq!(s.clamp(requested), 50);
    }

    #[test]
    fn test_clamp_zero_when_exhausted() {
        let s = session(STARTING_BALANCE, false);
        let requested = SpendAmount::new(1).unwrap();
        assert_eq!(s.clamp(requested), 0);
    }

    #[test]
    fn test_terminal_on_exhaustion() {
        let s = session(STARTING_BALANCE, false);
        assert!(s.terminal(1_001));
    }

    #[test]
    fn test_terminal_on_expiry() {
        let s = session(0, false);
        assert!(s.terminal(1_300));
    }

    #[test]
    fn test_terminal_never_reverts() {
        let s = session(0, true);
        assert!(s.terminal(1_001));
    }

    #[test]
    fn test_remaining_never_negative() {
        let mut s = session(STARTING_BALANCE, false);
        s.spent += 1; // corrupted summary must not produce a negative balance
        assert_eq!(s.remaining(), 0);
    }
}
