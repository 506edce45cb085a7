//! Spend - Ledger entries and the outcome of a spend request

use serde::{Deserialize, Serialize};

/// One recorded purchase event, as persisted in the append-only ledger.
///
/// Entries are never mutated or deleted; `amount` is the amount that was
/// actually applied (after clamping), not what the client requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spend {
    /// Unique, insertion-ordered id
    pub id: i64,

    /// Owning session; immutable
    pub session_id: i64,

    /// Purchase description
    pub item_label: String,

    /// Applied amount, strictly positive
    pub amount: i64,

    /// Epoch seconds at application time
    pub timestamp: i64,
}

/// Snapshot of a session's balance after a spend request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendReceipt {
    /// Cumulative applied amount after the request
    pub spent: i64,

    /// `max(0, balance_start - spent)`
    pub remaining: i64,

    /// Whether the request left the session finished
    pub finished: bool,
}

/// Result of a spend request that was accepted by the engine.
///
/// `NoBalance` is a soft no-op, not an error: the session was still open
/// but had nothing left to spend, so no ledger entry was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpendOutcome {
    /// A ledger entry was written and the summary updated
    Applied(SpendReceipt),

    /// Balance already exhausted; nothing was written
    NoBalance(SpendReceipt),
}

impl SpendOutcome {
    /// Whether an amount was actually applied
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The balance snapshot, regardless of outcome
    pub fn receipt(&self) -> &SpendReceipt {
        match self {
            Self::Applied(receipt) | Self::NoBalance(receipt) => receipt,
        }
    }
}
