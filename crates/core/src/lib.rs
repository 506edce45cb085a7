//! Spree Core - Domain types
//!
//! This crate contains the fundamental types used across Spree:
//! - `Session`: one player's timed attempt at the spending game
//! - `SpendAmount`: strictly-positive wrapper for requested spend amounts
//! - `ItemLabel`: bounded free-text purchase label
//! - `Identity`: the verified principal behind a request

pub mod amount;
pub mod identity;
pub mod label;
pub mod session;
pub mod spend;

pub use amount::{AmountError, SpendAmount};
pub use identity::Identity;
pub use label::{ItemLabel, LabelError, MAX_ITEM_LABEL_LEN};
pub use session::{Session, SESSION_DURATION_SECS, STARTING_BALANCE};
pub use spend::{Spend, SpendOutcome, SpendReceipt};
