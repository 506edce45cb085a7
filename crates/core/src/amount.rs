//! SpendAmount - Strictly-positive wrapper for requested spend amounts
//!
//! Every spend request in Spree MUST carry a positive integral amount.
//! This is enforced at the type level; the clamp against the remaining
//! balance happens later, inside the ledger engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when working with spend amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must be a positive integer, got {0}")]
    NotPositive(i64),
}

/// A strictly-positive integral amount, in game units.
///
/// # Invariant
/// The inner value is always >= 1. This is enforced by the constructor.
///
/// # Example
/// ```
/// use spree_core::SpendAmount;
///
/// let amount = SpendAmount::new(500).unwrap();
/// assert_eq!(amount.get(), 500);
///
/// // Zero and negative amounts are rejected
/// assert!(SpendAmount::new(0).is_err());
/// assert!(SpendAmount::new(-7).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SpendAmount(i64);

impl SpendAmount {
    /// Create a new SpendAmount.
    ///
    /// Returns an error if the value is zero or negative.
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            Err(AmountError::NotPositive(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Get the inner value
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SpendAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for SpendAmount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpendAmount> for i64 {
    fn from(amount: SpendAmount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = SpendAmount::new(100).unwrap();
        assert_eq!(amount.get(), 100);
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert!(matches!(
            SpendAmount::new(0),
            Err(AmountError::NotPositive(0))
        ));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert!(matches!(
            SpendAmount::new(-100),
            Err(AmountError::NotPositive(-100))
        ));
    }

    #[test]
    fn test_serde_rejects_zero() {
        let result: Result<SpendAmount, _> = serde_json::from_str("0");
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let amount = SpendAmount::new(12345).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        let parsed: SpendAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, parsed);
    }
}
