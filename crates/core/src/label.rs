//! ItemLabel - Bounded free-text description of a purchase
//!
//! Labels are trimmed on construction. An empty or over-long label is
//! rejected rather than truncated, so the ledger only ever stores labels
//! that satisfy the bound.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum label length in characters
pub const MAX_ITEM_LABEL_LEN: usize = 64;

/// Errors that can occur when parsing item labels
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("Item label is empty")]
    Empty,

    #[error("Item label too long ({0} chars, max {MAX_ITEM_LABEL_LEN})")]
    TooLong(usize),
}

/// A non-empty purchase label of at most [`MAX_ITEM_LABEL_LEN`] characters.
///
/// # Example
/// ```
/// use spree_core::ItemLabel;
///
/// let label = ItemLabel::new("  golden yacht  ").unwrap();
/// assert_eq!(label.as_str(), "golden yacht");
///
/// assert!(ItemLabel::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemLabel(String);

impl ItemLabel {
    /// Create a new ItemLabel from raw input, trimming whitespace.
    ///
    /// Returns an error if the trimmed label is empty or longer than
    /// [`MAX_ITEM_LABEL_LEN`] characters.
    pub fn new(raw: &str) -> Result<Self, LabelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LabelError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_ITEM_LABEL_LEN {
            return Err(LabelError::TooLong(len));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the label text
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ItemLabel {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ItemLabel> for String {
    fn from(label: ItemLabel) -> Self {
        label.0
    }
}
