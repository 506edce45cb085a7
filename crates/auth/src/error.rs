//! Verification rejections
//!
//! Every failure mode maps to the same caller-visible outcome
//! ("unauthenticated"); the variants exist for logs and tests.

use thiserror::Error;

/// Why an init-data blob failed verification.
///
/// The verifier never returns any other error and never panics; callers
/// must treat every variant as "unauthenticated", not as a fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenRejected {
    #[error("signature field missing")]
    MissingSignature,

    #[error("signature field is not valid hex")]
    MalformedSignature,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("verified token carries no user field")]
    MissingUser,

    #[error("verified token carries a malformed user field")]
    MalformedUser,
}
