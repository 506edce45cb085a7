//! Spree Auth - Verifies the platform's signed init-data blob
//!
//! The chat platform hands the mini-app an opaque, URL-encoded blob of
//! fields plus a keyed-hash signature. This crate checks the signature
//! against the bot token and extracts the verified [`spree_core::Identity`].

pub mod error;
pub mod verifier;

pub use error::TokenRejected;
pub use verifier::InitDataVerifier;
