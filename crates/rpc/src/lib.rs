//! Spree RPC - The typed request/response boundary
//!
//! This crate is what a transport (HTTP handler, bot webhook) talks to:
//! strictly-parsed request shapes in, serializable responses or stable
//! error codes out. It also owns the composition root and the operator CLI.

pub mod context;
pub mod error;
pub mod requests;
pub mod service;

pub use context::AppContext;
pub use error::{ApiError, ErrorCode};
pub use service::GameService;
