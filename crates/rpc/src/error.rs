//! Boundary errors with stable codes
//!
//! Every engine outcome maps onto exactly one machine-readable code plus
//! the HTTP status a transport should answer with. `no_balance` is absent
//! here on purpose: it is a soft outcome carried by a success response.

use serde::Serialize;
use spree_engine::GameError;
use thiserror::Error;

/// Stable machine-readable failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthenticated,
    InvalidInput,
    NotFound,
    Forbidden,
    SessionClosed,
    Internal,
}

impl ErrorCode {
    /// The HTTP status a transport should map this code to
    pub const fn status(self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::InvalidInput | Self::SessionClosed => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }

    /// The wire form of the code
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::SessionClosed => "session_closed",
            Self::Internal => "internal",
        }
    }
}

/// A failed boundary call
#[derive(Debug, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "authentication rejected")
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// The HTTP status for this error
    pub fn status(&self) -> u16 {
        self.code.status()
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let message = err.to_string();
        match err {
            GameError::Unauthenticated => Self::new(ErrorCode::Unauthenticated, message),
            GameError::InvalidInput(_) => Self::new(ErrorCode::InvalidInput, message),
            GameError::NotFound(_) => Self::new(ErrorCode::NotFound, message),
            GameError::Forbidden(_) => Self::new(ErrorCode::Forbidden, message),
            GameError::SessionClosed(_) => Self::new(ErrorCode::SessionClosed, message),
            GameError::Store(_) => {
                tracing::error!("{message}");
                Self::new(ErrorCode::Internal, "internal error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::Unauthenticated.status(), 401);
        assert_eq!(ErrorCode::InvalidInput.status(), 400);
        assert_eq!(ErrorCode::Forbidden.status(), 403);
        assert_eq!(ErrorCode::NotFound.status(), 404);
        assert_eq!(ErrorCode::SessionClosed.status(), 400);
        assert_eq!(ErrorCode::Internal.status(), 500);
    }

    #[test]
    fn test_wire_codes_are_stable() {
        assert_eq!(ErrorCode::Unauthenticated.as_str(), "unauthenticated");
        assert_eq!(ErrorCode::InvalidInput.as_str(), "invalid_input");
        assert_eq!(ErrorCode::NotFound.as_str(), "not_found");
        assert_eq!(ErrorCode::Forbidden.as_str(), "forbidden");
        assert_eq!(ErrorCode::SessionClosed.as_str(), "session_closed");
        assert_eq!(ErrorCode::Internal.as_str(), "internal");
    }

    #[test]
    fn test_store_failures_are_masked() {
        let err: ApiError = GameError::Store(spree_store::StoreError::Contention).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "internal error");
    }
}
