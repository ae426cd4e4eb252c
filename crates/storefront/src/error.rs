//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use thread_harbor_core::{BagError, PricingError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bag pricing failed - the bag references a product the catalog does
    /// not have. A data-integrity fault, not a user error.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Bag mutation or session decoding failed.
    #[error("Bag error: {0}")]
    Bag(#[from] BagError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a server fault worth tracking, as opposed to a
    /// client mistake.
    const fn is_server_fault(&self) -> bool {
        match self {
            Self::Pricing(_) | Self::Session(_) | Self::Internal(_) => true,
            Self::Bag(err) => matches!(err, BagError::MalformedBag | BagError::MalformedEntry(_)),
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Pricing(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Bag(err) => match err {
                // A malformed session bag is our data fault, not the
                // client's.
                BagError::MalformedBag | BagError::MalformedEntry(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                BagError::InvalidQuantity | BagError::SizeMismatch(_) => StatusCode::BAD_REQUEST,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Pricing(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Bag(err) => match err {
                BagError::MalformedBag | BagError::MalformedEntry(_) => {
                    "Internal server error".to_string()
                }
                BagError::InvalidQuantity => "Quantity must be at least 1".to_string(),
                BagError::SizeMismatch(_) => {
                    "This product is already in your bag in a different variant".to_string()
                }
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
