//! Custom error types for the booking service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for booking operations
#[derive(Error, Debug)]
pub enum BookingError {
    /// Required booking fields are absent from the request
    #[error("missing booking data")]
    MissingFields,

    /// The referenced listing does not exist
    #[error("listing not found")]
    ListingNotFound,

    /// The requested booking does not exist
    #[error("booking not found")]
    BookingNotFound,

    /// The checkout date is not strictly after the check-in date
    #[error("invalid date range")]
    InvalidRange,

    /// Guest count is outside 1..=max_guests for the listing
    #[error("guest count exceeds listing capacity of {max_guests}")]
    OverCapacity { max_guests: i32 },

    /// The booking belongs to a different user
    #[error("not authorized for this booking")]
    NotOwner,

    /// Missing, invalid, or expired bearer token
    #[error("unauthorized")]
    Unauthorized,

    /// Record store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            BookingError::MissingFields => (
                StatusCode::BAD_REQUEST,
                "MISSING_FIELDS",
                "Missing booking data".to_string(),
            ),
            BookingError::ListingNotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Listing not found".to_string(),
            ),
            BookingError::BookingNotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Booking not found".to_string(),
            ),
            BookingError::InvalidRange => (
                StatusCode::BAD_REQUEST,
                "INVALID_RANGE",
                "End date must be after start date".to_string(),
            ),
            BookingError::OverCapacity { max_guests } => (
                StatusCode::CONFLICT,
                "OVER_CAPACITY",
                format!("Guest count must be between 1 and {}", max_guests),
            ),
            BookingError::NotOwner => (
                StatusCode::FORBIDDEN,
                "NOT_AUTHORIZED",
                "Not authorized".to_string(),
            ),
            BookingError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Not authorized, token missing or invalid".to_string(),
            ),
            BookingError::Store(StoreError::Transient(e)) => {
                error!("Store temporarily unavailable: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "TRANSIENT",
                    "Service temporarily unavailable".to_string(),
                )
            }
            BookingError::Store(e) => {
                error!("Store failure during booking operation: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}
