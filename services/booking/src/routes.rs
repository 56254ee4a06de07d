//! Booking service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::BookingError,
    middleware::{AuthUser, auth_middleware},
    models::{BookingRequest, BookingResponse},
    state::AppState,
};

/// Create the router for the booking service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/my", get(my_bookings))
        .route("/bookings/:id", get(get_booking))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "booking-service"
    }))
}

/// Create a new booking
///
/// The payload is deserialized into a typed request; absent or
/// unparsable fields never reach the engine and answer MISSING_FIELDS.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BookingError> {
    let Json(request) = payload.map_err(|_| BookingError::MissingFields)?;

    let (booking, pricing) = state.engine.book(user.id, &request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse { booking, pricing }),
    ))
}

/// Get all bookings for the logged-in user
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, BookingError> {
    let bookings = state.engine.bookings_for_user(user.id).await?;
    Ok(Json(bookings))
}

/// Get a single booking by ID
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    let booking = state.engine.booking_by_id(user.id, id).await?;
    Ok(Json(booking))
}
