//! Bearer token validation middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use common::token::Role;
use uuid::Uuid;

use crate::{error::BookingError, state::AppState};

/// Authenticated subject attached to the request after verification
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// Extract and verify the bearer token from the Authorization header
///
/// Any failure (absent header, malformed token, bad signature, expiry)
/// answers 401 without distinguishing the cause to the client.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, BookingError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(BookingError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(BookingError::Unauthorized)?;

    let claims = state
        .token_service
        .verify(token)
        .map_err(|_| BookingError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}
