//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use common::token::Role;
use serde::Serialize;
use serde_json::json;

use crate::{
    AppState,
    error::AuthError,
    models::{LoginRequest, SignupRequest, SubjectSummary},
};

/// Response for login and signup
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SubjectSummary,
    pub message: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/admin/signup", post(admin_signup))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let result = state
        .authenticator
        .login(&payload.email, &payload.password, Utc::now())
        .await?;

    let response = AuthResponse {
        token: result.token,
        user: result.user,
        message: "Login successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Customer signup endpoint
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    create_account(state, payload, Role::Customer).await
}

/// Admin signup endpoint
///
/// Creates an admin account with no further authorization gate, as the
/// upstream contract has it (see DESIGN.md).
pub async fn admin_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    create_account(state, payload, Role::Admin).await
}

async fn create_account(
    state: AppState,
    payload: SignupRequest,
    role: Role,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let result = state.authenticator.signup(payload, role).await?;

    let response = AuthResponse {
        token: result.token,
        user: result.user,
        message: "Registration successful".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Logout endpoint
///
/// Advisory: tokens are stateless and stay valid until expiry, the
/// client simply discards its copy.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"message": "Logged out successfully"})),
    )
}
