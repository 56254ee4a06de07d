//! Application state shared across handlers

use common::token::TokenService;

use crate::service::ReservationEngine;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: ReservationEngine,
    pub token_service: TokenService,
}
