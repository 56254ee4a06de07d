//! Booking service models for requests, responses, and records

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of a listing, as much as the reservation engine needs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSnapshot {
    pub id: Uuid,
    pub title: String,
    pub nightly_price: Decimal,
    pub max_guests: i32,
    pub host_id: Uuid,
}

/// A persisted booking record; immutable once created
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// New booking payload with the server-computed total
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
    pub total_price: Decimal,
}

/// Request to create a booking
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
}

/// Response for a created booking
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking: Booking,
    pub pricing: crate::pricing::PriceBreakdown,
}
