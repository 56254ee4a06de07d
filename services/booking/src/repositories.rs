//! Listing and booking store adapters
//!
//! The reservation engine talks to the store through the `ListingStore`
//! and `BookingStore` traits; the Pg implementations below own the SQL.

use async_trait::async_trait;
use common::error::StoreResult;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{Booking, ListingSnapshot, NewBooking};

/// Port for read-only listing lookups
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fetch the snapshot of a listing, if it exists
    async fn find_snapshot(&self, id: Uuid) -> StoreResult<Option<ListingSnapshot>>;
}

/// Port for booking persistence
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a new booking record
    async fn insert(&self, new_booking: &NewBooking) -> StoreResult<Booking>;

    /// All bookings made by one user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>>;

    /// Fetch a booking by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Booking>>;
}

/// PostgreSQL listing store
#[derive(Clone)]
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    /// Create a new listing store over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn find_snapshot(&self, id: Uuid) -> StoreResult<Option<ListingSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, nightly_price, max_guests, host_id
            FROM listings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ListingSnapshot {
            id: row.get("id"),
            title: row.get("title"),
            nightly_price: row.get("nightly_price"),
            max_guests: row.get("max_guests"),
            host_id: row.get("host_id"),
        }))
    }
}

/// PostgreSQL booking store
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    /// Create a new booking store over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Booking {
        Booking {
            id: row.get("id"),
            listing_id: row.get("listing_id"),
            user_id: row.get("user_id"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            guests: row.get("guests"),
            total_price: row.get("total_price"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert(&self, new_booking: &NewBooking) -> StoreResult<Booking> {
        info!(
            "Creating booking for listing {} by user {}",
            new_booking.listing_id, new_booking.user_id
        );

        let row = sqlx::query(
            r#"
            INSERT INTO bookings (listing_id, user_id, start_date, end_date, guests, total_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, listing_id, user_id, start_date, end_date, guests, total_price, created_at
            "#,
        )
        .bind(new_booking.listing_id)
        .bind(new_booking.user_id)
        .bind(new_booking.start_date)
        .bind(new_booking.end_date)
        .bind(new_booking.guests)
        .bind(new_booking.total_price)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::map_row(&row))
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT id, listing_id, user_id, start_date, end_date, guests, total_price, created_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT id, listing_id, user_id, start_date, end_date, guests, total_price, created_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Self::map_row(&row)))
    }
}
