//! The reservation engine: booking validation, pricing, persistence
//!
//! Validation is fail-fast and ordered: listing existence, then date
//! range, then capacity. The total is always computed server-side; a
//! client-supplied price is never trusted. No overlap check is made
//! between bookings for the same listing and dates (see DESIGN.md).

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::{Booking, BookingRequest, NewBooking};
use crate::pricing::{PriceBreakdown, PricingConfig};
use crate::repositories::{BookingStore, ListingStore};

/// Reservation engine service
#[derive(Clone)]
pub struct ReservationEngine {
    listings: Arc<dyn ListingStore>,
    bookings: Arc<dyn BookingStore>,
    pricing: PricingConfig,
}

impl ReservationEngine {
    /// Create a new reservation engine
    pub fn new(
        listings: Arc<dyn ListingStore>,
        bookings: Arc<dyn BookingStore>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            listings,
            bookings,
            pricing,
        }
    }

    /// Validate a booking request, price it, and persist the booking
    pub async fn book(
        &self,
        requester: Uuid,
        request: &BookingRequest,
    ) -> Result<(Booking, PriceBreakdown), BookingError> {
        let listing = self
            .listings
            .find_snapshot(request.listing_id)
            .await?
            .ok_or(BookingError::ListingNotFound)?;

        if request.end_date <= request.start_date {
            return Err(BookingError::InvalidRange);
        }

        if request.guests < 1 || request.guests > listing.max_guests {
            return Err(BookingError::OverCapacity {
                max_guests: listing.max_guests,
            });
        }

        let nights = (request.end_date - request.start_date).num_days();
        let pricing = self.pricing.quote(listing.nightly_price, nights);

        let booking = self
            .bookings
            .insert(&NewBooking {
                listing_id: listing.id,
                user_id: requester,
                start_date: request.start_date,
                end_date: request.end_date,
                guests: request.guests,
                total_price: pricing.total,
            })
            .await?;

        info!(
            "Booked listing {} for {} nights, total {}",
            listing.id, nights, pricing.total
        );

        Ok((booking, pricing))
    }

    /// All bookings made by the requester
    pub async fn bookings_for_user(&self, requester: Uuid) -> Result<Vec<Booking>, BookingError> {
        Ok(self.bookings.list_for_user(requester).await?)
    }

    /// Fetch one booking; only its owner may see it
    pub async fn booking_by_id(
        &self,
        requester: Uuid,
        id: Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        if booking.user_id != requester {
            return Err(BookingError::NotOwner);
        }

        Ok(booking)
    }
}
