//! Deterministic booking price computation
//!
//! Pure function of nightly price and night count; all arithmetic is
//! decimal so repeated quotes for the same stay agree to the cent.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::env;
use std::str::FromStr;

/// Weekly discount applied from 7 nights: 10%
const WEEKLY_DISCOUNT_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
/// Service fee: 14% of the subtotal
const SERVICE_FEE_RATE: Decimal = Decimal::from_parts(14, 0, 0, false, 2);
/// Taxes and occupancy fees: 12% of the subtotal
const TAX_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);

/// Pricing configuration
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig {
    /// Flat cleaning fee added to every booking
    pub cleaning_fee: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cleaning_fee: Decimal::from(75),
        }
    }
}

impl PricingConfig {
    /// Create a new PricingConfig from environment variables
    ///
    /// # Environment Variables
    /// - `CLEANING_FEE`: Flat cleaning fee (default: 75)
    pub fn from_env() -> Self {
        let cleaning_fee = env::var("CLEANING_FEE")
            .ok()
            .and_then(|s| Decimal::from_str(&s).ok())
            .unwrap_or_else(|| Self::default().cleaning_fee);

        Self { cleaning_fee }
    }

    /// Compute the price breakdown for a stay
    ///
    /// `nights` must be >= 1; the reservation engine validates the
    /// date range before quoting.
    pub fn quote(&self, nightly_price: Decimal, nights: i64) -> PriceBreakdown {
        let subtotal = nightly_price * Decimal::from(nights);
        let weekly_discount = if nights >= 7 {
            subtotal * WEEKLY_DISCOUNT_RATE
        } else {
            Decimal::ZERO
        };
        let service_fee = subtotal * SERVICE_FEE_RATE;
        let taxes = subtotal * TAX_RATE;
        let total = subtotal - weekly_discount + self.cleaning_fee + service_fee + taxes;

        PriceBreakdown {
            nights,
            subtotal: round_cents(subtotal),
            weekly_discount: round_cents(weekly_discount),
            cleaning_fee: self.cleaning_fee,
            service_fee: round_cents(service_fee),
            taxes: round_cents(taxes),
            total: round_cents(total),
        }
    }
}

/// Round half-up to whole cents
fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Itemized price for one booking
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub nights: i64,
    pub subtotal: Decimal,
    pub weekly_discount: Decimal,
    pub cleaning_fee: Decimal,
    pub service_fee: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
}
