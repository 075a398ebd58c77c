use crate::tariff::{AddOnCatalog, ShuttleTariff, TourTariff};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("passenger count {0} outside the supported 1-12 range")]
    PassengerCountOutOfRange(u32),
    #[error("at least one passenger is required")]
    NoPassengers,
}

/// Business-tunable pricing knobs, loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRules {
    /// Flat percentage applied once to base + surcharge + add-ons.
    pub service_fee_percent: f64,
    /// Fixed additive amount for late-night pickups.
    pub night_surcharge_cents: i64,
    /// Start of the night window, inclusive (hour of day).
    pub night_window_start_hour: u32,
    /// End of the night window, exclusive (hour of day).
    pub night_window_end_hour: u32,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            service_fee_percent: 13.0,
            night_surcharge_cents: 2000,
            night_window_start_hour: 21,
            night_window_end_hour: 4,
        }
    }
}

/// Final price breakdown for one line item, all amounts in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub base_cents: i64,
    pub night_surcharge_cents: i64,
    pub add_ons_cents: i64,
    /// Tour-only: amount for passengers beyond the included party size.
    pub extras_cents: i64,
    pub service_fee_cents: i64,
    pub total_cents: i64,
}

/// Pure pricing over a line item's inputs. No I/O: the same inputs always
/// produce the same quote, which is what allows the wizard to re-quote and
/// checkout to re-verify without drift.
pub struct PriceEngine {
    rules: PricingRules,
    add_ons: AddOnCatalog,
}

impl PriceEngine {
    pub fn new(rules: PricingRules, add_ons: AddOnCatalog) -> Self {
        Self { rules, add_ons }
    }

    /// Shuttle trip: banded base tariff + night surcharge + add-ons, then a
    /// flat service fee on the sum (the fee never compounds on itself).
    pub fn shuttle_quote(
        &self,
        tariff: &ShuttleTariff,
        passengers: u32,
        pickup_time: NaiveTime,
        add_on_ids: &[String],
    ) -> Result<Quote, PriceError> {
        let base_cents = tariff.base_for(passengers)?;
        let night_surcharge_cents = if self.is_night_pickup(pickup_time) {
            self.rules.night_surcharge_cents
        } else {
            0
        };
        let add_ons_cents = self.add_ons.total_for(add_on_ids);

        let subtotal = base_cents + night_surcharge_cents + add_ons_cents;
        let service_fee_cents =
            round_half_up_cents(subtotal as f64 * self.rules.service_fee_percent / 100.0);

        Ok(Quote {
            base_cents,
            night_surcharge_cents,
            add_ons_cents,
            extras_cents: 0,
            service_fee_cents,
            total_cents: subtotal + service_fee_cents,
        })
    }

    /// Private tour: base covers the included party size, each extra
    /// passenger adds a fixed amount. Tour tariffs are already final, so no
    /// surcharge, add-ons or fee apply.
    pub fn tour_quote(&self, tariff: &TourTariff, passengers: u32) -> Result<Quote, PriceError> {
        if passengers == 0 {
            return Err(PriceError::NoPassengers);
        }
        let extras = passengers.saturating_sub(tariff.included_passengers) as i64;
        let extras_cents = extras * tariff.per_extra_cents;

        Ok(Quote {
            base_cents: tariff.base_cents,
            night_surcharge_cents: 0,
            add_ons_cents: 0,
            extras_cents,
            service_fee_cents: 0,
            total_cents: tariff.base_cents + extras_cents,
        })
    }

    /// The window wraps midnight in production (21:00 inclusive to 04:00
    /// exclusive) but the comparison also handles a non-wrapping
    /// configuration.
    fn is_night_pickup(&self, pickup_time: NaiveTime) -> bool {
        let hour = pickup_time.hour();
        let start = self.rules.night_window_start_hour;
        let end = self.rules.night_window_end_hour;
        if start <= end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }
}

/// Deterministic half-up rounding at cent granularity.
fn round_half_up_cents(amount: f64) -> i64 {
    (amount + 0.5).floor() as i64
}
