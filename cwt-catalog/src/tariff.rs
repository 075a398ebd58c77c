use crate::pricing::PriceError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-route shuttle tariff, banded by total passenger count.
///
/// Prices are integer cents. Counts outside 1..=12 are rejected here as
/// well, even though the booking wizard validates them earlier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShuttleTariff {
    pub band_1_6_cents: i64,
    pub band_7_9_cents: i64,
    pub band_10_12_cents: i64,
}

impl ShuttleTariff {
    pub fn base_for(&self, passengers: u32) -> Result<i64, PriceError> {
        match passengers {
            1..=6 => Ok(self.band_1_6_cents),
            7..=9 => Ok(self.band_7_9_cents),
            10..=12 => Ok(self.band_10_12_cents),
            _ => Err(PriceError::PassengerCountOutOfRange(passengers)),
        }
    }
}

/// Private-tour tariff: a fixed base covers the included party size, each
/// passenger beyond it adds a fixed amount. No surcharges or add-ons.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TourTariff {
    pub base_cents: i64,
    pub included_passengers: u32,
    pub per_extra_cents: i64,
}

/// The fixed add-on catalog. Two products today: a multi-hour time
/// extension and flexible-rescheduling protection. Unknown identifiers
/// price at zero rather than erroring, so a stale wizard cannot break
/// checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOnCatalog {
    prices: HashMap<String, i64>,
}

pub const ADD_ON_EXTENDED_HOURS: &str = "extended_hours";
pub const ADD_ON_FLEX_RESCHEDULE: &str = "flex_reschedule";

impl AddOnCatalog {
    pub fn new(prices: HashMap<String, i64>) -> Self {
        Self { prices }
    }

    /// Current production catalog.
    pub fn standard() -> Self {
        let mut prices = HashMap::new();
        prices.insert(ADD_ON_EXTENDED_HOURS.to_string(), 4500);
        prices.insert(ADD_ON_FLEX_RESCHEDULE.to_string(), 2500);
        Self { prices }
    }

    pub fn price_of(&self, add_on_id: &str) -> i64 {
        self.prices.get(add_on_id).copied().unwrap_or(0)
    }

    pub fn total_for(&self, add_on_ids: &[String]) -> i64 {
        add_on_ids.iter().map(|id| self.price_of(id)).sum()
    }
}
