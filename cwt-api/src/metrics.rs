use axum::extract::State;
use axum::http::StatusCode;
use crate::state::AppState;
use cwt_checkout::FinalizeOutcome;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

/// Operator-facing counters. Degraded-mode events never fail a checkout,
/// so this is where they become visible.
pub struct Metrics {
    registry: Registry,
    pub checkouts_finalized: IntCounter,
    pub stamp_failures: IntCounter,
    pub sequence_fallbacks: IntCounter,
    pub notification_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let checkouts_finalized = IntCounter::new(
            "cwt_checkouts_finalized_total",
            "Checkouts successfully finalized",
        )?;
        let stamp_failures = IntCounter::new(
            "cwt_stamp_failures_total",
            "Line-item stamp writes that never persisted",
        )?;
        let sequence_fallbacks = IntCounter::new(
            "cwt_sequence_fallbacks_total",
            "Booking numbers issued from the clock-seeded fallback",
        )?;
        let notification_failures = IntCounter::new(
            "cwt_notification_failures_total",
            "Confirmation dispatches that failed",
        )?;

        registry.register(Box::new(checkouts_finalized.clone()))?;
        registry.register(Box::new(stamp_failures.clone()))?;
        registry.register(Box::new(sequence_fallbacks.clone()))?;
        registry.register(Box::new(notification_failures.clone()))?;

        Ok(Self {
            registry,
            checkouts_finalized,
            stamp_failures,
            sequence_fallbacks,
            notification_failures,
        })
    }

    pub fn observe_finalize(&self, outcome: &FinalizeOutcome) {
        self.checkouts_finalized.inc();
        self.stamp_failures.inc_by(outcome.failed_stamps.len() as u64);
        if outcome.sequence_degraded {
            self.sequence_fallbacks.inc();
        }
        if outcome.notification_failed {
            self.notification_failures.inc();
        }
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .render()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_outcome_feeds_the_counters() {
        let metrics = Metrics::new().unwrap();
        let outcome = FinalizeOutcome {
            booking_number: "CWT-2025-1".into(),
            shuttle_vouchers: vec!["CWT-2025-1-S1".into()],
            tour_vouchers: vec![],
            failed_stamps: vec!["shuttle group grp-2".into()],
            sequence_degraded: true,
            notification_failed: false,
        };

        metrics.observe_finalize(&outcome);

        assert_eq!(metrics.checkouts_finalized.get(), 1);
        assert_eq!(metrics.stamp_failures.get(), 1);
        assert_eq!(metrics.sequence_fallbacks.get(), 1);
        assert_eq!(metrics.notification_failures.get(), 0);
        assert!(metrics.render().unwrap().contains("cwt_checkouts_finalized_total"));
    }
}
