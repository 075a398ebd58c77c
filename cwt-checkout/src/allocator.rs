use chrono::{Datelike, Utc};
use cwt_core::repository::{SequenceStore, StoreError};
use cwt_core::voucher;
use rand::Rng;
use std::sync::Arc;
use tracing::warn;

/// Floor for clock-seeded numbers. Keeps degraded-mode output far above
/// anything the real counter will reach, so the two ranges cannot collide.
const FALLBACK_FLOOR: i64 = 9_000_000_000;

#[derive(Debug, thiserror::Error)]
pub enum AllocatorError {
    #[error("booking sequence unavailable: {0}")]
    Unavailable(#[from] StoreError),
}

/// A freshly issued booking number. `degraded` is set when the number came
/// from the clock-seeded fallback instead of the atomic counter; operators
/// watch a metric fed from this flag.
#[derive(Debug, Clone)]
pub struct AllocatedNumber {
    pub booking_number: String,
    pub degraded: bool,
}

/// Issues year-scoped, strictly increasing booking numbers.
///
/// The increment itself happens inside the data store (single atomic
/// upsert), never as read-modify-write here, so concurrent checkouts are
/// linearizable with respect to each other.
pub struct SequenceAllocator {
    store: Arc<dyn SequenceStore>,
    prefix: String,
    fallback_enabled: bool,
}

impl SequenceAllocator {
    pub fn new(store: Arc<dyn SequenceStore>, prefix: impl Into<String>, fallback_enabled: bool) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            fallback_enabled,
        }
    }

    pub async fn allocate(&self) -> Result<AllocatedNumber, AllocatorError> {
        let year = Utc::now().year();
        match self.store.next_value(year).await {
            Ok(sequence) => Ok(AllocatedNumber {
                booking_number: voucher::booking_number(&self.prefix, year, sequence),
                degraded: false,
            }),
            Err(err) if self.fallback_enabled => {
                warn!(
                    error = %err,
                    "sequence counter unreachable, issuing clock-seeded booking number; \
                     global uniqueness is not guaranteed until the counter recovers"
                );
                Ok(AllocatedNumber {
                    booking_number: voucher::booking_number(&self.prefix, year, clock_seeded()),
                    degraded: true,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Wall-clock millis plus a small random component. Pseudo-unique only:
/// good enough to let a customer finish checkout while the counter is down.
fn clock_seeded() -> i64 {
    let millis = Utc::now().timestamp_millis();
    let jitter = rand::thread_rng().gen_range(0..1000);
    FALLBACK_FLOOR + (millis % FALLBACK_FLOOR) * 1000 + jitter
}
