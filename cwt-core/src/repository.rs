use crate::line_item::{BookingStamp, ItemRef, LineItem};
use crate::payment::{GatewayMetadata, PaymentAttempt, PaymentStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Storage error taxonomy shared by every backend implementation.
///
/// `NotConfigured` and `SchemaMismatch` are deployment gaps (a migration has
/// not run yet), not runtime faults, and callers treat them differently from
/// ordinary unavailability.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("audit storage not configured: {0}")]
    NotConfigured(String),
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("storage timed out: {0}")]
    Timeout(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Transient faults worth retrying with backoff. Deployment gaps and
    /// missing rows are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout(_) | StoreError::Unavailable(_))
    }
}

/// Year-scoped atomic booking counter.
///
/// Implementations must advance the counter in a single atomic data-store
/// operation; read-increment-write in application code loses updates when
/// two checkouts race.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    async fn next_value(&self, year: i32) -> Result<i64, StoreError>;
}

/// Uniform access to the two line-item collections. `ItemRef` carries the
/// kind, so the fan-out loop in the coordinator is written once and the
/// per-table dispatch lives behind this seam.
#[async_trait]
pub trait LineItemStore: Send + Sync {
    /// Write booking number, voucher number, status and gateway metadata
    /// onto every row the reference selects. Returns the row count; writing
    /// the same stamp twice is a no-op by construction.
    async fn stamp(&self, item: &ItemRef, stamp: &BookingStamp) -> Result<u64, StoreError>;

    /// Update payment status and gateway metadata only.
    async fn set_status(
        &self,
        item: &ItemRef,
        status: PaymentStatus,
        gateway: &GatewayMetadata,
    ) -> Result<u64, StoreError>;

    /// Load the rows a reference selects (one per shuttle trip in a group,
    /// at most one for a tour).
    async fn load(&self, item: &ItemRef) -> Result<Vec<LineItem>, StoreError>;

    /// Booking number already stamped on the referenced rows, if any. Lets
    /// a retried checkout converge instead of burning a fresh number.
    async fn existing_booking_number(&self, item: &ItemRef) -> Result<Option<String>, StoreError>;
}

/// Append-only payment audit log.
#[async_trait]
pub trait AttemptLog: Send + Sync {
    async fn append(&self, attempt: &PaymentAttempt) -> Result<(), StoreError>;
}

/// The consolidated confirmation payload handed to the notification
/// service, once per finalized checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub booking_number: String,
    pub items: Vec<LineItem>,
    pub gateway: GatewayMetadata,
}

/// Outbound confirmation dispatch. Fire-and-forget: the coordinator logs a
/// failure here but never fails the checkout over it.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, request: &ConfirmationRequest) -> Result<(), StoreError>;
}
