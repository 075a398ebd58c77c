use crate::allocator::{AllocatedNumber, AllocatorError, SequenceAllocator};
use crate::tracker::PaymentStateTracker;
use cwt_core::line_item::{BookingStamp, ItemKind, ItemRef, LineItem};
use cwt_core::payment::{
    AttemptStatus, CustomerContact, GatewayMetadata, PaymentAttempt, PaymentStatus,
};
use cwt_core::repository::{ConfirmationRequest, LineItemStore, NotificationSink, StoreError};
use cwt_core::voucher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty: no shuttle groups or tour reservations to finalize")]
    EmptyCart,
    #[error(transparent)]
    Sequence(#[from] AllocatorError),
}

/// Bounded exponential backoff for per-item stamp writes.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinalizeRequest {
    pub shuttle_group_ids: Vec<String>,
    pub tour_item_ids: Vec<i64>,
    pub gateway: GatewayMetadata,
    pub customer: CustomerContact,
    pub raw_request: Option<serde_json::Value>,
}

/// What a finished finalize call reports. The voucher lists are always
/// complete, including entries whose persistence write failed: codes are
/// deterministically derivable from the booking number, so the response
/// never depends on storage having kept up.
#[derive(Debug, Clone, Serialize)]
pub struct FinalizeOutcome {
    pub booking_number: String,
    pub shuttle_vouchers: Vec<String>,
    pub tour_vouchers: Vec<String>,
    /// Item refs whose stamp never persisted, for metrics/alerting.
    pub failed_stamps: Vec<String>,
    /// Booking number came from the clock-seeded fallback.
    pub sequence_degraded: bool,
    pub notification_failed: bool,
}

/// Result of the single-item mirror used by the payment-status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SingleOutcome {
    pub success: bool,
    pub booking_number: Option<String>,
    pub voucher_number: Option<String>,
}

/// Orchestrates booking consolidation once a payment result is known.
///
/// The line items live in two independent collections and there is no
/// cross-collection transaction, so this runs as a saga of individually
/// idempotent steps: allocate (or reuse) one booking number, stamp each
/// unit best-effort in stable input order, notify once. The only fatal
/// condition is failing to obtain a booking number at all; everything else
/// degrades into logs and metrics because, from the customer's side, the
/// payment already succeeded.
pub struct CheckoutCoordinator {
    allocator: SequenceAllocator,
    items: Arc<dyn LineItemStore>,
    tracker: PaymentStateTracker,
    notifier: Arc<dyn NotificationSink>,
    retry: RetryPolicy,
}

impl CheckoutCoordinator {
    pub fn new(
        allocator: SequenceAllocator,
        items: Arc<dyn LineItemStore>,
        tracker: PaymentStateTracker,
        notifier: Arc<dyn NotificationSink>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            allocator,
            items,
            tracker,
            notifier,
            retry,
        }
    }

    pub async fn finalize(&self, req: &FinalizeRequest) -> Result<FinalizeOutcome, CheckoutError> {
        self.finalize_with_attempt(req, None).await
    }

    /// `attempt` carries a caller-supplied audit record (the single-item
    /// flow): it is appended verbatim so the log keeps the amount and
    /// currency the gateway actually reported. Without one, the cart flow
    /// derives the amount from the stamped items.
    async fn finalize_with_attempt(
        &self,
        req: &FinalizeRequest,
        attempt: Option<PaymentAttempt>,
    ) -> Result<FinalizeOutcome, CheckoutError> {
        if req.shuttle_group_ids.is_empty() && req.tour_item_ids.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let allocated = self.obtain_booking_number(req).await?;
        let booking_number = allocated.booking_number.clone();
        info!(%booking_number, degraded = allocated.degraded, "finalizing checkout");

        let mut failed_stamps = Vec::new();

        // Ordinals are customer-visible: strict input order, numbered per
        // type, shuttles first.
        let mut shuttle_vouchers = Vec::with_capacity(req.shuttle_group_ids.len());
        for (index, group_id) in req.shuttle_group_ids.iter().enumerate() {
            let item = ItemRef::ShuttleGroup(group_id.clone());
            let voucher =
                voucher::voucher_number(&booking_number, ItemKind::Shuttle, index as u32 + 1);
            self.stamp_with_retry(&item, &booking_number, &voucher, &req.gateway, &mut failed_stamps)
                .await;
            shuttle_vouchers.push(voucher);
        }

        let mut tour_vouchers = Vec::with_capacity(req.tour_item_ids.len());
        for (index, item_id) in req.tour_item_ids.iter().enumerate() {
            let item = ItemRef::Tour(*item_id);
            let voucher = voucher::voucher_number(&booking_number, ItemKind::Tour, index as u32 + 1);
            self.stamp_with_retry(&item, &booking_number, &voucher, &req.gateway, &mut failed_stamps)
                .await;
            tour_vouchers.push(voucher);
        }

        let stamped_items = self.load_stamped_items(req).await;
        match attempt {
            Some(attempt) => self.record_attempt_best_effort(&attempt).await,
            None => {
                self.record_approved_attempt(req, &booking_number, &stamped_items)
                    .await
            }
        }
        let notification_failed = self
            .send_confirmation(&booking_number, stamped_items, &req.gateway)
            .await;

        Ok(FinalizeOutcome {
            booking_number,
            shuttle_vouchers,
            tour_vouchers,
            failed_stamps,
            sequence_degraded: allocated.degraded,
            notification_failed,
        })
    }

    /// Single group/item mirror of `finalize`, used by the payment-status
    /// endpoint for non-cart flows. Records the attempt whatever the
    /// outcome; only `approved` triggers allocation.
    pub async fn record_single(
        &self,
        item: &ItemRef,
        status: PaymentStatus,
        attempt: PaymentAttempt,
    ) -> Result<SingleOutcome, CheckoutError> {
        let gateway = attempt.gateway.clone();
        let customer = attempt.customer.clone();

        if status == PaymentStatus::Approved {
            let req = match item {
                ItemRef::ShuttleGroup(group_id) => FinalizeRequest {
                    shuttle_group_ids: vec![group_id.clone()],
                    gateway,
                    customer,
                    raw_request: attempt.raw_request.clone(),
                    ..Default::default()
                },
                ItemRef::Tour(id) => FinalizeRequest {
                    tour_item_ids: vec![*id],
                    gateway,
                    customer,
                    raw_request: attempt.raw_request.clone(),
                    ..Default::default()
                },
            };
            let outcome = self.finalize_with_attempt(&req, Some(attempt)).await?;
            let voucher_number = outcome
                .shuttle_vouchers
                .first()
                .or_else(|| outcome.tour_vouchers.first())
                .cloned();
            return Ok(SingleOutcome {
                success: true,
                booking_number: Some(outcome.booking_number),
                voucher_number,
            });
        }

        self.record_attempt_best_effort(&attempt).await;

        let success = match self.tracker.set_item_status(item, status, &gateway).await {
            Ok(()) => true,
            Err(err) => {
                error!(item = %item, error = %err, "failed to record payment status");
                false
            }
        };

        Ok(SingleOutcome {
            success,
            booking_number: None,
            voucher_number: None,
        })
    }

    /// A retried checkout converges on the number already stamped during a
    /// previous partial success instead of burning a fresh one.
    async fn obtain_booking_number(
        &self,
        req: &FinalizeRequest,
    ) -> Result<AllocatedNumber, CheckoutError> {
        let first = req
            .shuttle_group_ids
            .first()
            .map(|group_id| ItemRef::ShuttleGroup(group_id.clone()))
            .or_else(|| req.tour_item_ids.first().map(|id| ItemRef::Tour(*id)));

        if let Some(item) = first {
            match self.items.existing_booking_number(&item).await {
                Ok(Some(existing)) => {
                    info!(booking_number = %existing, "reusing booking number from earlier attempt");
                    return Ok(AllocatedNumber {
                        booking_number: existing,
                        degraded: false,
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "could not check for an existing booking number");
                }
            }
        }

        Ok(self.allocator.allocate().await?)
    }

    /// Best-effort stamp of one unit. Transient failures are retried with
    /// exponential backoff; anything that still fails is logged and pushed
    /// to `failed`, never aborting the remaining units. A missing column is
    /// a deployment gap and counts as placed (the audit log is canonical).
    async fn stamp_with_retry(
        &self,
        item: &ItemRef,
        booking_number: &str,
        voucher_number: &str,
        gateway: &GatewayMetadata,
        failed: &mut Vec<String>,
    ) {
        let stamp = BookingStamp {
            booking_number: booking_number.to_string(),
            voucher_number: voucher_number.to_string(),
            status: PaymentStatus::Approved,
            gateway: gateway.clone(),
        };

        // A misconfigured zero still means one try: skipping the write
        // entirely would drop the stamp without even reporting it.
        let attempts = self.retry.attempts.max(1);
        let mut delay = self.retry.base_delay;
        for attempt in 1..=attempts {
            match self.items.stamp(item, &stamp).await {
                Ok(0) => {
                    warn!(item = %item, %voucher_number, "stamp matched no rows");
                    failed.push(item.to_string());
                    return;
                }
                Ok(rows) => {
                    info!(item = %item, %voucher_number, rows, "stamped");
                    return;
                }
                Err(StoreError::SchemaMismatch(detail)) => {
                    warn!(item = %item, %detail, "stamp column missing, audit log remains canonical");
                    return;
                }
                Err(err) if err.is_retryable() && attempt < attempts => {
                    warn!(item = %item, %err, attempt, "stamp failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => {
                    error!(item = %item, %voucher_number, %err, "stamp failed permanently");
                    failed.push(item.to_string());
                    return;
                }
            }
        }
    }

    async fn load_stamped_items(&self, req: &FinalizeRequest) -> Vec<LineItem> {
        let mut items = Vec::new();
        let refs = req
            .shuttle_group_ids
            .iter()
            .map(|group_id| ItemRef::ShuttleGroup(group_id.clone()))
            .chain(req.tour_item_ids.iter().map(|id| ItemRef::Tour(*id)));

        for item in refs {
            match self.items.load(&item).await {
                Ok(rows) => items.extend(rows),
                Err(err) => {
                    warn!(item = %item, error = %err, "could not load item for confirmation payload");
                }
            }
        }
        items
    }

    async fn record_approved_attempt(
        &self,
        req: &FinalizeRequest,
        booking_number: &str,
        stamped_items: &[LineItem],
    ) {
        let group_key = req
            .shuttle_group_ids
            .first()
            .cloned()
            .unwrap_or_else(|| booking_number.to_string());
        let total_cents: i64 = stamped_items.iter().map(|item| item.final_price_cents).sum();

        let mut attempt = PaymentAttempt::new(group_key, AttemptStatus::Approved, total_cents)
            .with_gateway(req.gateway.clone())
            .with_customer(req.customer.clone());
        if let Some(raw) = &req.raw_request {
            attempt = attempt.with_raw_request(raw.clone());
        }

        self.record_attempt_best_effort(&attempt).await;
    }

    pub async fn record_attempt_best_effort(&self, attempt: &PaymentAttempt) {
        match self.tracker.record_attempt(attempt).await {
            Ok(()) => {}
            Err(StoreError::NotConfigured(detail)) => {
                warn!(%detail, "payment audit table not migrated, attempt not logged");
            }
            Err(err) => {
                error!(error = %err, "failed to append payment attempt");
            }
        }
    }

    /// Fire-and-forget confirmation. Failure is logged and flagged for
    /// metrics; the booking stands either way.
    async fn send_confirmation(
        &self,
        booking_number: &str,
        items: Vec<LineItem>,
        gateway: &GatewayMetadata,
    ) -> bool {
        let request = ConfirmationRequest {
            booking_number: booking_number.to_string(),
            items,
            gateway: gateway.clone(),
        };
        match self.notifier.send(&request).await {
            Ok(()) => false,
            Err(err) => {
                error!(%booking_number, error = %err, "confirmation dispatch failed");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cwt_core::repository::{AttemptLog, SequenceStore};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
    use std::sync::Mutex;

    struct FakeSequence {
        next: AtomicI64,
        calls: AtomicU32,
    }

    impl FakeSequence {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                next: AtomicI64::new(0),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl SequenceStore for FakeSequence {
        async fn next_value(&self, _year: i32) -> Result<i64, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.next.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    #[derive(Default)]
    struct FakeItems {
        stamps: Mutex<Vec<(ItemRef, BookingStamp)>>,
        /// Group keys whose stamp permanently fails.
        fail_keys: HashSet<String>,
        /// Group keys that fail once with a timeout, then succeed.
        flaky_keys: HashSet<String>,
        flaky_seen: Mutex<HashSet<String>>,
        existing_numbers: HashMap<String, String>,
    }

    #[async_trait]
    impl LineItemStore for FakeItems {
        async fn stamp(&self, item: &ItemRef, stamp: &BookingStamp) -> Result<u64, StoreError> {
            let key = item.group_key();
            if self.fail_keys.contains(&key) {
                return Err(StoreError::NotFound(format!("{} missing", item)));
            }
            if self.flaky_keys.contains(&key) && self.flaky_seen.lock().unwrap().insert(key) {
                return Err(StoreError::Timeout("simulated timeout".into()));
            }
            self.stamps
                .lock()
                .unwrap()
                .push((item.clone(), stamp.clone()));
            Ok(1)
        }

        async fn set_status(
            &self,
            _item: &ItemRef,
            _status: PaymentStatus,
            _gateway: &GatewayMetadata,
        ) -> Result<u64, StoreError> {
            Ok(1)
        }

        async fn load(&self, item: &ItemRef) -> Result<Vec<LineItem>, StoreError> {
            let stamps = self.stamps.lock().unwrap();
            Ok(stamps
                .iter()
                .filter(|(stamped, _)| stamped == item)
                .map(|(stamped, stamp)| LineItem {
                    id: 1,
                    kind: stamped.kind(),
                    legacy_group_id: match stamped {
                        ItemRef::ShuttleGroup(group_id) => Some(group_id.clone()),
                        ItemRef::Tour(_) => None,
                    },
                    description: "fake".into(),
                    passengers: 2,
                    base_price_cents: 20000,
                    night_surcharge_cents: None,
                    add_ons: None,
                    final_price_cents: 22600,
                    payment_status: stamp.status,
                    gateway: stamp.gateway.clone(),
                    booking_number: Some(stamp.booking_number.clone()),
                    voucher_number: Some(stamp.voucher_number.clone()),
                })
                .collect())
        }

        async fn existing_booking_number(
            &self,
            item: &ItemRef,
        ) -> Result<Option<String>, StoreError> {
            Ok(self.existing_numbers.get(&item.group_key()).cloned())
        }
    }

    #[derive(Default)]
    struct FakeAttempts {
        rows: Mutex<Vec<PaymentAttempt>>,
    }

    #[async_trait]
    impl AttemptLog for FakeAttempts {
        async fn append(&self, attempt: &PaymentAttempt) -> Result<(), StoreError> {
            self.rows.lock().unwrap().push(attempt.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        sent: Mutex<Vec<ConfirmationRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for FakeNotifier {
        async fn send(&self, request: &ConfirmationRequest) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("broker down".into()));
            }
            self.sent.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    struct Harness {
        sequence: Arc<FakeSequence>,
        items: Arc<FakeItems>,
        attempts: Arc<FakeAttempts>,
        notifier: Arc<FakeNotifier>,
        coordinator: CheckoutCoordinator,
    }

    fn harness(items: FakeItems, notifier: FakeNotifier) -> Harness {
        let sequence = FakeSequence::new();
        let items = Arc::new(items);
        let attempts = Arc::new(FakeAttempts::default());
        let notifier = Arc::new(notifier);
        let coordinator = CheckoutCoordinator::new(
            SequenceAllocator::new(sequence.clone(), "CWT", false),
            items.clone(),
            PaymentStateTracker::new(items.clone(), attempts.clone()),
            notifier.clone(),
            RetryPolicy {
                attempts: 3,
                base_delay: Duration::from_millis(1),
            },
        );
        Harness {
            sequence,
            items,
            attempts,
            notifier,
            coordinator,
        }
    }

    fn cart(shuttles: &[&str], tours: &[i64]) -> FinalizeRequest {
        FinalizeRequest {
            shuttle_group_ids: shuttles.iter().map(|s| s.to_string()).collect(),
            tour_item_ids: tours.to_vec(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_before_allocation() {
        let h = harness(FakeItems::default(), FakeNotifier::default());

        let result = h.coordinator.finalize(&cart(&[], &[])).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert_eq!(h.sequence.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn vouchers_are_numbered_per_type() {
        let h = harness(FakeItems::default(), FakeNotifier::default());

        let outcome = h
            .coordinator
            .finalize(&cart(&["grp-a", "grp-b"], &[11]))
            .await
            .unwrap();

        let b = &outcome.booking_number;
        assert_eq!(
            outcome.shuttle_vouchers,
            vec![format!("{b}-S1"), format!("{b}-S2")]
        );
        assert_eq!(outcome.tour_vouchers, vec![format!("{b}-T1")]);
        assert!(outcome.failed_stamps.is_empty());
    }

    #[tokio::test]
    async fn one_failing_group_never_aborts_the_rest() {
        let mut items = FakeItems::default();
        items.fail_keys.insert("grp-2".to_string());
        let h = harness(items, FakeNotifier::default());

        let outcome = h
            .coordinator
            .finalize(&cart(&["grp-1", "grp-2", "grp-3"], &[]))
            .await
            .unwrap();

        // All three codes come back even though group 2 never persisted.
        assert_eq!(outcome.shuttle_vouchers.len(), 3);
        assert_eq!(outcome.failed_stamps, vec!["shuttle group grp-2"]);

        let stamped: Vec<String> = h
            .items
            .stamps
            .lock()
            .unwrap()
            .iter()
            .map(|(item, _)| item.group_key())
            .collect();
        assert_eq!(stamped, vec!["grp-1", "grp-3"]);
    }

    #[tokio::test]
    async fn transient_stamp_failures_are_retried() {
        let mut items = FakeItems::default();
        items.flaky_keys.insert("grp-1".to_string());
        let h = harness(items, FakeNotifier::default());

        let outcome = h.coordinator.finalize(&cart(&["grp-1"], &[])).await.unwrap();
        assert!(outcome.failed_stamps.is_empty());
        assert_eq!(h.items.stamps.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn retry_reuses_existing_booking_number() {
        let mut items = FakeItems::default();
        items
            .existing_numbers
            .insert("grp-1".to_string(), "CWT-2025-41".to_string());
        let h = harness(items, FakeNotifier::default());

        let outcome = h
            .coordinator
            .finalize(&cart(&["grp-1", "grp-2"], &[]))
            .await
            .unwrap();

        assert_eq!(outcome.booking_number, "CWT-2025-41");
        assert_eq!(outcome.shuttle_vouchers[0], "CWT-2025-41-S1");
        // No fresh number was burned.
        assert_eq!(h.sequence.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_checkout() {
        let h = harness(
            FakeItems::default(),
            FakeNotifier {
                fail: true,
                ..Default::default()
            },
        );

        let outcome = h.coordinator.finalize(&cart(&["grp-1"], &[])).await.unwrap();
        assert!(outcome.notification_failed);
        assert!(!outcome.booking_number.is_empty());
    }

    #[tokio::test]
    async fn confirmation_carries_all_stamped_items_once() {
        let h = harness(FakeItems::default(), FakeNotifier::default());

        h.coordinator
            .finalize(&cart(&["grp-a"], &[5]))
            .await
            .unwrap();

        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].items.len(), 2);
    }

    #[tokio::test]
    async fn finalize_records_one_approved_attempt() {
        let h = harness(FakeItems::default(), FakeNotifier::default());

        h.coordinator
            .finalize(&cart(&["grp-a"], &[]))
            .await
            .unwrap();

        let rows = h.attempts.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttemptStatus::Approved);
        assert_eq!(rows[0].amount_cents, 22600);
        assert_eq!(rows[0].group_id, "grp-a");
    }

    #[tokio::test]
    async fn record_single_approved_allocates_and_stamps() {
        let h = harness(FakeItems::default(), FakeNotifier::default());

        let attempt = PaymentAttempt::new("tour-8", AttemptStatus::Approved, 23000);
        let outcome = h
            .coordinator
            .record_single(&ItemRef::Tour(8), PaymentStatus::Approved, attempt)
            .await
            .unwrap();

        assert!(outcome.success);
        let booking_number = outcome.booking_number.unwrap();
        assert_eq!(
            outcome.voucher_number.unwrap(),
            format!("{booking_number}-T1")
        );
    }

    #[tokio::test]
    async fn record_single_approved_keeps_the_supplied_audit_record() {
        let h = harness(FakeItems::default(), FakeNotifier::default());

        let mut attempt = PaymentAttempt::new("tour-8", AttemptStatus::Approved, 23000);
        attempt.currency = "EUR".to_string();
        h.coordinator
            .record_single(&ItemRef::Tour(8), PaymentStatus::Approved, attempt)
            .await
            .unwrap();

        // The gateway-reported amount and currency land in the log, not a
        // re-derived total.
        let rows = h.attempts.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount_cents, 23000);
        assert_eq!(rows[0].currency, "EUR");
        assert_eq!(rows[0].group_id, "tour-8");
    }

    #[tokio::test]
    async fn zero_retry_attempts_still_stamps_once() {
        let sequence = FakeSequence::new();
        let items = Arc::new(FakeItems::default());
        let attempts = Arc::new(FakeAttempts::default());
        let notifier = Arc::new(FakeNotifier::default());
        let coordinator = CheckoutCoordinator::new(
            SequenceAllocator::new(sequence, "CWT", false),
            items.clone(),
            PaymentStateTracker::new(items.clone(), attempts),
            notifier,
            RetryPolicy {
                attempts: 0,
                base_delay: Duration::from_millis(1),
            },
        );

        let outcome = coordinator.finalize(&cart(&["grp-1"], &[])).await.unwrap();
        assert!(outcome.failed_stamps.is_empty());
        assert_eq!(items.stamps.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn record_single_rejected_never_allocates() {
        let h = harness(FakeItems::default(), FakeNotifier::default());

        let attempt = PaymentAttempt::new("grp-x", AttemptStatus::Rejected, 0);
        let outcome = h
            .coordinator
            .record_single(
                &ItemRef::ShuttleGroup("grp-x".into()),
                PaymentStatus::Rejected,
                attempt,
            )
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.booking_number.is_none());
        assert_eq!(h.sequence.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.attempts.rows.lock().unwrap().len(), 1);
    }
}
