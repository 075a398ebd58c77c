use cwt_core::line_item::ItemRef;
use cwt_core::payment::{GatewayMetadata, PaymentAttempt, PaymentStatus};
use cwt_core::repository::{AttemptLog, LineItemStore, StoreError};
use std::sync::Arc;
use tracing::warn;

/// Append-only audit log of payment attempts plus the cached status on each
/// line item.
///
/// The attempt log is the canonical payment record. Item status is a cache
/// of the latest outcome, which is why a missing column there is downgraded
/// to a warning while a missing audit table surfaces as the typed
/// `StoreError::NotConfigured`.
pub struct PaymentStateTracker {
    items: Arc<dyn LineItemStore>,
    attempts: Arc<dyn AttemptLog>,
}

impl PaymentStateTracker {
    pub fn new(items: Arc<dyn LineItemStore>, attempts: Arc<dyn AttemptLog>) -> Self {
        Self { items, attempts }
    }

    /// Append one immutable attempt row. Never fails silently: a missing
    /// audit table reaches the caller as `NotConfigured`, distinct from a
    /// generic storage failure, because that is a migration gap rather than
    /// a runtime fault.
    pub async fn record_attempt(&self, attempt: &PaymentAttempt) -> Result<(), StoreError> {
        self.attempts.append(attempt).await
    }

    /// Update one item's (or one shuttle group's) status and gateway
    /// metadata. Any status may overwrite any other, so re-delivery of an
    /// `approved` callback is a harmless rewrite; an overwrite away from
    /// `approved` is logged since it usually means a stale replay.
    pub async fn set_item_status(
        &self,
        item: &ItemRef,
        status: PaymentStatus,
        gateway: &GatewayMetadata,
    ) -> Result<(), StoreError> {
        if status != PaymentStatus::Approved {
            self.warn_on_downgrade(item, status).await;
        }

        match self.items.set_status(item, status, gateway).await {
            Ok(0) => {
                warn!(item = %item, "status update matched no rows");
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(StoreError::SchemaMismatch(detail)) => {
                // Known deployment gap: the column is not migrated yet. The
                // attempt log already holds the canonical record.
                warn!(item = %item, %detail, "item status column missing, skipping cache update");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn warn_on_downgrade(&self, item: &ItemRef, incoming: PaymentStatus) {
        match self.items.load(item).await {
            Ok(existing) => {
                if existing
                    .iter()
                    .any(|row| row.payment_status == PaymentStatus::Approved)
                {
                    warn!(
                        item = %item,
                        incoming = incoming.as_str(),
                        "overwriting an approved item with a non-approved status"
                    );
                }
            }
            Err(err) => {
                warn!(item = %item, error = %err, "could not check current status before overwrite");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cwt_core::line_item::{BookingStamp, LineItem};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeItems {
        statuses: Mutex<Vec<(ItemRef, PaymentStatus)>>,
        schema_gap: bool,
    }

    #[async_trait]
    impl LineItemStore for FakeItems {
        async fn stamp(&self, _item: &ItemRef, _stamp: &BookingStamp) -> Result<u64, StoreError> {
            unreachable!("tracker never stamps")
        }

        async fn set_status(
            &self,
            item: &ItemRef,
            status: PaymentStatus,
            _gateway: &GatewayMetadata,
        ) -> Result<u64, StoreError> {
            if self.schema_gap {
                return Err(StoreError::SchemaMismatch(
                    "column \"payment_status\" does not exist".into(),
                ));
            }
            self.statuses.lock().unwrap().push((item.clone(), status));
            Ok(1)
        }

        async fn load(&self, item: &ItemRef) -> Result<Vec<LineItem>, StoreError> {
            let last = self
                .statuses
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(recorded, _)| recorded == item)
                .map(|(_, status)| *status);
            Ok(last
                .map(|status| {
                    vec![LineItem {
                        id: 1,
                        kind: item.kind(),
                        legacy_group_id: None,
                        description: "fake".into(),
                        passengers: 2,
                        base_price_cents: 0,
                        night_surcharge_cents: None,
                        add_ons: None,
                        final_price_cents: 0,
                        payment_status: status,
                        gateway: GatewayMetadata::default(),
                        booking_number: None,
                        voucher_number: None,
                    }]
                })
                .unwrap_or_default())
        }

        async fn existing_booking_number(
            &self,
            _item: &ItemRef,
        ) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct FakeAttempts {
        rows: Mutex<Vec<PaymentAttempt>>,
        missing_table: bool,
    }

    #[async_trait]
    impl AttemptLog for FakeAttempts {
        async fn append(&self, attempt: &PaymentAttempt) -> Result<(), StoreError> {
            if self.missing_table {
                return Err(StoreError::NotConfigured(
                    "relation \"payment_attempts\" does not exist".into(),
                ));
            }
            self.rows.lock().unwrap().push(attempt.clone());
            Ok(())
        }
    }

    fn tracker(items: Arc<FakeItems>, attempts: Arc<FakeAttempts>) -> PaymentStateTracker {
        PaymentStateTracker::new(items, attempts)
    }

    #[tokio::test]
    async fn approved_redelivery_is_idempotent() {
        let items = Arc::new(FakeItems::default());
        let attempts = Arc::new(FakeAttempts::default());
        let tracker = tracker(items.clone(), attempts);

        let item = ItemRef::Tour(7);
        let meta = GatewayMetadata {
            transaction_id: Some("tx-1".into()),
            ..Default::default()
        };

        tracker
            .set_item_status(&item, PaymentStatus::Approved, &meta)
            .await
            .unwrap();
        tracker
            .set_item_status(&item, PaymentStatus::Approved, &meta)
            .await
            .unwrap();

        let statuses = items.statuses.lock().unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses
            .iter()
            .all(|(_, status)| *status == PaymentStatus::Approved));
    }

    #[tokio::test]
    async fn missing_status_column_is_not_fatal() {
        let items = Arc::new(FakeItems {
            schema_gap: true,
            ..Default::default()
        });
        let attempts = Arc::new(FakeAttempts::default());
        let tracker = tracker(items, attempts);

        let result = tracker
            .set_item_status(
                &ItemRef::ShuttleGroup("grp-1".into()),
                PaymentStatus::Rejected,
                &GatewayMetadata::default(),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_audit_table_surfaces_typed() {
        let items = Arc::new(FakeItems::default());
        let attempts = Arc::new(FakeAttempts {
            missing_table: true,
            ..Default::default()
        });
        let tracker = tracker(items, attempts);

        let attempt = PaymentAttempt::new("grp-1", cwt_core::AttemptStatus::Approved, 22600);
        assert!(matches!(
            tracker.record_attempt(&attempt).await,
            Err(StoreError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn downgrade_after_approval_still_writes() {
        // Permissive transitions preserved: the overwrite is logged, not
        // rejected.
        let items = Arc::new(FakeItems::default());
        let attempts = Arc::new(FakeAttempts::default());
        let tracker = tracker(items.clone(), attempts);

        let item = ItemRef::Tour(9);
        tracker
            .set_item_status(&item, PaymentStatus::Approved, &GatewayMetadata::default())
            .await
            .unwrap();
        tracker
            .set_item_status(&item, PaymentStatus::Pending, &GatewayMetadata::default())
            .await
            .unwrap();

        let statuses = items.statuses.lock().unwrap();
        assert_eq!(statuses.last().unwrap().1, PaymentStatus::Pending);
    }
}
