use crate::payment::{GatewayMetadata, PaymentStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator for the two purchasable kinds. The tag letter appears in
/// customer-facing voucher numbers, so it is an external contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Shuttle,
    Tour,
}

impl ItemKind {
    pub fn type_tag(&self) -> &'static str {
        match self {
            ItemKind::Shuttle => "S",
            ItemKind::Tour => "T",
        }
    }
}

/// Reference to one stampable unit of a cart.
///
/// Shuttle trips created together in one booking flow share a legacy group
/// id and are stamped as a unit (they receive the same voucher). A tour
/// reservation is addressed by its own row id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemRef {
    ShuttleGroup(String),
    Tour(i64),
}

impl ItemRef {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::ShuttleGroup(_) => ItemKind::Shuttle,
            ItemRef::Tour(_) => ItemKind::Tour,
        }
    }

    /// Key used for attempt-log rows and failure reporting.
    pub fn group_key(&self) -> String {
        match self {
            ItemRef::ShuttleGroup(group_id) => group_id.clone(),
            ItemRef::Tour(id) => format!("tour-{}", id),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::ShuttleGroup(group_id) => write!(f, "shuttle group {}", group_id),
            ItemRef::Tour(id) => write!(f, "tour reservation {}", id),
        }
    }
}

/// A single purchasable unit, polymorphic over shuttle trips and tour
/// reservations. Created at cart entry with `payment_status = pending` and
/// no booking/voucher number; mutated in place during reconciliation; never
/// deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub kind: ItemKind,
    /// Shared by all shuttle trips created together; `None` for tours.
    pub legacy_group_id: Option<String>,
    pub description: String,
    pub passengers: i32,
    pub base_price_cents: i64,
    pub night_surcharge_cents: Option<i64>,
    pub add_ons: Option<Vec<String>>,
    pub final_price_cents: i64,
    pub payment_status: PaymentStatus,
    pub gateway: GatewayMetadata,
    pub booking_number: Option<String>,
    pub voucher_number: Option<String>,
}

/// Everything written onto a line item once its checkout is finalized.
#[derive(Debug, Clone)]
pub struct BookingStamp {
    pub booking_number: String,
    pub voucher_number: String,
    pub status: PaymentStatus,
    pub gateway: GatewayMetadata,
}
