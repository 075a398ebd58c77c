use chrono::{DateTime, Utc};
use cwt_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current payment state stored on each line item.
///
/// Transitions are deliberately permissive: any status may overwrite any
/// other, so a re-delivered gateway callback is idempotent instead of an
/// error. The append-only attempt log is the canonical record; this enum is
/// a cache of the latest outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Error,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Error => "error",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

/// Status of one gateway round trip, as recorded in the attempt log.
/// `Initiated` exists only here: an attempt is logged before the gateway
/// answers, a line item never is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Initiated,
    Pending,
    Approved,
    Rejected,
    Error,
    Cancelled,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Initiated => "initiated",
            AttemptStatus::Pending => "pending",
            AttemptStatus::Approved => "approved",
            AttemptStatus::Rejected => "rejected",
            AttemptStatus::Error => "error",
            AttemptStatus::Cancelled => "cancelled",
        }
    }
}

impl From<PaymentStatus> for AttemptStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => AttemptStatus::Pending,
            PaymentStatus::Approved => AttemptStatus::Approved,
            PaymentStatus::Rejected => AttemptStatus::Rejected,
            PaymentStatus::Error => AttemptStatus::Error,
            PaymentStatus::Cancelled => AttemptStatus::Cancelled,
        }
    }
}

/// Opaque fields echoed back by the payment gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayMetadata {
    pub transaction_id: Option<String>,
    pub auth_code: Option<String>,
    pub payment_code: Option<String>,
    pub payment_description: Option<String>,
}

/// Customer contact fields carried on an attempt row. Masked so they never
/// leak through `tracing` debug output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: Option<String>,
    pub email: Option<Masked<String>>,
    pub phone: Option<Masked<String>>,
}

/// One immutable row in the payment audit log. One attempt is appended per
/// gateway round trip, failed ones included; rows are never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAttempt {
    pub id: Uuid,
    pub group_id: String,
    pub status: AttemptStatus,
    pub amount_cents: i64,
    pub currency: String,
    pub gateway: GatewayMetadata,
    pub customer: CustomerContact,
    pub raw_request: Option<serde_json::Value>,
    pub raw_response: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl PaymentAttempt {
    pub fn new(group_id: impl Into<String>, status: AttemptStatus, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id: group_id.into(),
            status,
            amount_cents,
            currency: "USD".to_string(),
            gateway: GatewayMetadata::default(),
            customer: CustomerContact::default(),
            raw_request: None,
            raw_response: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_gateway(mut self, gateway: GatewayMetadata) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_customer(mut self, customer: CustomerContact) -> Self {
        self.customer = customer;
        self
    }

    pub fn with_raw_request(mut self, raw: serde_json::Value) -> Self {
        self.raw_request = Some(raw);
        self
    }
}
