use uuid::Uuid;

/// Published once per finalized checkout. The notification service consumes
/// this and sends the consolidated confirmation email.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub booking_number: String,
    pub voucher_numbers: Vec<String>,
    pub total_cents: i64,
    pub timestamp: i64,
}

/// Emitted for every recorded payment attempt, successful or not.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PaymentAttemptRecordedEvent {
    pub attempt_id: Uuid,
    pub group_id: String,
    pub status: String,
    pub amount_cents: i64,
    pub currency: String,
    pub timestamp: i64,
}
