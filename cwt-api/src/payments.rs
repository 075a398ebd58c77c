use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use cwt_core::line_item::{ItemKind, ItemRef};
use cwt_core::payment::{CustomerContact, GatewayMetadata, PaymentAttempt, PaymentStatus};
use cwt_shared::pii::Masked;
use serde::{Deserialize, Serialize};

/// Single-item mirror of the cart finalize flow, used by non-cart bookings
/// and by gateway callbacks that report one group at a time.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentStatusRequest {
    pub group_id: Option<String>,
    pub item_id: Option<i64>,
    pub item_type: ItemKind,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub auth_code: Option<String>,
    pub payment_code: Option<String>,
    pub payment_description: Option<String>,
    #[serde(default)]
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentStatusResponse {
    pub success: bool,
    pub booking_number: Option<String>,
    pub voucher_number: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/payments/status", post(record_payment_status))
}

async fn record_payment_status(
    State(state): State<AppState>,
    Json(req): Json<RecordPaymentStatusRequest>,
) -> Result<Json<RecordPaymentStatusResponse>, AppError> {
    let item = item_ref(&req)?;
    let raw_request = serde_json::to_value(&req).ok();

    let mut attempt = PaymentAttempt::new(item.group_key(), req.payment_status.into(), req.amount_cents)
        .with_gateway(GatewayMetadata {
            transaction_id: req.transaction_id.clone(),
            auth_code: req.auth_code.clone(),
            payment_code: req.payment_code.clone(),
            payment_description: req.payment_description.clone(),
        })
        .with_customer(CustomerContact {
            name: req.customer_name.clone(),
            email: req.customer_email.clone().map(Masked),
            phone: req.customer_phone.clone().map(Masked),
        });
    if let Some(currency) = &req.currency {
        attempt.currency = currency.clone();
    }
    if let Some(raw) = raw_request {
        attempt = attempt.with_raw_request(raw);
    }

    let outcome = state
        .coordinator
        .record_single(&item, req.payment_status, attempt)
        .await
        .map_err(AppError::from_checkout)?;

    Ok(Json(RecordPaymentStatusResponse {
        success: outcome.success,
        booking_number: outcome.booking_number,
        voucher_number: outcome.voucher_number,
    }))
}

fn item_ref(req: &RecordPaymentStatusRequest) -> Result<ItemRef, AppError> {
    match req.item_type {
        ItemKind::Shuttle => req
            .group_id
            .clone()
            .map(ItemRef::ShuttleGroup)
            .ok_or_else(|| {
                AppError::ValidationError("groupId is required for shuttle items".to_string())
            }),
        ItemKind::Tour => req.item_id.map(ItemRef::Tour).ok_or_else(|| {
            AppError::ValidationError("itemId is required for tour items".to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request(json: &str) -> RecordPaymentStatusRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn shuttle_requests_need_a_group_id() {
        let req = base_request(r#"{"itemType": "shuttle", "paymentStatus": "approved"}"#);
        assert!(item_ref(&req).is_err());

        let req = base_request(
            r#"{"itemType": "shuttle", "paymentStatus": "approved", "groupId": "grp-1"}"#,
        );
        assert_eq!(
            item_ref(&req).unwrap(),
            ItemRef::ShuttleGroup("grp-1".into())
        );
    }

    #[test]
    fn tour_requests_need_an_item_id() {
        let req = base_request(r#"{"itemType": "tour", "paymentStatus": "rejected"}"#);
        assert!(item_ref(&req).is_err());

        let req = base_request(r#"{"itemType": "tour", "paymentStatus": "rejected", "itemId": 8}"#);
        assert_eq!(item_ref(&req).unwrap(), ItemRef::Tour(8));
    }

    #[test]
    fn gateway_statuses_deserialize_lowercase() {
        let req = base_request(
            r#"{"itemType": "tour", "itemId": 1, "paymentStatus": "cancelled", "amountCents": 500}"#,
        );
        assert_eq!(req.payment_status, PaymentStatus::Cancelled);
        assert_eq!(req.amount_cents, 500);
    }
}
