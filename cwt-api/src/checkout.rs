use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use cwt_checkout::FinalizeRequest;
use cwt_core::payment::{CustomerContact, GatewayMetadata};
use cwt_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeCheckoutRequest {
    #[serde(default)]
    pub shuttle_group_ids: Vec<String>,
    #[serde(default)]
    pub tour_item_ids: Vec<i64>,
    pub transaction_id: Option<String>,
    pub auth_code: Option<String>,
    pub payment_code: Option<String>,
    pub payment_description: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeCheckoutResponse {
    pub booking_number: String,
    pub shuttle_vouchers: Vec<String>,
    pub tour_vouchers: Vec<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/checkout/finalize", post(finalize_checkout))
}

/// Called once the gateway reports a completed payment for a cart. Returns
/// the consolidated booking number plus every voucher code; per-item
/// persistence problems degrade into logs and metrics, never into a failed
/// response, because the customer's payment already went through.
async fn finalize_checkout(
    State(state): State<AppState>,
    Json(req): Json<FinalizeCheckoutRequest>,
) -> Result<Json<FinalizeCheckoutResponse>, AppError> {
    let raw_request = serde_json::to_value(&req).ok();

    let request = FinalizeRequest {
        shuttle_group_ids: req.shuttle_group_ids,
        tour_item_ids: req.tour_item_ids,
        gateway: GatewayMetadata {
            transaction_id: req.transaction_id,
            auth_code: req.auth_code,
            payment_code: req.payment_code,
            payment_description: req.payment_description,
        },
        customer: CustomerContact {
            name: req.customer_name,
            email: req.customer_email.map(Masked),
            phone: req.customer_phone.map(Masked),
        },
        raw_request,
    };

    let outcome = state
        .coordinator
        .finalize(&request)
        .await
        .map_err(AppError::from_checkout)?;

    state.metrics.observe_finalize(&outcome);
    info!(
        booking_number = %outcome.booking_number,
        vouchers = outcome.shuttle_vouchers.len() + outcome.tour_vouchers.len(),
        failed_stamps = outcome.failed_stamps.len(),
        "checkout finalized"
    );

    Ok(Json(FinalizeCheckoutResponse {
        booking_number: outcome.booking_number,
        shuttle_vouchers: outcome.shuttle_vouchers,
        tour_vouchers: outcome.tour_vouchers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_missing_lists() {
        let req: FinalizeCheckoutRequest = serde_json::from_str(
            r#"{"transactionId": "tx-9"}"#,
        )
        .unwrap();
        assert!(req.shuttle_group_ids.is_empty());
        assert!(req.tour_item_ids.is_empty());
        assert_eq!(req.transaction_id.as_deref(), Some("tx-9"));
    }

    #[test]
    fn response_uses_camel_case() {
        let response = FinalizeCheckoutResponse {
            booking_number: "CWT-2025-100".into(),
            shuttle_vouchers: vec!["CWT-2025-100-S1".into()],
            tour_vouchers: vec![],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["bookingNumber"], "CWT-2025-100");
        assert_eq!(json["shuttleVouchers"][0], "CWT-2025-100-S1");
    }
}
