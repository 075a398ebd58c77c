use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use chrono::NaiveTime;
use cwt_catalog::{Quote, ShuttleTariff, TourTariff};
use cwt_core::line_item::ItemKind;
use serde::{Deserialize, Serialize};

/// Quote endpoint used by the booking wizard at cart entry. The wizard
/// already holds the route's tariff from the routes listing, so the tariff
/// travels with the request and the engine stays pure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub item_type: ItemKind,
    pub passengers: u32,
    /// "HH:MM", shuttle trips only.
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub add_ons: Vec<String>,
    pub shuttle_tariff: Option<ShuttleTariff>,
    pub tour_tariff: Option<TourTariff>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub base_cents: i64,
    pub night_surcharge_cents: i64,
    pub add_ons_cents: i64,
    pub extras_cents: i64,
    pub service_fee_cents: i64,
    pub total_cents: i64,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            base_cents: quote.base_cents,
            night_surcharge_cents: quote.night_surcharge_cents,
            add_ons_cents: quote.add_ons_cents,
            extras_cents: quote.extras_cents,
            service_fee_cents: quote.service_fee_cents,
            total_cents: quote.total_cents,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/pricing/quote", post(quote))
}

async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let quote = match req.item_type {
        ItemKind::Shuttle => {
            let tariff = req.shuttle_tariff.as_ref().ok_or_else(|| {
                AppError::ValidationError("shuttleTariff is required for shuttle quotes".into())
            })?;
            let pickup_time = parse_pickup_time(req.pickup_time.as_deref())?;
            state
                .price_engine
                .shuttle_quote(tariff, req.passengers, pickup_time, &req.add_ons)
                .map_err(|e| AppError::ValidationError(e.to_string()))?
        }
        ItemKind::Tour => {
            let tariff = req.tour_tariff.as_ref().ok_or_else(|| {
                AppError::ValidationError("tourTariff is required for tour quotes".into())
            })?;
            state
                .price_engine
                .tour_quote(tariff, req.passengers)
                .map_err(|e| AppError::ValidationError(e.to_string()))?
        }
    };

    Ok(Json(quote.into()))
}

fn parse_pickup_time(raw: Option<&str>) -> Result<NaiveTime, AppError> {
    let raw = raw.ok_or_else(|| {
        AppError::ValidationError("pickupTime is required for shuttle quotes".into())
    })?;
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::ValidationError(format!("invalid pickupTime: {}", raw)))
}
