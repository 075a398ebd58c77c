use crate::metrics::Metrics;
use cwt_catalog::PriceEngine;
use cwt_checkout::CheckoutCoordinator;
use cwt_store::{DbClient, RedisClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub redis: Arc<RedisClient>,
    pub coordinator: Arc<CheckoutCoordinator>,
    pub price_engine: Arc<PriceEngine>,
    pub metrics: Arc<Metrics>,
}
