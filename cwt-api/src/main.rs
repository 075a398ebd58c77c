use cwt_api::{app, metrics::Metrics, state::AppState};
use cwt_catalog::{AddOnCatalog, PriceEngine, PricingRules};
use cwt_checkout::{CheckoutCoordinator, PaymentStateTracker, RetryPolicy, SequenceAllocator};
use cwt_store::{
    DbClient, EventProducer, KafkaNotifier, PgAttemptLog, PgLineItemStore, PgSequenceStore,
    RedisClient,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cwt_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cwt_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting CWT checkout engine on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let db = Arc::new(db);

    let redis = Arc::new(
        RedisClient::new(&config.redis.url)
            .await
            .expect("Failed to connect to Redis"),
    );

    let kafka = EventProducer::new(&config.kafka.brokers).expect("Failed to create Kafka producer");
    let notifier = Arc::new(KafkaNotifier::new(
        kafka,
        config.kafka.confirmation_topic.clone(),
    ));

    let sequence_store = Arc::new(PgSequenceStore::new(db.pool.clone()));
    let line_items = Arc::new(PgLineItemStore::new(db.pool.clone()));
    let attempts = Arc::new(PgAttemptLog::new(db.pool.clone()));

    let allocator = SequenceAllocator::new(
        sequence_store,
        config.booking.prefix.clone(),
        config.booking.sequence_fallback_enabled,
    );
    let tracker = PaymentStateTracker::new(line_items.clone(), attempts);
    let coordinator = Arc::new(CheckoutCoordinator::new(
        allocator,
        line_items,
        tracker,
        notifier,
        RetryPolicy {
            attempts: config.booking.stamp_retry_attempts,
            base_delay: Duration::from_millis(config.booking.stamp_retry_base_ms),
        },
    ));

    let price_engine = Arc::new(PriceEngine::new(
        PricingRules {
            service_fee_percent: config.pricing.service_fee_percent,
            night_surcharge_cents: config.pricing.night_surcharge_cents,
            night_window_start_hour: config.pricing.night_window_start_hour,
            night_window_end_hour: config.pricing.night_window_end_hour,
        },
        if config.pricing.add_on_prices_cents.is_empty() {
            AddOnCatalog::standard()
        } else {
            AddOnCatalog::new(config.pricing.add_on_prices_cents.clone())
        },
    ));

    let metrics = Arc::new(Metrics::new().expect("Failed to build metrics registry"));

    let app_state = AppState {
        db,
        redis,
        coordinator,
        price_engine,
        metrics,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
