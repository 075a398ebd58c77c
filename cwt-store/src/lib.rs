pub mod app_config;
pub mod attempt_repo;
pub mod database;
pub mod events;
pub mod line_item_repo;
pub mod redis_repo;
pub mod sequence_repo;

pub use attempt_repo::PgAttemptLog;
pub use database::DbClient;
pub use events::{EventProducer, KafkaNotifier};
pub use line_item_repo::PgLineItemStore;
pub use redis_repo::RedisClient;
pub use sequence_repo::PgSequenceStore;
