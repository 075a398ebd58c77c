use serde::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub booking: BookingRules,
    pub pricing: PricingSettings,
}

/// Knobs for the consolidation engine itself.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    /// Leading segment of every booking number; customer-facing, do not
    /// change mid-year.
    pub prefix: String,
    /// Allow clock-seeded booking numbers when the counter is down.
    #[serde(default = "default_true")]
    pub sequence_fallback_enabled: bool,
    #[serde(default = "default_stamp_attempts")]
    pub stamp_retry_attempts: u32,
    #[serde(default = "default_stamp_base_ms")]
    pub stamp_retry_base_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_stamp_attempts() -> u32 {
    3
}

fn default_stamp_base_ms() -> u64 {
    50
}

/// Business-tunable pricing values. Converted into the catalog crate's
/// `PricingRules`/`AddOnCatalog` at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    pub service_fee_percent: f64,
    pub night_surcharge_cents: i64,
    pub night_window_start_hour: u32,
    pub night_window_end_hour: u32,
    #[serde(default)]
    pub add_on_prices_cents: HashMap<String, i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub confirmation_topic: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // `CWT__SERVER__PORT=8080` style environment overrides
            .add_source(config::Environment::with_prefix("CWT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
