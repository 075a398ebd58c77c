use cwt_core::repository::StoreError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Maps driver errors onto the shared taxonomy. Postgres error codes:
/// `42P01` undefined table, `42703` undefined column. Both are deployment
/// gaps, not runtime faults.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("42P01") => StoreError::NotConfigured(db_err.message().to_string()),
            Some("42703") => StoreError::SchemaMismatch(db_err.message().to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        },
        sqlx::Error::PoolTimedOut => StoreError::Timeout(err.to_string()),
        sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}
