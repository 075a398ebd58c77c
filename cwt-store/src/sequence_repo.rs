use crate::database::map_sqlx_err;
use async_trait::async_trait;
use cwt_core::repository::{SequenceStore, StoreError};
use sqlx::PgPool;

/// Year-scoped booking counter backed by a single-row upsert.
///
/// The whole increment is one statement, so two concurrent checkouts can
/// never observe the same value; Postgres serializes the row update.
pub struct PgSequenceStore {
    pool: PgPool,
}

impl PgSequenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceStore for PgSequenceStore {
    async fn next_value(&self, year: i32) -> Result<i64, StoreError> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO booking_sequences (year, value)
            VALUES ($1, 1)
            ON CONFLICT (year)
            DO UPDATE SET value = booking_sequences.value + 1
            RETURNING value
            "#,
        )
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(value)
    }
}
