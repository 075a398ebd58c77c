use crate::database::map_sqlx_err;
use async_trait::async_trait;
use cwt_core::payment::PaymentAttempt;
use cwt_core::repository::{AttemptLog, StoreError};
use sqlx::PgPool;

/// Append-only writer for the payment audit log. Rows are inserted once and
/// never touched again; there is deliberately no update method here.
pub struct PgAttemptLog {
    pool: PgPool,
}

impl PgAttemptLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptLog for PgAttemptLog {
    async fn append(&self, attempt: &PaymentAttempt) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO payment_attempts
                (id, group_id, status, amount_cents, currency,
                 transaction_id, auth_code, payment_code, payment_description,
                 customer_name, customer_email, customer_phone,
                 raw_request, raw_response, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(attempt.id)
        .bind(&attempt.group_id)
        .bind(attempt.status.as_str())
        .bind(attempt.amount_cents)
        .bind(&attempt.currency)
        .bind(&attempt.gateway.transaction_id)
        .bind(&attempt.gateway.auth_code)
        .bind(&attempt.gateway.payment_code)
        .bind(&attempt.gateway.payment_description)
        .bind(&attempt.customer.name)
        .bind(attempt.customer.email.as_ref().map(|masked| masked.inner().clone()))
        .bind(attempt.customer.phone.as_ref().map(|masked| masked.inner().clone()))
        .bind(&attempt.raw_request)
        .bind(&attempt.raw_response)
        .bind(attempt.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }
}
