use crate::database::map_sqlx_err;
use async_trait::async_trait;
use cwt_core::line_item::{BookingStamp, ItemKind, ItemRef, LineItem};
use cwt_core::payment::{GatewayMetadata, PaymentStatus};
use cwt_core::repository::{LineItemStore, StoreError};
use sqlx::PgPool;

/// Postgres access to the two line-item collections. `ItemRef` decides
/// which table a call touches; the coordinator stays table-agnostic.
pub struct PgLineItemStore {
    pool: PgPool,
}

impl PgLineItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShuttleRow {
    id: i64,
    legacy_group_id: String,
    route: String,
    passengers: i32,
    base_price_cents: i64,
    night_surcharge_cents: Option<i64>,
    add_ons: Option<Vec<String>>,
    final_price_cents: i64,
    payment_status: String,
    transaction_id: Option<String>,
    auth_code: Option<String>,
    payment_code: Option<String>,
    payment_description: Option<String>,
    booking_number: Option<String>,
    voucher_number: Option<String>,
}

#[derive(sqlx::FromRow)]
struct TourRow {
    id: i64,
    tour_name: String,
    passengers: i32,
    base_price_cents: i64,
    final_price_cents: i64,
    payment_status: String,
    transaction_id: Option<String>,
    auth_code: Option<String>,
    payment_code: Option<String>,
    payment_description: Option<String>,
    booking_number: Option<String>,
    voucher_number: Option<String>,
}

fn parse_status(raw: &str) -> PaymentStatus {
    match raw {
        "approved" => PaymentStatus::Approved,
        "rejected" => PaymentStatus::Rejected,
        "error" => PaymentStatus::Error,
        "cancelled" => PaymentStatus::Cancelled,
        _ => PaymentStatus::Pending,
    }
}

impl From<ShuttleRow> for LineItem {
    fn from(row: ShuttleRow) -> Self {
        LineItem {
            id: row.id,
            kind: ItemKind::Shuttle,
            legacy_group_id: Some(row.legacy_group_id),
            description: row.route,
            passengers: row.passengers,
            base_price_cents: row.base_price_cents,
            night_surcharge_cents: row.night_surcharge_cents,
            add_ons: row.add_ons,
            final_price_cents: row.final_price_cents,
            payment_status: parse_status(&row.payment_status),
            gateway: GatewayMetadata {
                transaction_id: row.transaction_id,
                auth_code: row.auth_code,
                payment_code: row.payment_code,
                payment_description: row.payment_description,
            },
            booking_number: row.booking_number,
            voucher_number: row.voucher_number,
        }
    }
}

impl From<TourRow> for LineItem {
    fn from(row: TourRow) -> Self {
        LineItem {
            id: row.id,
            kind: ItemKind::Tour,
            legacy_group_id: None,
            description: row.tour_name,
            passengers: row.passengers,
            base_price_cents: row.base_price_cents,
            night_surcharge_cents: None,
            add_ons: None,
            final_price_cents: row.final_price_cents,
            payment_status: parse_status(&row.payment_status),
            gateway: GatewayMetadata {
                transaction_id: row.transaction_id,
                auth_code: row.auth_code,
                payment_code: row.payment_code,
                payment_description: row.payment_description,
            },
            booking_number: row.booking_number,
            voucher_number: row.voucher_number,
        }
    }
}

#[async_trait]
impl LineItemStore for PgLineItemStore {
    async fn stamp(&self, item: &ItemRef, stamp: &BookingStamp) -> Result<u64, StoreError> {
        let query = match item {
            ItemRef::ShuttleGroup(_) => {
                r#"
                UPDATE shuttle_trips
                SET booking_number = $1,
                    voucher_number = $2,
                    payment_status = $3,
                    transaction_id = COALESCE($4, transaction_id),
                    auth_code = COALESCE($5, auth_code),
                    payment_code = COALESCE($6, payment_code),
                    payment_description = COALESCE($7, payment_description),
                    updated_at = NOW()
                WHERE legacy_group_id = $8
                "#
            }
            ItemRef::Tour(_) => {
                r#"
                UPDATE tour_reservations
                SET booking_number = $1,
                    voucher_number = $2,
                    payment_status = $3,
                    transaction_id = COALESCE($4, transaction_id),
                    auth_code = COALESCE($5, auth_code),
                    payment_code = COALESCE($6, payment_code),
                    payment_description = COALESCE($7, payment_description),
                    updated_at = NOW()
                WHERE id = $8
                "#
            }
        };

        let q = sqlx::query(query)
            .bind(&stamp.booking_number)
            .bind(&stamp.voucher_number)
            .bind(stamp.status.as_str())
            .bind(&stamp.gateway.transaction_id)
            .bind(&stamp.gateway.auth_code)
            .bind(&stamp.gateway.payment_code)
            .bind(&stamp.gateway.payment_description);
        let q = match item {
            ItemRef::ShuttleGroup(group_id) => q.bind(group_id.clone()),
            ItemRef::Tour(id) => q.bind(*id),
        };

        let result = q.execute(&self.pool).await.map_err(map_sqlx_err)?;
        Ok(result.rows_affected())
    }

    async fn set_status(
        &self,
        item: &ItemRef,
        status: PaymentStatus,
        gateway: &GatewayMetadata,
    ) -> Result<u64, StoreError> {
        let query = match item {
            ItemRef::ShuttleGroup(_) => {
                r#"
                UPDATE shuttle_trips
                SET payment_status = $1,
                    transaction_id = COALESCE($2, transaction_id),
                    auth_code = COALESCE($3, auth_code),
                    payment_code = COALESCE($4, payment_code),
                    payment_description = COALESCE($5, payment_description),
                    updated_at = NOW()
                WHERE legacy_group_id = $6
                "#
            }
            ItemRef::Tour(_) => {
                r#"
                UPDATE tour_reservations
                SET payment_status = $1,
                    transaction_id = COALESCE($2, transaction_id),
                    auth_code = COALESCE($3, auth_code),
                    payment_code = COALESCE($4, payment_code),
                    payment_description = COALESCE($5, payment_description),
                    updated_at = NOW()
                WHERE id = $6
                "#
            }
        };

        let q = sqlx::query(query)
            .bind(status.as_str())
            .bind(&gateway.transaction_id)
            .bind(&gateway.auth_code)
            .bind(&gateway.payment_code)
            .bind(&gateway.payment_description);
        let q = match item {
            ItemRef::ShuttleGroup(group_id) => q.bind(group_id.clone()),
            ItemRef::Tour(id) => q.bind(*id),
        };

        let result = q.execute(&self.pool).await.map_err(map_sqlx_err)?;
        Ok(result.rows_affected())
    }

    async fn load(&self, item: &ItemRef) -> Result<Vec<LineItem>, StoreError> {
        match item {
            ItemRef::ShuttleGroup(group_id) => {
                let rows: Vec<ShuttleRow> = sqlx::query_as(
                    r#"
                    SELECT id, legacy_group_id, route, passengers,
                           base_price_cents, night_surcharge_cents, add_ons,
                           final_price_cents, payment_status,
                           transaction_id, auth_code, payment_code, payment_description,
                           booking_number, voucher_number
                    FROM shuttle_trips
                    WHERE legacy_group_id = $1
                    ORDER BY id
                    "#,
                )
                .bind(group_id)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
                Ok(rows.into_iter().map(LineItem::from).collect())
            }
            ItemRef::Tour(id) => {
                let row: Option<TourRow> = sqlx::query_as(
                    r#"
                    SELECT id, tour_name, passengers,
                           base_price_cents, final_price_cents, payment_status,
                           transaction_id, auth_code, payment_code, payment_description,
                           booking_number, voucher_number
                    FROM tour_reservations
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
                Ok(row.map(LineItem::from).into_iter().collect())
            }
        }
    }

    async fn existing_booking_number(&self, item: &ItemRef) -> Result<Option<String>, StoreError> {
        let found: Option<String> = match item {
            ItemRef::ShuttleGroup(group_id) => sqlx::query_scalar(
                r#"
                SELECT booking_number FROM shuttle_trips
                WHERE legacy_group_id = $1 AND booking_number IS NOT NULL
                LIMIT 1
                "#,
            )
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?,
            ItemRef::Tour(id) => sqlx::query_scalar(
                r#"
                SELECT booking_number FROM tour_reservations
                WHERE id = $1 AND booking_number IS NOT NULL
                LIMIT 1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?,
        };

        Ok(found)
    }
}
