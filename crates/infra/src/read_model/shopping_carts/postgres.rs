//! Postgres-backed cart details store.
//!
//! Expects the table below in the schema selected by the pool's `search_path`:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS shopping_cart_details (
//!     id            TEXT PRIMARY KEY,
//!     client_id     TEXT NOT NULL,
//!     status        TEXT NOT NULL,
//!     product_items JSONB NOT NULL DEFAULT '[]',
//!     opened_at     TIMESTAMPTZ NOT NULL,
//!     confirmed_at  TIMESTAMPTZ,
//!     canceled_at   TIMESTAMPTZ,
//!     revision      BIGINT NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use cartview_carts::{PricedProductItem, ShoppingCartDetails, ShoppingCartStatus};
use cartview_core::{ClientId, ShoppingCartId};
use cartview_events::StreamRevision;

use super::ShoppingCartDetailsStore;
use crate::read_model::StoreError;

pub struct PostgresShoppingCartDetailsStore {
    pool: PgPool,
}

impl PostgresShoppingCartDetailsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode(row: &PgRow) -> Result<ShoppingCartDetails, StoreError> {
    let id = ShoppingCartId::new(row.try_get::<String, _>("id")?)
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    let client_id = ClientId::new(row.try_get::<String, _>("client_id")?)
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    let status: ShoppingCartStatus = row
        .try_get::<String, _>("status")?
        .parse()
        .map_err(|e: cartview_core::DomainError| StoreError::Decode(e.to_string()))?;
    let Json(product_items) = row.try_get::<Json<Vec<PricedProductItem>>, _>("product_items")?;
    let revision = revision_from_column(row.try_get::<i64, _>("revision")?)?;

    Ok(ShoppingCartDetails {
        id,
        client_id,
        status,
        product_items,
        opened_at: row.try_get::<DateTime<Utc>, _>("opened_at")?,
        confirmed_at: row.try_get::<Option<DateTime<Utc>>, _>("confirmed_at")?,
        canceled_at: row.try_get::<Option<DateTime<Utc>>, _>("canceled_at")?,
        revision,
    })
}

fn revision_from_column(revision: i64) -> Result<StreamRevision, StoreError> {
    u64::try_from(revision)
        .map(StreamRevision::new)
        .map_err(|_| StoreError::Decode(format!("negative revision {revision}")))
}

fn revision_param(revision: StreamRevision) -> Result<i64, StoreError> {
    i64::try_from(revision.as_u64())
        .map_err(|_| StoreError::Decode(format!("revision {revision} exceeds BIGINT")))
}

fn affected_ids(rows: Vec<PgRow>) -> Result<Vec<ShoppingCartId>, StoreError> {
    rows.iter()
        .map(|row| {
            ShoppingCartId::new(row.try_get::<String, _>("id")?)
                .map_err(|e| StoreError::Decode(e.to_string()))
        })
        .collect()
}

#[async_trait]
impl ShoppingCartDetailsStore for PostgresShoppingCartDetailsStore {
    #[instrument(skip(self), fields(shopping_cart_id = %id))]
    async fn find_by_id(&self, id: &ShoppingCartId) -> Result<Option<ShoppingCartDetails>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, client_id, status, product_items, opened_at, confirmed_at, canceled_at, revision
            FROM shopping_cart_details
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode).transpose()
    }

    #[instrument(skip(self, details), fields(shopping_cart_id = %details.id))]
    async fn insert(&self, details: ShoppingCartDetails) -> Result<Vec<ShoppingCartId>, StoreError> {
        let rows = sqlx::query(
            r#"
            INSERT INTO shopping_cart_details (
                id, client_id, status, product_items, opened_at, confirmed_at, canceled_at, revision
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(details.id.as_str())
        .bind(details.client_id.as_str())
        .bind(details.status.as_str())
        .bind(Json(&details.product_items))
        .bind(details.opened_at)
        .bind(details.confirmed_at)
        .bind(details.canceled_at)
        .bind(revision_param(details.revision)?)
        .fetch_all(&self.pool)
        .await?;

        affected_ids(rows)
    }

    #[instrument(skip(self, details), fields(shopping_cart_id = %details.id, expected = %expected))]
    async fn update_if_revision(
        &self,
        expected: StreamRevision,
        details: ShoppingCartDetails,
    ) -> Result<Vec<ShoppingCartId>, StoreError> {
        let rows = sqlx::query(
            r#"
            UPDATE shopping_cart_details
            SET client_id = $2,
                status = $3,
                product_items = $4,
                opened_at = $5,
                confirmed_at = $6,
                canceled_at = $7,
                revision = $8
            WHERE id = $1 AND revision = $9
            RETURNING id
            "#,
        )
        .bind(details.id.as_str())
        .bind(details.client_id.as_str())
        .bind(details.status.as_str())
        .bind(Json(&details.product_items))
        .bind(details.opened_at)
        .bind(details.confirmed_at)
        .bind(details.canceled_at)
        .bind(revision_param(details.revision)?)
        .bind(revision_param(expected)?)
        .fetch_all(&self.pool)
        .await?;

        affected_ids(rows)
    }
}
