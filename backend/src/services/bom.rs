//! Bill-of-materials service
//!
//! Recipes are child-table rows, not serialized blobs. Activating a new
//! recipe archives the previous active one in the same transaction, so at
//! most one active BOM exists per product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{validate_weight_percents, BomStatus, ItemKind, WarehouseLevel};

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;

/// BOM service for recipe management
#[derive(Clone)]
pub struct BomService {
    db: PgPool,
}

/// One component line of a create-BOM request
#[derive(Debug, Deserialize)]
pub struct BomComponentInput {
    pub spare_code: String,
    pub quantity_per_unit: i64,
    pub weight_percent: Decimal,
}

/// Input for creating (and activating) a BOM
#[derive(Debug, Deserialize)]
pub struct CreateBomInput {
    pub product_code: String,
    pub components: Vec<BomComponentInput>,
}

/// A stored BOM header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Bom {
    pub id: Uuid,
    pub product_id: Uuid,
    pub status: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

/// Component enriched with catalog data and live availability
#[derive(Debug, Clone, Serialize)]
pub struct BomComponentDetail {
    pub spare_id: Uuid,
    pub spare_code: String,
    pub spare_name: String,
    pub image_url: Option<String>,
    pub quantity_per_unit: i64,
    pub weight_percent: Decimal,
    pub available_total: i64,
    pub available_by_warehouse: Vec<WarehouseLevel>,
}

/// Recipe plus enriched components, for planning views
#[derive(Debug, Serialize)]
pub struct BomDetail {
    pub bom: Bom,
    pub product_code: String,
    pub product_name: String,
    pub components: Vec<BomComponentDetail>,
}

#[derive(Debug, FromRow)]
struct ComponentRow {
    spare_id: Uuid,
    spare_code: String,
    spare_name: String,
    image_url: Option<String>,
    quantity_per_unit: i64,
    weight_percent: Decimal,
}

impl BomService {
    /// Create a new BomService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create and activate a BOM for a product, archiving any prior active
    /// recipe in the same transaction.
    pub async fn create_bom(&self, input: CreateBomInput) -> AppResult<Bom> {
        if input.components.is_empty() {
            return Err(AppError::validation(
                "components",
                "A bill of materials must have at least one component",
            ));
        }

        let percents: Vec<Decimal> = input.components.iter().map(|c| c.weight_percent).collect();
        if let Err(msg) = validate_weight_percents(&percents) {
            return Err(AppError::validation("components", msg));
        }

        let product = self
            .resolve_item_of_kind(&input.product_code, ItemKind::Product, "product_code")
            .await?;

        let mut spare_ids = Vec::with_capacity(input.components.len());
        for component in &input.components {
            if component.quantity_per_unit <= 0 {
                return Err(AppError::validation(
                    "quantity_per_unit",
                    "Component quantity per unit must be positive",
                ));
            }
            let spare = self
                .resolve_item_of_kind(&component.spare_code, ItemKind::Spare, "spare_code")
                .await?;
            spare_ids.push(spare);
        }

        let mut tx = self.db.begin().await?;

        // Retire the previous recipe; the partial unique index on
        // (product_id) WHERE status = 'active' turns a concurrent double
        // activation into a constraint violation.
        sqlx::query("UPDATE boms SET status = $1 WHERE product_id = $2 AND status = $3")
            .bind(BomStatus::Archived.as_str())
            .bind(product)
            .bind(BomStatus::Active.as_str())
            .execute(&mut *tx)
            .await?;

        let version = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM boms WHERE product_id = $1",
        )
        .bind(product)
        .fetch_one(&mut *tx)
        .await?;

        let bom = sqlx::query_as::<_, Bom>(
            r#"
            INSERT INTO boms (product_id, status, version)
            VALUES ($1, $2, $3)
            RETURNING id, product_id, status, version, created_at
            "#,
        )
        .bind(product)
        .bind(BomStatus::Active.as_str())
        .bind((version + 1) as i32)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                AppError::Conflict("Another active BOM was created concurrently".to_string())
            }
            _ => AppError::Database(e),
        })?;

        for (position, (component, spare_id)) in
            input.components.iter().zip(spare_ids.iter()).enumerate()
        {
            sqlx::query(
                r#"
                INSERT INTO bom_components (bom_id, spare_id, quantity_per_unit, weight_percent, position)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(bom.id)
            .bind(spare_id)
            .bind(component.quantity_per_unit)
            .bind(component.weight_percent)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(product = %input.product_code, bom_id = %bom.id, "activated BOM");

        Ok(bom)
    }

    /// Get the active BOM for a product, with component names, images and
    /// live stock availability. Read-only join for planning views.
    pub async fn get_bom(&self, product_code: &str) -> AppResult<BomDetail> {
        let (product_id, product_name) = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM items WHERE code = $1",
        )
        .bind(product_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let bom = sqlx::query_as::<_, Bom>(
            r#"
            SELECT id, product_id, status, version, created_at
            FROM boms
            WHERE product_id = $1 AND status = 'active'
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NoActiveBom)?;

        let rows = sqlx::query_as::<_, ComponentRow>(
            r#"
            SELECT c.spare_id, i.code AS spare_code, i.name AS spare_name, i.image_url,
                   c.quantity_per_unit, c.weight_percent
            FROM bom_components c
            JOIN items i ON i.id = c.spare_id
            WHERE c.bom_id = $1
            ORDER BY c.position
            "#,
        )
        .bind(bom.id)
        .fetch_all(&self.db)
        .await?;

        let stock = StockService::new(self.db.clone());
        let mut components = Vec::with_capacity(rows.len());
        for row in rows {
            let summary = stock.get_summary_by_id(row.spare_id).await?;
            components.push(BomComponentDetail {
                spare_id: row.spare_id,
                spare_code: row.spare_code,
                spare_name: row.spare_name,
                image_url: row.image_url,
                quantity_per_unit: row.quantity_per_unit,
                weight_percent: row.weight_percent,
                available_total: summary.total_quantity,
                available_by_warehouse: summary.levels,
            });
        }

        Ok(BomDetail {
            bom,
            product_code: product_code.to_string(),
            product_name,
            components,
        })
    }

    async fn resolve_item_of_kind(
        &self,
        code: &str,
        kind: ItemKind,
        field: &str,
    ) -> AppResult<Uuid> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, kind FROM items WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        if ItemKind::parse(&row.1) != Some(kind) {
            return Err(AppError::validation(
                field,
                match kind {
                    ItemKind::Product => "Item is not a finished product",
                    ItemKind::Spare => "Component items must be spare parts",
                },
            ));
        }

        Ok(row.0)
    }
}
