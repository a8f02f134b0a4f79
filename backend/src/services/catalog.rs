//! Item catalog service
//!
//! Registration and lookup of stock-keeping items. Finished products and
//! spare parts share one table with a kind tag; the kind defaults to the
//! code classification rule (alphabetic code = product, numeric = spare).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{Item, ItemKind};

use crate::error::{AppError, AppResult};

/// Catalog service for item registration and lookup
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Input for registering an item
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub code: String,
    pub name: String,
    /// Overrides the code-derived classification when present.
    pub kind: Option<ItemKind>,
    pub unit_price: Option<Decimal>,
    pub image_url: Option<String>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    code: String,
    name: String,
    kind: String,
    unit_price: Decimal,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            code: row.code,
            name: row.name,
            kind: ItemKind::parse(&row.kind).unwrap_or(ItemKind::Spare),
            unit_price: row.unit_price,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

const ITEM_COLUMNS: &str = "id, code, name, kind, unit_price, image_url, created_at";

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register an item
    pub async fn create_item(&self, input: CreateItemInput) -> AppResult<Item> {
        let code = input.code.trim();
        if code.is_empty() {
            return Err(AppError::validation("code", "Item code cannot be empty"));
        }
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "Item name cannot be empty"));
        }

        let kind = input.kind.unwrap_or_else(|| ItemKind::classify(code));
        let unit_price = input.unit_price.unwrap_or(Decimal::ZERO);
        if unit_price < Decimal::ZERO {
            return Err(AppError::validation(
                "unit_price",
                "Unit price cannot be negative",
            ));
        }

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM items WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.db)
                .await?;

        if exists {
            return Err(AppError::Conflict(format!(
                "Item with code {} already exists",
                code
            )));
        }

        let row = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            INSERT INTO items (code, name, kind, unit_price, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(code)
        .bind(input.name.trim())
        .bind(kind.as_str())
        .bind(unit_price)
        .bind(&input.image_url)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get an item by its code
    pub async fn get_item_by_code(&self, code: &str) -> AppResult<Item> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE code = $1",
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(row.into())
    }

    /// List all registered items
    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY code",
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }
}
