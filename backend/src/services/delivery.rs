//! Delivery estimation service
//!
//! Read-only: classifies the destination into a zone and picks a fulfilling
//! warehouse from current stock levels. It never deducts or reserves stock,
//! so an estimate can go stale before dispatch.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use shared::{select_warehouse, ZoneTable};

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;

/// Delivery service for zone-based lead-time estimates
#[derive(Clone)]
pub struct DeliveryService {
    db: PgPool,
    zones: ZoneTable,
}

/// Query parameters for a delivery estimate
#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub item_code: String,
    pub postal_code: String,
    /// Caller's preferred fulfilling warehouse, honoured when it has stock.
    pub warehouse: Option<String>,
}

/// Estimate result
#[derive(Debug, Serialize)]
pub struct DeliveryEstimate {
    pub item_code: String,
    pub zone: String,
    pub available: bool,
    pub warehouse: Option<String>,
    pub delivery_days: Option<u32>,
}

impl DeliveryService {
    /// Create a new DeliveryService instance
    pub fn new(db: PgPool, zones: ZoneTable) -> Self {
        Self { db, zones }
    }

    /// Estimate delivery for an item to a destination postal code
    pub async fn estimate(&self, query: EstimateQuery) -> AppResult<DeliveryEstimate> {
        let zone = self.zones.match_postal(&query.postal_code);

        let stock = StockService::new(self.db.clone());
        let item_id = stock
            .resolve_item(&query.item_code)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Item".to_string()),
                other => other,
            })?;

        let levels = stock.get_levels(item_id).await?;
        let levels: Vec<(String, i64)> = levels
            .into_iter()
            .map(|l| (l.warehouse_code, l.quantity))
            .collect();

        let choice = select_warehouse(&zone, query.warehouse.as_deref(), &levels);

        Ok(match choice {
            Some(choice) => DeliveryEstimate {
                item_code: query.item_code,
                zone: zone.name,
                available: true,
                warehouse: Some(choice.warehouse),
                delivery_days: Some(choice.delivery_days),
            },
            None => DeliveryEstimate {
                item_code: query.item_code,
                zone: zone.name,
                available: false,
                warehouse: None,
                delivery_days: None,
            },
        })
    }
}
