//! Stock ledger and summary models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::MovementDirection;

/// One append-only ledger entry. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub item_id: Uuid,
    pub warehouse_code: String,
    /// Signed: positive inbound, negative outbound.
    pub quantity: i64,
    pub direction: MovementDirection,
    pub reason: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

/// Current quantity of an item in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseLevel {
    pub warehouse_code: String,
    pub quantity: i64,
}

/// Denormalized per-item cache over the ledger.
///
/// Invariant: `total_quantity` equals the sum of the per-warehouse levels
/// and, at any quiescent point, the sum of all ledger quantities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSummary {
    pub item_id: Uuid,
    pub total_quantity: i64,
    pub last_movement_quantity: i64,
    pub last_status: MovementDirection,
    pub updated_at: DateTime<Utc>,
    pub levels: Vec<WarehouseLevel>,
}

/// Re-derive summary totals from raw ledger entries.
///
/// The ledger is the source of truth; this is both the repair path for a
/// diverged cache and the reference computation the cache is checked
/// against.
pub fn summary_from_ledger(movements: &[(String, i64)]) -> (i64, Vec<WarehouseLevel>) {
    let mut levels: Vec<WarehouseLevel> = Vec::new();
    let mut total = 0i64;

    for (warehouse, quantity) in movements {
        total += quantity;
        match levels.iter_mut().find(|l| &l.warehouse_code == warehouse) {
            Some(level) => level.quantity += quantity,
            None => levels.push(WarehouseLevel {
                warehouse_code: warehouse.clone(),
                quantity: *quantity,
            }),
        }
    }

    levels.sort_by(|a, b| a.warehouse_code.cmp(&b.warehouse_code));
    (total, levels)
}
