//! Returns reconciliation service
//!
//! A returned unit reverses its stock deduction exactly once (the unique
//! returned_items row is the structural guard) and re-derives the order's
//! return state and payment status in the same transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{derive_return_state, PaymentStatus, ReturnState};

use crate::error::{AppError, AppResult};
use crate::services::payment::{order_financials, refresh_payment_status};
use crate::services::stock::StockService;

/// Returns service for unit-level return processing
#[derive(Clone)]
pub struct ReturnsService {
    db: PgPool,
}

/// Per-unit return eligibility for order views
#[derive(Debug, Clone, Serialize)]
pub struct ReturnableUnit {
    pub unit_id: Uuid,
    pub item_code: String,
    pub serial_no: Option<String>,
    pub stock_deducted: bool,
    pub returned: bool,
    pub can_return: bool,
}

/// Outcome of returning a unit
#[derive(Debug, Serialize)]
pub struct ReturnOutcome {
    pub order_id: Uuid,
    pub unit_id: Uuid,
    pub return_state: ReturnState,
    pub payment_status: PaymentStatus,
    pub effective_total: Decimal,
}

#[derive(Debug, FromRow)]
struct ReturnableRow {
    unit_id: Uuid,
    item_code: String,
    serial_no: Option<String>,
    stock_deducted: bool,
    returned: bool,
}

impl ReturnsService {
    /// Create a new ReturnsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List an order's units with their return eligibility
    pub async fn list_returnable(&self, order_id: Uuid) -> AppResult<Vec<ReturnableUnit>> {
        let rows = sqlx::query_as::<_, ReturnableRow>(
            r#"
            SELECT du.id AS unit_id, i.code AS item_code, du.serial_no, du.stock_deducted,
                   EXISTS(SELECT 1 FROM returned_items r WHERE r.dispatch_unit_id = du.id) AS returned
            FROM dispatch_units du
            JOIN items i ON i.id = du.item_id
            WHERE du.order_id = $1
            ORDER BY du.created_at, du.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound("Order".to_string()));
        }

        Ok(rows
            .into_iter()
            .map(|r| ReturnableUnit {
                unit_id: r.unit_id,
                item_code: r.item_code,
                serial_no: r.serial_no,
                stock_deducted: r.stock_deducted,
                returned: r.returned,
                can_return: r.stock_deducted && !r.returned,
            })
            .collect())
    }

    /// Return one dispatch unit: reverse its stock deduction, record the
    /// return, and re-derive the order's return state and payment status.
    pub async fn return_unit(
        &self,
        actor: &str,
        order_id: Uuid,
        unit_id: Uuid,
    ) -> AppResult<ReturnOutcome> {
        let mut tx = self.db.begin().await?;

        // Serialize returns per order: the recount below must see every
        // previously committed return, so concurrent returns of different
        // units queue on the order row instead of racing the count.
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let unit = sqlx::query_as::<_, (Uuid, String, bool, bool)>(
            r#"
            SELECT du.item_id, du.warehouse_code, du.stock_deducted,
                   EXISTS(SELECT 1 FROM returned_items r WHERE r.dispatch_unit_id = du.id) AS returned
            FROM dispatch_units du
            WHERE du.id = $1 AND du.order_id = $2
            FOR UPDATE OF du
            "#,
        )
        .bind(unit_id)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Dispatch unit".to_string()))?;

        let (item_id, warehouse_code, stock_deducted, already_returned) = unit;

        if already_returned {
            return Err(AppError::AlreadyReturned);
        }
        if !stock_deducted {
            return Err(AppError::NotDispatched);
        }

        // Reversal: one inbound movement per returned unit.
        StockService::record_movement_in_tx(
            &mut tx,
            item_id,
            &warehouse_code,
            1,
            "return",
            actor,
        )
        .await?;

        sqlx::query(
            r#"
            INSERT INTO returned_items (order_id, dispatch_unit_id, quantity_returned)
            VALUES ($1, $2, 1)
            "#,
        )
        .bind(order_id)
        .bind(unit_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => AppError::AlreadyReturned,
            _ => AppError::Database(e),
        })?;

        let (total_units, returned_units) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE EXISTS(
                       SELECT 1 FROM returned_items r WHERE r.dispatch_unit_id = du.id))
            FROM dispatch_units du
            WHERE du.order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        let return_state = derive_return_state(total_units, returned_units);

        sqlx::query("UPDATE orders SET return_state = $1 WHERE id = $2")
            .bind(return_state.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        let today = Utc::now().date_naive();
        let (payment_status, financials) =
            refresh_payment_status(&mut tx, order_id, today).await?;

        tx.commit().await?;

        Ok(ReturnOutcome {
            order_id,
            unit_id,
            return_state,
            payment_status,
            effective_total: financials.effective_total(),
        })
    }

    /// Effective payable total for an order. Pure read-side computation
    /// used by reporting; mutates nothing.
    pub async fn effective_total(&self, order_id: Uuid) -> AppResult<Decimal> {
        let mut conn = self.db.acquire().await?;
        let financials = order_financials(&mut conn, order_id).await?;
        Ok(financials.effective_total())
    }
}
