//! Dispatch gate service
//!
//! An order completes dispatch only once every product-class unit carries a
//! serial number; spare-class units are exempt. Completion deducts stock
//! exactly once per unit (`stock_deducted` is the guard flag) and is
//! idempotent on retry.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{serials_pending, units_to_deduct, validate_serial, ItemKind, UnitGate};

use crate::error::{AppError, AppResult};
use crate::services::notification::NotificationService;
use crate::services::stock::StockService;

/// Dispatch service: serial capture and the completion gate
#[derive(Clone)]
pub struct DispatchService {
    db: PgPool,
}

/// Input for binding a serial number to a unit
#[derive(Debug, Deserialize)]
pub struct AssignSerialInput {
    pub serial_no: String,
}

/// Per-unit dispatch state for order views
#[derive(Debug, Clone, Serialize)]
pub struct DispatchUnitView {
    pub id: Uuid,
    pub item_code: String,
    pub kind: ItemKind,
    pub warehouse_code: String,
    pub serial_no: Option<String>,
    pub stock_deducted: bool,
    pub returned: bool,
}

/// Outcome of a completion attempt
#[derive(Debug, Serialize)]
pub struct DispatchResult {
    pub order_id: Uuid,
    pub dispatched: bool,
    /// Units deducted by this call; zero on an idempotent retry.
    pub units_deducted: usize,
}

#[derive(Debug, FromRow)]
struct UnitRow {
    id: Uuid,
    item_id: Uuid,
    item_code: String,
    kind: String,
    warehouse_code: String,
    serial_no: Option<String>,
    stock_deducted: bool,
    returned: bool,
}

impl UnitRow {
    fn gate(&self) -> UnitGate {
        UnitGate {
            unit_id: self.id,
            kind: ItemKind::parse(&self.kind).unwrap_or(ItemKind::Spare),
            serial_no: self.serial_no.clone(),
            stock_deducted: self.stock_deducted,
            returned: self.returned,
        }
    }
}

const UNIT_QUERY: &str = r#"
    SELECT du.id, du.item_id, i.code AS item_code, i.kind, du.warehouse_code,
           du.serial_no, du.stock_deducted,
           EXISTS(SELECT 1 FROM returned_items r WHERE r.dispatch_unit_id = du.id) AS returned
    FROM dispatch_units du
    JOIN items i ON i.id = du.item_id
    WHERE du.order_id = $1
    ORDER BY du.created_at, du.id
"#;

impl DispatchService {
    /// Create a new DispatchService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Bind a serial number to a dispatch unit
    pub async fn assign_serial(
        &self,
        unit_id: Uuid,
        input: AssignSerialInput,
    ) -> AppResult<DispatchUnitView> {
        if let Err(msg) = validate_serial(&input.serial_no) {
            return Err(AppError::validation("serial_no", msg));
        }

        let mut tx = self.db.begin().await?;

        // Lock the unit so a concurrent dispatch completion cannot deduct
        // it between the guard read and the serial write.
        let (order_id, kind, serial_no, stock_deducted) =
            sqlx::query_as::<_, (Uuid, String, Option<String>, bool)>(
                r#"
                SELECT du.order_id, i.kind, du.serial_no, du.stock_deducted
                FROM dispatch_units du
                JOIN items i ON i.id = du.item_id
                WHERE du.id = $1
                FOR UPDATE OF du
                "#,
            )
            .bind(unit_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Dispatch unit".to_string()))?;

        let gate = UnitGate {
            unit_id,
            kind: ItemKind::parse(&kind).unwrap_or(ItemKind::Spare),
            serial_no,
            stock_deducted,
            returned: false,
        };

        if !gate.serial_mutable() {
            return Err(AppError::Conflict(
                "Serial numbers cannot change after dispatch".to_string(),
            ));
        }

        sqlx::query("UPDATE dispatch_units SET serial_no = $1 WHERE id = $2")
            .bind(input.serial_no.trim())
            .bind(unit_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let units = self.list_units(order_id).await?;
        units
            .into_iter()
            .find(|u| u.id == unit_id)
            .ok_or_else(|| AppError::NotFound("Dispatch unit".to_string()))
    }

    /// Attempt to complete dispatch for an order.
    ///
    /// Serial check and stock deduction happen in one transaction: either
    /// every qualifying unit is deducted or none are. Retrying a completed
    /// order is a no-op success.
    pub async fn complete_dispatch(
        &self,
        actor: &str,
        order_id: Uuid,
    ) -> AppResult<DispatchResult> {
        let mut tx = self.db.begin().await?;

        let order_no = sqlx::query_scalar::<_, String>(
            "SELECT order_no FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        // Lock the units so a concurrent attempt serializes behind us.
        let rows = sqlx::query_as::<_, UnitRow>(&format!(
            "{UNIT_QUERY} FOR UPDATE OF du",
        ))
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound("Dispatch unit".to_string()));
        }

        let gates: Vec<UnitGate> = rows.iter().map(UnitRow::gate).collect();

        let pending = serials_pending(&gates);
        if !pending.is_empty() {
            // Transaction dropped without commit: no state change.
            return Err(AppError::SerialsPending {
                pending_units: pending,
            });
        }

        let to_deduct = units_to_deduct(&gates);

        // Deduct in ascending item id so overlapping orders acquire summary
        // row locks in the same order.
        let mut deductions: Vec<&UnitRow> = rows
            .iter()
            .filter(|r| to_deduct.contains(&r.id))
            .collect();
        deductions.sort_by(|a, b| a.item_id.cmp(&b.item_id).then(a.id.cmp(&b.id)));

        for unit in &deductions {
            StockService::record_movement_in_tx(
                &mut tx,
                unit.item_id,
                &unit.warehouse_code,
                -1,
                "dispatch",
                actor,
            )
            .await?;

            sqlx::query("UPDATE dispatch_units SET stock_deducted = TRUE WHERE id = $1")
                .bind(unit.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            UPDATE orders
            SET dispatched = TRUE,
                dispatched_by = COALESCE(dispatched_by, $1),
                dispatched_at = COALESCE(dispatched_at, now())
            WHERE id = $2
            "#,
        )
        .bind(actor)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let deducted = deductions.len();
        if deducted > 0 {
            // Fire-and-forget: a notify failure must never roll back the
            // committed dispatch.
            let notifier = NotificationService::new(self.db.clone());
            let order_no = order_no.clone();
            tokio::spawn(async move {
                notifier.dispatch_completed(order_id, &order_no).await;
            });
        }

        Ok(DispatchResult {
            order_id,
            dispatched: true,
            units_deducted: deducted,
        })
    }

    /// List an order's dispatch units with their serial/deduction state
    pub async fn list_units(&self, order_id: Uuid) -> AppResult<Vec<DispatchUnitView>> {
        let rows = sqlx::query_as::<_, UnitRow>(UNIT_QUERY)
            .bind(order_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| DispatchUnitView {
                id: r.id,
                item_code: r.item_code,
                kind: ItemKind::parse(&r.kind).unwrap_or(ItemKind::Spare),
                warehouse_code: r.warehouse_code,
                serial_no: r.serial_no,
                stock_deducted: r.stock_deducted,
                returned: r.returned,
            })
            .collect())
    }
}
