//! Stock ledger and summary cache service
//!
//! Every movement is one atomic unit: an append-only ledger row plus the
//! summary/level upsert. The ledger is the source of truth; the summary is
//! a cache that can always be rebuilt from it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::{
    summary_from_ledger, validate_movement_quantity, MovementDirection, StockMovement,
    StockSummary, WarehouseLevel,
};

use crate::error::{AppError, AppResult};

/// Stock service for recording movements and maintaining the summary cache
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Input for recording a stock movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub item_code: String,
    pub warehouse_code: String,
    /// Signed: positive inbound, negative outbound.
    pub quantity: i64,
    pub reason: String,
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    item_id: Uuid,
    warehouse_code: String,
    quantity: i64,
    direction: String,
    reason: String,
    actor: String,
    created_at: DateTime<Utc>,
}

impl From<MovementRow> for StockMovement {
    fn from(row: MovementRow) -> Self {
        StockMovement {
            id: row.id,
            item_id: row.item_id,
            warehouse_code: row.warehouse_code,
            quantity: row.quantity,
            direction: if row.direction == "out" {
                MovementDirection::Out
            } else {
                MovementDirection::In
            },
            reason: row.reason,
            actor: row.actor,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    item_id: Uuid,
    total_quantity: i64,
    last_movement_quantity: i64,
    last_status: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LevelRow {
    warehouse_code: String,
    quantity: i64,
}

/// Postgres SQLSTATEs worth one transparent retry: serialization failure
/// and deadlock detected.
fn is_retryable(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "40001" || code == "40P01")
        .unwrap_or(false)
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a stock movement: ledger append plus summary upsert, one
    /// transaction. Serialization conflicts are retried once.
    ///
    /// Movements reference registered items only: an unknown item code is
    /// rejected with `NotFound` rather than recorded ledger-only, since the
    /// ledger carries a foreign key into the catalog.
    pub async fn record_movement(
        &self,
        actor: &str,
        input: RecordMovementInput,
    ) -> AppResult<StockSummary> {
        if let Err(msg) = validate_movement_quantity(input.quantity) {
            return Err(AppError::validation("quantity", msg));
        }

        let item_id = self.resolve_item(&input.item_code).await?;
        self.ensure_warehouse(&input.warehouse_code).await?;

        match self
            .record_movement_once(item_id, &input, actor)
            .await
        {
            Err(AppError::Database(e)) if is_retryable(&e) => {
                tracing::warn!(item = %input.item_code, "retrying movement after conflict");
                self.record_movement_once(item_id, &input, actor).await
            }
            other => other,
        }
    }

    async fn record_movement_once(
        &self,
        item_id: Uuid,
        input: &RecordMovementInput,
        actor: &str,
    ) -> AppResult<StockSummary> {
        let mut tx = self.db.begin().await?;

        Self::record_movement_in_tx(
            &mut tx,
            item_id,
            &input.warehouse_code,
            input.quantity,
            &input.reason,
            actor,
        )
        .await?;

        tx.commit().await?;

        self.get_summary_by_id(item_id).await
    }

    /// Append a ledger row and upsert the summary/level inside an enclosing
    /// transaction. Production, dispatch and returns reuse this so their own
    /// multi-row work commits atomically with the stock change.
    pub async fn record_movement_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        item_id: Uuid,
        warehouse_code: &str,
        quantity: i64,
        reason: &str,
        actor: &str,
    ) -> AppResult<()> {
        let direction = MovementDirection::of(quantity);

        sqlx::query(
            r#"
            INSERT INTO stock_movements (item_id, warehouse_code, quantity, direction, reason, actor)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item_id)
        .bind(warehouse_code)
        .bind(quantity)
        .bind(direction.as_str())
        .bind(reason)
        .bind(actor)
        .execute(&mut **tx)
        .await?;

        // Additive upsert: the conflict row lock serializes concurrent
        // movements against the same item.
        sqlx::query(
            r#"
            INSERT INTO stock_summaries (item_id, total_quantity, last_movement_quantity, last_status, updated_at)
            VALUES ($1, $2, $2, $3, now())
            ON CONFLICT (item_id) DO UPDATE
            SET total_quantity = stock_summaries.total_quantity + EXCLUDED.total_quantity,
                last_movement_quantity = EXCLUDED.last_movement_quantity,
                last_status = EXCLUDED.last_status,
                updated_at = now()
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .bind(direction.as_str())
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_levels (item_id, warehouse_code, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (item_id, warehouse_code) DO UPDATE
            SET quantity = stock_levels.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(item_id)
        .bind(warehouse_code)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Get the current summary (total plus per-warehouse levels) for an item
    pub async fn get_summary(&self, item_code: &str) -> AppResult<StockSummary> {
        let item_id = self.resolve_item(item_code).await?;
        self.get_summary_by_id(item_id).await
    }

    pub(crate) async fn get_summary_by_id(&self, item_id: Uuid) -> AppResult<StockSummary> {
        let summary = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT item_id, total_quantity, last_movement_quantity, last_status, updated_at
            FROM stock_summaries
            WHERE item_id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?;

        // Created lazily on first movement; absent means zero everywhere.
        let summary = match summary {
            Some(row) => row,
            None => SummaryRow {
                item_id,
                total_quantity: 0,
                last_movement_quantity: 0,
                last_status: "in".to_string(),
                updated_at: Utc::now(),
            },
        };

        let levels = self.get_levels(item_id).await?;

        Ok(StockSummary {
            item_id: summary.item_id,
            total_quantity: summary.total_quantity,
            last_movement_quantity: summary.last_movement_quantity,
            last_status: if summary.last_status == "out" {
                MovementDirection::Out
            } else {
                MovementDirection::In
            },
            updated_at: summary.updated_at,
            levels,
        })
    }

    pub(crate) async fn get_levels(&self, item_id: Uuid) -> AppResult<Vec<WarehouseLevel>> {
        let levels = sqlx::query_as::<_, LevelRow>(
            r#"
            SELECT warehouse_code, quantity
            FROM stock_levels
            WHERE item_id = $1
            ORDER BY warehouse_code
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        Ok(levels
            .into_iter()
            .map(|l| WarehouseLevel {
                warehouse_code: l.warehouse_code,
                quantity: l.quantity,
            })
            .collect())
    }

    /// List the full movement ledger for an item, newest first
    pub async fn list_movements(&self, item_code: &str) -> AppResult<Vec<StockMovement>> {
        let item_id = self.resolve_item(item_code).await?;

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, item_id, warehouse_code, quantity, direction, reason, actor, created_at
            FROM stock_movements
            WHERE item_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(StockMovement::from).collect())
    }

    /// Re-derive the summary cache from the ledger.
    ///
    /// Repair path for a cache that diverged after a failed summary write:
    /// the ledger wins.
    pub async fn rebuild_summary(&self, item_code: &str) -> AppResult<StockSummary> {
        let item_id = self.resolve_item(item_code).await?;

        let mut tx = self.db.begin().await?;

        // Take the summary row lock before reading the ledger: a concurrent
        // movement either commits fully before the read or blocks at its
        // additive upsert until the rebuild commits, so nothing falls into
        // the gap between read and overwrite.
        sqlx::query(
            "INSERT INTO stock_summaries (item_id) VALUES ($1) ON CONFLICT (item_id) DO NOTHING",
        )
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query_scalar::<_, Uuid>(
            "SELECT item_id FROM stock_summaries WHERE item_id = $1 FOR UPDATE",
        )
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        let entries = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT warehouse_code, quantity
            FROM stock_movements
            WHERE item_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(item_id)
        .fetch_all(&mut *tx)
        .await?;

        let (total, levels) = summary_from_ledger(&entries);
        let last = entries.last().cloned();

        sqlx::query("DELETE FROM stock_levels WHERE item_id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        for level in &levels {
            sqlx::query(
                "INSERT INTO stock_levels (item_id, warehouse_code, quantity) VALUES ($1, $2, $3)",
            )
            .bind(item_id)
            .bind(&level.warehouse_code)
            .bind(level.quantity)
            .execute(&mut *tx)
            .await?;
        }

        let (last_quantity, last_status) = match last {
            Some((_, qty)) => (qty, MovementDirection::of(qty)),
            None => (0, MovementDirection::In),
        };

        sqlx::query(
            r#"
            INSERT INTO stock_summaries (item_id, total_quantity, last_movement_quantity, last_status, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (item_id) DO UPDATE
            SET total_quantity = EXCLUDED.total_quantity,
                last_movement_quantity = EXCLUDED.last_movement_quantity,
                last_status = EXCLUDED.last_status,
                updated_at = now()
            "#,
        )
        .bind(item_id)
        .bind(total)
        .bind(last_quantity)
        .bind(last_status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_summary_by_id(item_id).await
    }

    pub(crate) async fn resolve_item(&self, item_code: &str) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM items WHERE code = $1")
            .bind(item_code)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))
    }

    async fn ensure_warehouse(&self, warehouse_code: &str) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE code = $1)",
        )
        .bind(warehouse_code)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
        Ok(())
    }
}
