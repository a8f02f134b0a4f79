//! Production planning service
//!
//! A run freezes a value-copy of the active recipe at creation time, so
//! later BOM edits never change the requirements of runs already committed
//! to the shop floor. Component stock is consumed when a run completes,
//! never at creation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{snapshot_recipe, RecipeComponent, RunStatus};

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;

/// Production service for run planning and progress tracking
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// Input for planning production runs
#[derive(Debug, Deserialize)]
pub struct CreateRunInput {
    pub product_code: String,
    /// One run row is created per requested unit.
    pub quantity: i64,
    pub expected_date: NaiveDate,
    /// Warehouse that receives the produced units and supplies components.
    pub warehouse_code: String,
}

/// Input for progressing a run
#[derive(Debug, Deserialize)]
pub struct UpdateProgressInput {
    pub progress_percent: i32,
    /// Required when the run completes: receives the produced unit and
    /// supplies the consumed components.
    pub warehouse_code: Option<String>,
}

/// A production run with its frozen component snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ProductionRun {
    pub id: Uuid,
    pub product_id: Uuid,
    pub bom_id: Uuid,
    pub expected_date: NaiveDate,
    pub status: String,
    pub progress_percent: i32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub components: Vec<RecipeComponent>,
}

/// Run row joined with product catalog data for listing views
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductionRunListing {
    pub id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub image_url: Option<String>,
    pub expected_date: NaiveDate,
    pub status: String,
    pub progress_percent: i32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RunRow {
    id: Uuid,
    product_id: Uuid,
    bom_id: Uuid,
    expected_date: NaiveDate,
    status: String,
    progress_percent: i32,
    created_by: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SnapshotRow {
    spare_id: Uuid,
    quantity_per_unit: i64,
    weight_percent: rust_decimal::Decimal,
    position: i32,
}

impl From<SnapshotRow> for RecipeComponent {
    fn from(row: SnapshotRow) -> Self {
        RecipeComponent {
            spare_id: row.spare_id,
            quantity_per_unit: row.quantity_per_unit,
            weight_percent: row.weight_percent,
            position: row.position,
        }
    }
}

const RUN_COLUMNS: &str =
    "id, product_id, bom_id, expected_date, status, progress_percent, created_by, created_at";

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Plan production runs: one row per requested unit, each carrying its
    /// own copy of the active recipe. All rows insert in one transaction;
    /// a failure rolls the whole request back.
    pub async fn create_runs(
        &self,
        actor: &str,
        input: CreateRunInput,
    ) -> AppResult<Vec<Uuid>> {
        if input.quantity < 1 {
            return Err(AppError::validation(
                "quantity",
                "Quantity must be at least 1",
            ));
        }

        let product_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM items WHERE code = $1")
            .bind(&input.product_code)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let bom_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM boms WHERE product_id = $1 AND status = 'active'",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NoActiveBom)?;

        let recipe = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT spare_id, quantity_per_unit, weight_percent, position
            FROM bom_components
            WHERE bom_id = $1
            ORDER BY position
            "#,
        )
        .bind(bom_id)
        .fetch_all(&self.db)
        .await?;

        let recipe: Vec<RecipeComponent> = recipe.into_iter().map(RecipeComponent::from).collect();
        let snapshot = snapshot_recipe(&recipe);

        let mut tx = self.db.begin().await?;
        let mut run_ids = Vec::with_capacity(input.quantity as usize);

        for _ in 0..input.quantity {
            let run_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO production_runs (product_id, bom_id, expected_date, status, progress_percent, created_by)
                VALUES ($1, $2, $3, $4, 0, $5)
                RETURNING id
                "#,
            )
            .bind(product_id)
            .bind(bom_id)
            .bind(input.expected_date)
            .bind(RunStatus::Planned.as_str())
            .bind(actor)
            .fetch_one(&mut *tx)
            .await?;

            for component in &snapshot {
                sqlx::query(
                    r#"
                    INSERT INTO production_run_components (run_id, spare_id, quantity_per_unit, weight_percent, position)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(run_id)
                .bind(component.spare_id)
                .bind(component.quantity_per_unit)
                .bind(component.weight_percent)
                .bind(component.position)
                .execute(&mut *tx)
                .await?;
            }

            run_ids.push(run_id);
        }

        tx.commit().await?;

        tracing::info!(
            product = %input.product_code,
            runs = run_ids.len(),
            "planned production runs"
        );

        Ok(run_ids)
    }

    /// List production runs with product name, image and progress
    pub async fn list_runs(&self) -> AppResult<Vec<ProductionRunListing>> {
        let rows = sqlx::query_as::<_, ProductionRunListing>(
            r#"
            SELECT r.id, i.code AS product_code, i.name AS product_name, i.image_url,
                   r.expected_date, r.status, r.progress_percent, r.created_by, r.created_at
            FROM production_runs r
            JOIN items i ON i.id = r.product_id
            ORDER BY r.created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Get one run with its frozen snapshot
    pub async fn get_run(&self, run_id: Uuid) -> AppResult<ProductionRun> {
        let row = sqlx::query_as::<_, RunRow>(&format!(
            "SELECT {RUN_COLUMNS} FROM production_runs WHERE id = $1",
        ))
        .bind(run_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production run".to_string()))?;

        let components = self.get_snapshot(run_id).await?;

        Ok(ProductionRun {
            id: row.id,
            product_id: row.product_id,
            bom_id: row.bom_id,
            expected_date: row.expected_date,
            status: row.status,
            progress_percent: row.progress_percent,
            created_by: row.created_by,
            created_at: row.created_at,
            components,
        })
    }

    /// Update a run's progress. Reaching 100% completes the run: component
    /// stock is consumed per the frozen snapshot and the produced unit is
    /// booked in, all in one transaction.
    pub async fn update_progress(
        &self,
        actor: &str,
        run_id: Uuid,
        input: UpdateProgressInput,
    ) -> AppResult<ProductionRun> {
        if !(0..=100).contains(&input.progress_percent) {
            return Err(AppError::validation(
                "progress_percent",
                "Progress must be between 0 and 100",
            ));
        }

        let mut tx = self.db.begin().await?;

        // Lock the run row so concurrent updates serialize; the completion
        // branch must run at most once per run.
        let row = sqlx::query_as::<_, RunRow>(&format!(
            "SELECT {RUN_COLUMNS} FROM production_runs WHERE id = $1 FOR UPDATE",
        ))
        .bind(run_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production run".to_string()))?;

        let current = RunStatus::parse(&row.status).unwrap_or(RunStatus::Planned);
        if current.is_terminal() {
            return Err(AppError::Conflict(
                "Production run is already completed".to_string(),
            ));
        }
        if input.progress_percent < row.progress_percent {
            return Err(AppError::validation(
                "progress_percent",
                "Progress cannot move backwards",
            ));
        }

        let new_status = RunStatus::from_progress(input.progress_percent);
        let completing = new_status == RunStatus::Completed;

        let warehouse_code = if completing {
            match input.warehouse_code.as_deref() {
                Some(code) if !code.trim().is_empty() => code.trim().to_string(),
                _ => {
                    return Err(AppError::validation(
                        "warehouse_code",
                        "Warehouse is required when completing a run",
                    ))
                }
            }
        } else {
            String::new()
        };

        let mut snapshot = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT spare_id, quantity_per_unit, weight_percent, position
            FROM production_run_components
            WHERE run_id = $1
            ORDER BY position
            "#,
        )
        .bind(run_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(RecipeComponent::from)
        .collect::<Vec<_>>();
        // Stable lock order when multiple runs touch overlapping components.
        snapshot.sort_by(|a, b| a.spare_id.cmp(&b.spare_id));

        let updated = sqlx::query(
            r#"
            UPDATE production_runs
            SET status = $1, progress_percent = $2
            WHERE id = $3 AND status <> $4
            "#,
        )
        .bind(new_status.as_str())
        .bind(input.progress_percent)
        .bind(run_id)
        .bind(RunStatus::Completed.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Production run is already completed".to_string(),
            ));
        }

        if completing {
            for component in &snapshot {
                StockService::record_movement_in_tx(
                    &mut tx,
                    component.spare_id,
                    &warehouse_code,
                    -component.quantity_per_unit,
                    "production_consumption",
                    actor,
                )
                .await?;
            }

            StockService::record_movement_in_tx(
                &mut tx,
                row.product_id,
                &warehouse_code,
                1,
                "production_output",
                actor,
            )
            .await?;
        }

        tx.commit().await?;

        self.get_run(run_id).await
    }

    async fn get_snapshot(&self, run_id: Uuid) -> AppResult<Vec<RecipeComponent>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT spare_id, quantity_per_unit, weight_percent, position
            FROM production_run_components
            WHERE run_id = $1
            ORDER BY position
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(RecipeComponent::from).collect())
    }
}
