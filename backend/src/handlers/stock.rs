//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use shared::{StockMovement, StockSummary};

use crate::error::AppResult;
use crate::middleware::CurrentActor;
use crate::services::stock::{RecordMovementInput, StockService};
use crate::AppState;

/// Record a stock movement
pub async fn record_movement(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<StockSummary>> {
    let service = StockService::new(state.db);
    let summary = service.record_movement(&actor.name, input).await?;
    Ok(Json(summary))
}

/// Get the stock summary for an item
pub async fn get_stock_summary(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<StockSummary>> {
    let service = StockService::new(state.db);
    let summary = service.get_summary(&code).await?;
    Ok(Json(summary))
}

/// List ledger movements for an item, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockService::new(state.db);
    let movements = service.list_movements(&code).await?;
    Ok(Json(movements))
}

/// Rebuild an item's summary from its ledger
pub async fn rebuild_summary(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<StockSummary>> {
    let service = StockService::new(state.db);
    let summary = service.rebuild_summary(&code).await?;
    Ok(Json(summary))
}
