//! HTTP handlers for production planning endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentActor;
use crate::services::production::{
    CreateRunInput, ProductionRun, ProductionRunListing, ProductionService, UpdateProgressInput,
};
use crate::AppState;

/// Response for planned runs
#[derive(Debug, Serialize)]
pub struct CreateRunsResponse {
    pub run_ids: Vec<Uuid>,
}

/// Plan production runs, one per requested unit
pub async fn create_runs(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<CreateRunInput>,
) -> AppResult<Json<CreateRunsResponse>> {
    let service = ProductionService::new(state.db);
    let run_ids = service.create_runs(&actor.name, input).await?;
    Ok(Json(CreateRunsResponse { run_ids }))
}

/// List production runs
pub async fn list_runs(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductionRunListing>>> {
    let service = ProductionService::new(state.db);
    let runs = service.list_runs().await?;
    Ok(Json(runs))
}

/// Get one run with its frozen component snapshot
pub async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<ProductionRun>> {
    let service = ProductionService::new(state.db);
    let run = service.get_run(run_id).await?;
    Ok(Json(run))
}

/// Update a run's progress; 100% completes it and books the stock moves
pub async fn update_progress(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(run_id): Path<Uuid>,
    Json(input): Json<UpdateProgressInput>,
) -> AppResult<Json<ProductionRun>> {
    let service = ProductionService::new(state.db);
    let run = service.update_progress(&actor.name, run_id, input).await?;
    Ok(Json(run))
}
