//! HTTP handlers for dispatch endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentActor;
use crate::services::dispatch::{
    AssignSerialInput, DispatchResult, DispatchService, DispatchUnitView,
};
use crate::AppState;

/// Bind a serial number to a dispatch unit
pub async fn assign_serial(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Json(input): Json<AssignSerialInput>,
) -> AppResult<Json<DispatchUnitView>> {
    let service = DispatchService::new(state.db);
    let unit = service.assign_serial(unit_id, input).await?;
    Ok(Json(unit))
}

/// Attempt to complete dispatch for an order
pub async fn complete_dispatch(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<DispatchResult>> {
    let service = DispatchService::new(state.db);
    let result = service.complete_dispatch(&actor.name, order_id).await?;
    Ok(Json(result))
}

/// List an order's dispatch units with their gate state
pub async fn list_dispatch_units(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<DispatchUnitView>>> {
    let service = DispatchService::new(state.db);
    let units = service.list_units(order_id).await?;
    Ok(Json(units))
}
