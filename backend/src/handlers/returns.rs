//! HTTP handlers for return endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentActor;
use crate::services::returns::{ReturnOutcome, ReturnableUnit, ReturnsService};
use crate::AppState;

/// List an order's units with their return eligibility
pub async fn list_returnable(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<ReturnableUnit>>> {
    let service = ReturnsService::new(state.db);
    let units = service.list_returnable(order_id).await?;
    Ok(Json(units))
}

/// Return one dispatched unit
pub async fn return_unit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((order_id, unit_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ReturnOutcome>> {
    let service = ReturnsService::new(state.db);
    let outcome = service.return_unit(&actor.name, order_id, unit_id).await?;
    Ok(Json(outcome))
}
