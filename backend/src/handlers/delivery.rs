//! HTTP handlers for delivery estimation

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::delivery::{DeliveryEstimate, DeliveryService, EstimateQuery};
use crate::AppState;

/// Estimate delivery for an item to a destination postal code
pub async fn estimate_delivery(
    State(state): State<AppState>,
    Query(query): Query<EstimateQuery>,
) -> AppResult<Json<DeliveryEstimate>> {
    let zones = state.config.delivery.zone_table();
    let service = DeliveryService::new(state.db, zones);
    let estimate = service.estimate(query).await?;
    Ok(Json(estimate))
}
