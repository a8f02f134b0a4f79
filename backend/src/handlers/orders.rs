//! HTTP handlers for order endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::orders::{CreateOrderInput, OrderDetail, OrderService};
use crate::AppState;

/// Create an order with its lines and dispatch units
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.create_order(input).await?;
    Ok(Json(order))
}

/// Get an order with its lines
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}
