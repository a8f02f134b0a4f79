//! HTTP handlers for bill-of-materials endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::bom::{Bom, BomDetail, BomService, CreateBomInput};
use crate::AppState;

/// Create a new BOM version, archiving any prior active one
pub async fn create_bom(
    State(state): State<AppState>,
    Json(input): Json<CreateBomInput>,
) -> AppResult<Json<Bom>> {
    let service = BomService::new(state.db);
    let bom = service.create_bom(input).await?;
    Ok(Json(bom))
}

/// Get the active BOM for a product, with per-component availability
pub async fn get_bom(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
) -> AppResult<Json<BomDetail>> {
    let service = BomService::new(state.db);
    let detail = service.get_bom(&product_code).await?;
    Ok(Json(detail))
}
