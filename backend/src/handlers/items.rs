//! HTTP handlers for item catalog endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use shared::Item;

use crate::error::AppResult;
use crate::services::catalog::{CatalogService, CreateItemInput};
use crate::AppState;

/// Create a catalog item
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItemInput>,
) -> AppResult<Json<Item>> {
    let service = CatalogService::new(state.db);
    let item = service.create_item(input).await?;
    Ok(Json(item))
}

/// List all catalog items
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<Item>>> {
    let service = CatalogService::new(state.db);
    let items = service.list_items().await?;
    Ok(Json(items))
}

/// Get an item by code
pub async fn get_item(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Item>> {
    let service = CatalogService::new(state.db);
    let item = service.get_item_by_code(&code).await?;
    Ok(Json(item))
}
