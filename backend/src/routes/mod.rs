//! Route definitions for the Godown fulfillment API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::actor_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - stock ledger
        .nest("/stock", stock_routes())
        // Protected routes - item catalog
        .nest("/items", item_routes())
        // Protected routes - bills of materials
        .nest("/boms", bom_routes())
        // Protected routes - production planning
        .nest("/production", production_routes())
        // Protected routes - orders
        .nest("/orders", order_routes())
        // Protected routes - dispatch
        .nest("/dispatch", dispatch_routes())
        // Protected routes - returns
        .nest("/returns", returns_routes())
        // Protected routes - payments
        .nest("/payments", payment_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
        // Protected routes - delivery estimation
        .nest("/delivery", delivery_routes())
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/movements", post(handlers::record_movement))
        .route("/items/:code/summary", get(handlers::get_stock_summary))
        .route("/items/:code/movements", get(handlers::list_movements))
        .route("/items/:code/rebuild", post(handlers::rebuild_summary))
        .route_layer(middleware::from_fn(actor_middleware))
}

/// Item catalog routes (protected)
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route("/:code", get(handlers::get_item))
        .route_layer(middleware::from_fn(actor_middleware))
}

/// BOM routes (protected)
fn bom_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_bom))
        .route("/:product_code", get(handlers::get_bom))
        .route_layer(middleware::from_fn(actor_middleware))
}

/// Production planning routes (protected)
fn production_routes() -> Router<AppState> {
    Router::new()
        .route("/runs", get(handlers::list_runs).post(handlers::create_runs))
        .route("/runs/:run_id", get(handlers::get_run))
        .route("/runs/:run_id/progress", put(handlers::update_progress))
        .route_layer(middleware::from_fn(actor_middleware))
}

/// Order routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route_layer(middleware::from_fn(actor_middleware))
}

/// Dispatch routes (protected)
fn dispatch_routes() -> Router<AppState> {
    Router::new()
        .route("/units/:unit_id/serial", put(handlers::assign_serial))
        .route(
            "/orders/:order_id/complete",
            post(handlers::complete_dispatch),
        )
        .route("/orders/:order_id/units", get(handlers::list_dispatch_units))
        .route_layer(middleware::from_fn(actor_middleware))
}

/// Return routes (protected)
fn returns_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders/:order_id/returnable",
            get(handlers::list_returnable),
        )
        .route(
            "/orders/:order_id/units/:unit_id",
            post(handlers::return_unit),
        )
        .route_layer(middleware::from_fn(actor_middleware))
}

/// Payment routes (protected)
fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders/:order_id",
            get(handlers::list_payments).post(handlers::record_payment),
        )
        .route_layer(middleware::from_fn(actor_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/payment-pending", get(handlers::payment_pending_report))
        .route_layer(middleware::from_fn(actor_middleware))
}

/// Delivery estimation routes (protected)
fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route("/estimate", get(handlers::estimate_delivery))
        .route_layer(middleware::from_fn(actor_middleware))
}
