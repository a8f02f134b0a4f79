//! HTTP handlers for payment endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::payment::{
    Payment, PaymentOutcome, PaymentService, PendingOrder, RecordPaymentInput,
};
use crate::AppState;

/// Record a payment against an order
pub async fn record_payment(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<RecordPaymentInput>,
) -> AppResult<Json<PaymentOutcome>> {
    let service = PaymentService::new(state.db);
    let outcome = service.record_payment(order_id, input).await?;
    Ok(Json(outcome))
}

/// List payments recorded against an order
pub async fn list_payments(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<Payment>>> {
    let service = PaymentService::new(state.db);
    let payments = service.list_payments(order_id).await?;
    Ok(Json(payments))
}

/// Report orders whose effective total is not yet covered by payments
pub async fn payment_pending_report(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PendingOrder>>> {
    let service = PaymentService::new(state.db);
    let pending = service.payment_pending_report().await?;
    Ok(Json(pending))
}
