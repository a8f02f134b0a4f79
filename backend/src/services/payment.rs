//! Payment reconciliation service
//!
//! Payments are child rows; total_paid and payment_status are always
//! recomputed from them (and from the returned units) rather than trusted
//! as stored ground truth.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use shared::{derive_payment_status, derive_unit_price, validate_payment_amount, PaymentStatus};

use crate::error::{AppError, AppResult};

/// Payment service for partial-payment accumulation and status derivation
#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
}

/// Input for recording a payment
#[derive(Debug, Deserialize)]
pub struct RecordPaymentInput {
    pub payment_ref: String,
    pub paid_on: NaiveDate,
    pub amount: Decimal,
}

/// Outcome of recording a payment
#[derive(Debug, Serialize)]
pub struct PaymentOutcome {
    pub order_id: Uuid,
    pub payment_status: PaymentStatus,
    pub total_paid: Decimal,
    pub effective_total: Decimal,
}

/// A stored payment
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub payment_ref: String,
    pub paid_on: NaiveDate,
    pub amount: Decimal,
    pub recorded_at: DateTime<Utc>,
}

/// Row of the payment-pending report
#[derive(Debug, Serialize)]
pub struct PendingOrder {
    pub order_id: Uuid,
    pub order_no: String,
    pub customer_name: String,
    pub effective_total: Decimal,
    pub total_paid: Decimal,
    pub remaining_amount: Decimal,
    pub payment_status: PaymentStatus,
}

/// Financial state of an order, recomputed from child rows
#[derive(Debug, Clone)]
pub(crate) struct OrderFinancials {
    pub original_total: Decimal,
    pub invoice_date: NaiveDate,
    pub payment_term_days: i32,
    pub returned_value: Decimal,
    pub total_paid: Decimal,
}

impl OrderFinancials {
    pub fn effective_total(&self) -> Decimal {
        self.original_total - self.returned_value
    }

    pub fn remaining(&self) -> Decimal {
        self.effective_total() - self.total_paid
    }

    pub fn status(&self, today: NaiveDate) -> PaymentStatus {
        derive_payment_status(
            self.effective_total(),
            self.total_paid,
            self.invoice_date,
            self.payment_term_days as i64,
            today,
        )
    }
}

#[derive(Debug, FromRow)]
struct ReturnedLineRow {
    total_price: Decimal,
    quantity: i64,
    returned_units: i64,
}

/// Recompute an order's financials from its payment and return child rows.
pub(crate) async fn order_financials(
    conn: &mut PgConnection,
    order_id: Uuid,
) -> AppResult<OrderFinancials> {
    let header = sqlx::query_as::<_, (Decimal, NaiveDate, i32)>(
        "SELECT total_amount, invoice_date, payment_term_days FROM orders WHERE id = $1",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    let total_paid = sqlx::query_scalar::<_, Option<Decimal>>(
        "SELECT SUM(amount) FROM payments WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_one(&mut *conn)
    .await?
    .unwrap_or(Decimal::ZERO);

    let returned_lines = sqlx::query_as::<_, ReturnedLineRow>(
        r#"
        SELECT ol.total_price, ol.quantity, COUNT(r.id) AS returned_units
        FROM order_lines ol
        JOIN dispatch_units du ON du.order_line_id = ol.id
        JOIN returned_items r ON r.dispatch_unit_id = du.id
        WHERE ol.order_id = $1
        GROUP BY ol.id, ol.total_price, ol.quantity
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    // Unit price is derived from the line total; the store keeps none.
    let returned_value: Decimal = returned_lines
        .iter()
        .map(|l| derive_unit_price(l.total_price, l.quantity) * Decimal::from(l.returned_units))
        .sum();

    Ok(OrderFinancials {
        original_total: header.0,
        invoice_date: header.1,
        payment_term_days: header.2,
        returned_value,
        total_paid,
    })
}

/// Re-derive and persist the order's payment status. Used inside the
/// payment and return transactions so the cached column never drifts from
/// the child rows it summarizes.
pub(crate) async fn refresh_payment_status(
    conn: &mut PgConnection,
    order_id: Uuid,
    today: NaiveDate,
) -> AppResult<(PaymentStatus, OrderFinancials)> {
    let financials = order_financials(&mut *conn, order_id).await?;
    let status = financials.status(today);

    sqlx::query("UPDATE orders SET payment_status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    Ok((status, financials))
}

impl PaymentService {
    /// Create a new PaymentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a partial payment and re-derive the order's payment status.
    ///
    /// The order row is locked for the read-modify-write so concurrent
    /// payments against the same order cannot lose an update.
    pub async fn record_payment(
        &self,
        order_id: Uuid,
        input: RecordPaymentInput,
    ) -> AppResult<PaymentOutcome> {
        if input.payment_ref.trim().is_empty() {
            return Err(AppError::validation(
                "payment_ref",
                "Payment reference cannot be empty",
            ));
        }
        if let Err(msg) = validate_payment_amount(input.amount) {
            return Err(AppError::validation("amount", msg));
        }

        let mut tx = self.db.begin().await?;

        let exists =
            sqlx::query_scalar::<_, Option<Uuid>>("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;

        if exists.is_none() {
            return Err(AppError::NotFound("Order".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO payments (order_id, payment_ref, paid_on, amount)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order_id)
        .bind(input.payment_ref.trim())
        .bind(input.paid_on)
        .bind(input.amount)
        .execute(&mut *tx)
        .await?;

        let today = Utc::now().date_naive();
        let (status, financials) = refresh_payment_status(&mut tx, order_id, today).await?;

        tx.commit().await?;

        Ok(PaymentOutcome {
            order_id,
            payment_status: status,
            total_paid: financials.total_paid,
            effective_total: financials.effective_total(),
        })
    }

    /// List payments recorded against an order
    pub async fn list_payments(&self, order_id: Uuid) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, payment_ref, paid_on, amount, recorded_at
            FROM payments
            WHERE order_id = $1
            ORDER BY paid_on, recorded_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(payments)
    }

    /// Payment-pending report: orders whose effective total is not yet
    /// covered by payments.
    pub async fn payment_pending_report(&self) -> AppResult<Vec<PendingOrder>> {
        let orders = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, order_no, customer_name FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        let today = Utc::now().date_naive();
        let mut conn = self.db.acquire().await?;
        let mut pending = Vec::new();

        for (order_id, order_no, customer_name) in orders {
            let financials = order_financials(&mut conn, order_id).await?;
            let remaining = financials.remaining();
            if remaining > Decimal::ZERO {
                pending.push(PendingOrder {
                    order_id,
                    order_no,
                    customer_name,
                    effective_total: financials.effective_total(),
                    total_paid: financials.total_paid,
                    remaining_amount: remaining,
                    payment_status: financials.status(today),
                });
            }
        }

        Ok(pending)
    }
}
