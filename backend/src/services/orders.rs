//! Sales order intake service
//!
//! Creates the order, its lines, and one dispatch unit per physical unit.
//! The financial fields stored here (payment_status, return_state) are
//! derived caches; payments and returned_items are the ground truth.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Order service for intake and lookup
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// One line of a create-order request
#[derive(Debug, Deserialize)]
pub struct OrderLineInput {
    pub item_code: String,
    pub quantity: i64,
    pub total_price: Decimal,
    /// Warehouse the line's units will ship from.
    pub warehouse_code: String,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub order_no: String,
    pub customer_name: String,
    pub invoice_date: NaiveDate,
    pub payment_term_days: Option<i32>,
    pub lines: Vec<OrderLineInput>,
}

/// A stored order
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_no: String,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub invoice_date: NaiveDate,
    pub payment_term_days: i32,
    pub payment_status: String,
    pub return_state: String,
    pub dispatched: bool,
    pub dispatched_by: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A stored order line
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub item_code: String,
    pub quantity: i64,
    pub total_price: Decimal,
}

/// Order with its lines
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

pub(crate) const ORDER_COLUMNS: &str = "id, order_no, customer_name, total_amount, invoice_date, \
     payment_term_days, payment_status, return_state, dispatched, dispatched_by, dispatched_at, \
     created_at";

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order with its lines and dispatch units
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<OrderDetail> {
        if input.order_no.trim().is_empty() {
            return Err(AppError::validation("order_no", "Order number cannot be empty"));
        }
        if input.lines.is_empty() {
            return Err(AppError::validation("lines", "An order needs at least one line"));
        }
        for line in &input.lines {
            if line.quantity <= 0 {
                return Err(AppError::validation(
                    "quantity",
                    "Line quantity must be positive",
                ));
            }
            if line.total_price < Decimal::ZERO {
                return Err(AppError::validation(
                    "total_price",
                    "Line total cannot be negative",
                ));
            }
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE order_no = $1)",
        )
        .bind(input.order_no.trim())
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::Conflict(format!(
                "Order {} already exists",
                input.order_no.trim()
            )));
        }

        // Resolve items up front so a bad code fails before any insert.
        let mut item_ids = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let item_id =
                sqlx::query_scalar::<_, Uuid>("SELECT id FROM items WHERE code = $1")
                    .bind(&line.item_code)
                    .fetch_optional(&self.db)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Item".to_string()))?;
            item_ids.push(item_id);
        }

        let total_amount: Decimal = input.lines.iter().map(|l| l.total_price).sum();
        let term_days = input.payment_term_days.unwrap_or(30);

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (order_no, customer_name, total_amount, invoice_date, payment_term_days)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(input.order_no.trim())
        .bind(&input.customer_name)
        .bind(total_amount)
        .bind(input.invoice_date)
        .bind(term_days)
        .fetch_one(&mut *tx)
        .await?;

        for (line, item_id) in input.lines.iter().zip(item_ids.iter()) {
            let line_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO order_lines (order_id, item_id, quantity, total_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(order.id)
            .bind(item_id)
            .bind(line.quantity)
            .bind(line.total_price)
            .fetch_one(&mut *tx)
            .await?;

            // One dispatch unit per physical unit on the line.
            for _ in 0..line.quantity {
                sqlx::query(
                    r#"
                    INSERT INTO dispatch_units (order_id, order_line_id, item_id, warehouse_code)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(order.id)
                .bind(line_id)
                .bind(item_id)
                .bind(&line.warehouse_code)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get_order(order.id).await
    }

    /// Get an order with its lines
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderDetail> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1",
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT ol.id, ol.order_id, ol.item_id, i.code AS item_code, ol.quantity, ol.total_price
            FROM order_lines ol
            JOIN items i ON i.id = ol.item_id
            WHERE ol.order_id = $1
            ORDER BY i.code
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderDetail { order, lines })
    }
}
