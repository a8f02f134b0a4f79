//! Item catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ItemKind;

/// A stock-keeping item: a finished product or a spare part.
///
/// Identity (id, code, kind) is immutable; descriptive fields may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub kind: ItemKind,
    pub unit_price: Decimal,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
