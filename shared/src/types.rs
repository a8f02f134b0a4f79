//! Common enums used across the platform

use serde::{Deserialize, Serialize};

/// Item classification: finished products vs. spare parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Product,
    Spare,
}

impl ItemKind {
    /// Classify an item code: a code carrying at least one alphabetic
    /// character is a finished product, a purely numeric code is a spare.
    pub fn classify(code: &str) -> Self {
        if code.chars().any(|c| c.is_alphabetic()) {
            ItemKind::Product
        } else {
            ItemKind::Spare
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Product => "product",
            ItemKind::Spare => "spare",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(ItemKind::Product),
            "spare" => Some(ItemKind::Spare),
            _ => None,
        }
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    In,
    Out,
}

impl MovementDirection {
    /// Derive the direction tag from a signed quantity.
    pub fn of(quantity: i64) -> Self {
        if quantity >= 0 {
            MovementDirection::In
        } else {
            MovementDirection::Out
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        }
    }
}

/// Derived payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    PartiallyPaid,
    Paid,
    OverDue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::PartiallyPaid => "partially paid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::OverDue => "over due",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "partially paid" => Some(PaymentStatus::PartiallyPaid),
            "paid" => Some(PaymentStatus::Paid),
            "over due" => Some(PaymentStatus::OverDue),
            _ => None,
        }
    }
}

/// How much of an order has come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnState {
    None,
    Partial,
    Full,
}

impl ReturnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnState::None => "none",
            ReturnState::Partial => "partial",
            ReturnState::Full => "full",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(ReturnState::None),
            "partial" => Some(ReturnState::Partial),
            "full" => Some(ReturnState::Full),
            _ => None,
        }
    }
}

/// Lifecycle of a production run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Planned,
    InProgress,
    Completed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Planned => "planned",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(RunStatus::Planned),
            "in_progress" => Some(RunStatus::InProgress),
            "completed" => Some(RunStatus::Completed),
            _ => None,
        }
    }

    /// Completed runs accept no further progress updates.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }

    /// Status implied by a progress percentage.
    pub fn from_progress(progress_percent: i32) -> Self {
        if progress_percent >= 100 {
            RunStatus::Completed
        } else if progress_percent > 0 {
            RunStatus::InProgress
        } else {
            RunStatus::Planned
        }
    }
}

/// BOM lifecycle: at most one active recipe per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BomStatus {
    Active,
    Archived,
}

impl BomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BomStatus::Active => "active",
            BomStatus::Archived => "archived",
        }
    }
}
