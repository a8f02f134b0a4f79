//! Order dispatch and return gating logic

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ItemKind;

/// Dispatch-relevant state of one physical unit bound to an order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitGate {
    pub unit_id: Uuid,
    pub kind: ItemKind,
    pub serial_no: Option<String>,
    pub stock_deducted: bool,
    pub returned: bool,
}

impl UnitGate {
    /// Product units need a serial before the order can complete; spares
    /// are exempt.
    pub fn blocks_dispatch(&self) -> bool {
        self.kind == ItemKind::Product
            && self
                .serial_no
                .as_deref()
                .map_or(true, |s| s.trim().is_empty())
    }

    /// A serial can be assigned or changed only until the unit's stock is
    /// deducted; from then on it is frozen.
    pub fn serial_mutable(&self) -> bool {
        !self.stock_deducted
    }

    /// A unit can be returned once its stock has been deducted and it has
    /// not come back already.
    pub fn can_return(&self) -> bool {
        self.stock_deducted && !self.returned
    }
}

/// Units whose missing serials block order completion.
pub fn serials_pending(units: &[UnitGate]) -> Vec<Uuid> {
    units
        .iter()
        .filter(|u| u.blocks_dispatch())
        .map(|u| u.unit_id)
        .collect()
}

/// Units still awaiting their one-time stock deduction.
///
/// Retried completions find every unit already deducted and this comes back
/// empty, which is what makes dispatch completion idempotent.
pub fn units_to_deduct(units: &[UnitGate]) -> Vec<Uuid> {
    units
        .iter()
        .filter(|u| !u.stock_deducted)
        .map(|u| u.unit_id)
        .collect()
}
