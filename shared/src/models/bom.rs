//! Bill-of-materials models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One component line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeComponent {
    pub spare_id: Uuid,
    pub quantity_per_unit: i64,
    pub weight_percent: Decimal,
    pub position: i32,
}

/// Freeze a value-copy of a recipe for a production run.
///
/// The copy is embedded in the run so that later edits to the live BOM
/// never retroactively change the component requirements of runs already
/// committed to the shop floor.
pub fn snapshot_recipe(components: &[RecipeComponent]) -> Vec<RecipeComponent> {
    components.to_vec()
}
