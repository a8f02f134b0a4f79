//! Delivery zone rules: postal-code classification and warehouse selection.
//!
//! The zone table is static configuration; the estimator never reserves
//! stock, so results may go stale between the estimate and actual dispatch.

use serde::{Deserialize, Serialize};

/// Lead time added when falling back to a warehouse outside the zone.
pub const FALLBACK_PENALTY_DAYS: u32 = 1;

/// Base lead time for postal codes that match no configured prefix.
pub const DEFAULT_LEAD_DAYS: u32 = 5;

/// Name reported for unmatched postal codes.
pub const DEFAULT_ZONE_NAME: &str = "Other";

/// A geographic zone: its postal prefixes, the warehouse that naturally
/// serves it (if any), and the base lead time in days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub prefixes: Vec<String>,
    /// Warehouse code that normally fulfils this zone.
    pub warehouse: Option<String>,
    pub lead_days: u32,
}

/// Static prefix table used for zone classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneTable {
    pub zones: Vec<Zone>,
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self {
            zones: vec![
                Zone {
                    name: "Central".to_string(),
                    prefixes: vec!["11".to_string(), "12".to_string()],
                    warehouse: Some("WH_A".to_string()),
                    lead_days: 2,
                },
                Zone {
                    name: "North".to_string(),
                    prefixes: vec!["2".to_string()],
                    warehouse: Some("WH_A".to_string()),
                    lead_days: 3,
                },
                Zone {
                    name: "South".to_string(),
                    prefixes: vec!["5".to_string(), "6".to_string()],
                    warehouse: Some("WH_B".to_string()),
                    lead_days: 3,
                },
                Zone {
                    name: "East".to_string(),
                    prefixes: vec!["7".to_string()],
                    warehouse: Some("WH_B".to_string()),
                    lead_days: 4,
                },
            ],
        }
    }
}

impl ZoneTable {
    /// Classify a postal code via longest-prefix match. Codes matching no
    /// configured prefix fall into the default "Other" zone with no natural
    /// warehouse and the default lead time.
    pub fn match_postal(&self, postal_code: &str) -> Zone {
        let mut best: Option<&Zone> = None;
        let mut best_len = 0usize;

        for zone in &self.zones {
            for prefix in &zone.prefixes {
                if postal_code.starts_with(prefix.as_str()) && prefix.len() > best_len {
                    best = Some(zone);
                    best_len = prefix.len();
                }
            }
        }

        match best {
            Some(zone) => zone.clone(),
            None => Zone {
                name: DEFAULT_ZONE_NAME.to_string(),
                prefixes: Vec::new(),
                warehouse: None,
                lead_days: DEFAULT_LEAD_DAYS,
            },
        }
    }
}

/// Warehouse chosen for an estimate, with the resulting lead time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseChoice {
    pub warehouse: String,
    pub delivery_days: u32,
}

/// Pick a fulfilling warehouse from current stock levels.
///
/// Selection order: the caller's preferred warehouse if it has stock, then
/// the zone's natural warehouse, then any warehouse with stock at a one-day
/// penalty. `None` means the item is unavailable everywhere.
pub fn select_warehouse(
    zone: &Zone,
    preferred: Option<&str>,
    levels: &[(String, i64)],
) -> Option<WarehouseChoice> {
    let has_stock = |code: &str| {
        levels
            .iter()
            .any(|(wh, qty)| wh == code && *qty > 0)
    };

    if let Some(preferred) = preferred {
        if has_stock(preferred) {
            return Some(WarehouseChoice {
                warehouse: preferred.to_string(),
                delivery_days: zone.lead_days,
            });
        }
    }

    if let Some(natural) = zone.warehouse.as_deref() {
        if has_stock(natural) {
            return Some(WarehouseChoice {
                warehouse: natural.to_string(),
                delivery_days: zone.lead_days,
            });
        }
    }

    levels
        .iter()
        .find(|(_, qty)| *qty > 0)
        .map(|(wh, _)| WarehouseChoice {
            warehouse: wh.clone(),
            delivery_days: zone.lead_days + FALLBACK_PENALTY_DAYS,
        })
}
