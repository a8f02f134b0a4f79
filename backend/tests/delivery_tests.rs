//! Delivery estimation tests
//!
//! Tests for zone classification and warehouse selection:
//! - Longest-prefix matching over the zone table
//! - Fallback warehouse selection at a one-day penalty
//! - The default "Other" zone for unmatched postal codes

use proptest::prelude::*;

use shared::{
    select_warehouse, Zone, ZoneTable, DEFAULT_LEAD_DAYS, DEFAULT_ZONE_NAME,
    FALLBACK_PENALTY_DAYS,
};

fn levels(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
    pairs.iter().map(|(wh, q)| (wh.to_string(), *q)).collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test prefix classification against the default table
    #[test]
    fn test_default_zone_classification() {
        let table = ZoneTable::default();

        assert_eq!(table.match_postal("11520").name, "Central");
        assert_eq!(table.match_postal("12000").name, "Central");
        assert_eq!(table.match_postal("24000").name, "North");
        assert_eq!(table.match_postal("50200").name, "South");
        assert_eq!(table.match_postal("71000").name, "East");
    }

    /// Test the longest prefix wins when prefixes overlap
    #[test]
    fn test_longest_prefix_wins() {
        let table = ZoneTable {
            zones: vec![
                Zone {
                    name: "Wide".to_string(),
                    prefixes: vec!["1".to_string()],
                    warehouse: Some("WH_A".to_string()),
                    lead_days: 4,
                },
                Zone {
                    name: "Narrow".to_string(),
                    prefixes: vec!["11".to_string()],
                    warehouse: Some("WH_B".to_string()),
                    lead_days: 2,
                },
            ],
        };

        assert_eq!(table.match_postal("11520").name, "Narrow");
        assert_eq!(table.match_postal("10400").name, "Wide");
    }

    /// Test unmatched codes fall into the default zone
    #[test]
    fn test_unmatched_postal_default_zone() {
        let table = ZoneTable::default();
        let zone = table.match_postal("99999");

        assert_eq!(zone.name, DEFAULT_ZONE_NAME);
        assert_eq!(zone.lead_days, DEFAULT_LEAD_DAYS);
        assert!(zone.warehouse.is_none());
    }

    /// Test the natural warehouse is used when it has stock
    #[test]
    fn test_natural_warehouse_preferred() {
        let table = ZoneTable::default();
        let zone = table.match_postal("11520");

        let choice =
            select_warehouse(&zone, None, &levels(&[("WH_A", 3), ("WH_B", 10)])).unwrap();

        assert_eq!(choice.warehouse, "WH_A");
        assert_eq!(choice.delivery_days, zone.lead_days);
    }

    /// Test the caller's preferred warehouse overrides the natural one
    #[test]
    fn test_caller_preference_honoured() {
        let table = ZoneTable::default();
        let zone = table.match_postal("11520");

        let choice =
            select_warehouse(&zone, Some("WH_B"), &levels(&[("WH_A", 3), ("WH_B", 10)]))
                .unwrap();

        assert_eq!(choice.warehouse, "WH_B");
        assert_eq!(choice.delivery_days, zone.lead_days);
    }

    /// Test fallback to another warehouse costs one extra day
    #[test]
    fn test_fallback_penalty() {
        let table = ZoneTable::default();
        let zone = table.match_postal("11520");

        let choice = select_warehouse(&zone, None, &levels(&[("WH_B", 5)])).unwrap();

        assert_eq!(choice.warehouse, "WH_B");
        assert_eq!(choice.delivery_days, zone.lead_days + FALLBACK_PENALTY_DAYS);
    }

    /// Test no stock anywhere means no estimate
    #[test]
    fn test_unavailable_everywhere() {
        let table = ZoneTable::default();
        let zone = table.match_postal("11520");

        assert!(select_warehouse(&zone, None, &levels(&[("WH_A", 0)])).is_none());
        assert!(select_warehouse(&zone, None, &[]).is_none());
    }

    /// Test the default zone still ships from any stocked warehouse
    #[test]
    fn test_other_zone_ships_with_penalty() {
        let table = ZoneTable::default();
        let zone = table.match_postal("99999");

        let choice = select_warehouse(&zone, None, &levels(&[("WH_A", 1)])).unwrap();

        assert_eq!(choice.warehouse, "WH_A");
        assert_eq!(
            choice.delivery_days,
            DEFAULT_LEAD_DAYS + FALLBACK_PENALTY_DAYS
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn level_strategy() -> impl Strategy<Value = (String, i64)> {
        (
            prop::sample::select(vec![
                "WH_A".to_string(),
                "WH_B".to_string(),
                "WH_C".to_string(),
            ]),
            0i64..100i64,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A choice is made exactly when some warehouse has stock
        #[test]
        fn prop_choice_iff_stock(
            postal in "[0-9]{5}",
            stock in prop::collection::vec(level_strategy(), 0..5)
        ) {
            let table = ZoneTable::default();
            let zone = table.match_postal(&postal);
            let choice = select_warehouse(&zone, None, &stock);

            let any_stock = stock.iter().any(|(_, q)| *q > 0);
            prop_assert_eq!(choice.is_some(), any_stock);
        }

        /// Delivery days are the zone base or base plus the fallback penalty
        #[test]
        fn prop_days_bounded(
            postal in "[0-9]{5}",
            stock in prop::collection::vec(level_strategy(), 0..5)
        ) {
            let table = ZoneTable::default();
            let zone = table.match_postal(&postal);

            if let Some(choice) = select_warehouse(&zone, None, &stock) {
                prop_assert!(
                    choice.delivery_days == zone.lead_days
                        || choice.delivery_days == zone.lead_days + FALLBACK_PENALTY_DAYS
                );
            }
        }

        /// The chosen warehouse always actually has stock
        #[test]
        fn prop_chosen_warehouse_stocked(
            postal in "[0-9]{5}",
            stock in prop::collection::vec(level_strategy(), 0..5)
        ) {
            let table = ZoneTable::default();
            let zone = table.match_postal(&postal);

            if let Some(choice) = select_warehouse(&zone, None, &stock) {
                prop_assert!(stock
                    .iter()
                    .any(|(wh, q)| wh == &choice.warehouse && *q > 0));
            }
        }
    }
}
