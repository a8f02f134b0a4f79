//! Stock ledger tests
//!
//! Tests for the append-only ledger and its summary cache:
//! - Summary totals always equal the sum of ledger quantities
//! - Per-warehouse levels partition the total
//! - Ledger arithmetic is order-independent

use proptest::prelude::*;

use shared::{summary_from_ledger, validate_movement_quantity, MovementDirection};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test direction derivation from signed quantities
    #[test]
    fn test_direction_from_quantity() {
        assert_eq!(MovementDirection::of(5), MovementDirection::In);
        assert_eq!(MovementDirection::of(-3), MovementDirection::Out);
        assert_eq!(MovementDirection::of(0), MovementDirection::In);
    }

    /// Test zero movements are rejected
    #[test]
    fn test_zero_quantity_rejected() {
        assert!(validate_movement_quantity(0).is_err());
        assert!(validate_movement_quantity(1).is_ok());
        assert!(validate_movement_quantity(-1).is_ok());
    }

    /// Test summary over an empty ledger
    #[test]
    fn test_empty_ledger() {
        let (total, levels) = summary_from_ledger(&[]);
        assert_eq!(total, 0);
        assert!(levels.is_empty());
    }

    /// Test summary accumulation across warehouses
    #[test]
    fn test_summary_per_warehouse() {
        let movements = vec![
            ("WH_A".to_string(), 10),
            ("WH_B".to_string(), 5),
            ("WH_A".to_string(), -3),
            ("WH_B".to_string(), 2),
        ];

        let (total, levels) = summary_from_ledger(&movements);

        assert_eq!(total, 14);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].warehouse_code, "WH_A");
        assert_eq!(levels[0].quantity, 7);
        assert_eq!(levels[1].warehouse_code, "WH_B");
        assert_eq!(levels[1].quantity, 7);
    }

    /// Test a warehouse can go negative in the ledger view
    #[test]
    fn test_negative_level_allowed() {
        let movements = vec![("WH_A".to_string(), -4)];
        let (total, levels) = summary_from_ledger(&movements);

        assert_eq!(total, -4);
        assert_eq!(levels[0].quantity, -4);
    }

    /// Test levels come back sorted by warehouse code
    #[test]
    fn test_levels_sorted() {
        let movements = vec![
            ("WH_B".to_string(), 1),
            ("WH_A".to_string(), 1),
        ];
        let (_, levels) = summary_from_ledger(&movements);

        assert_eq!(levels[0].warehouse_code, "WH_A");
        assert_eq!(levels[1].warehouse_code, "WH_B");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn movement_strategy() -> impl Strategy<Value = (String, i64)> {
        (
            prop::sample::select(vec![
                "WH_A".to_string(),
                "WH_B".to_string(),
                "WH_C".to_string(),
            ]),
            -1000i64..1000i64,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Summary total always equals the raw sum of ledger quantities
        #[test]
        fn prop_total_matches_ledger_sum(
            movements in prop::collection::vec(movement_strategy(), 0..50)
        ) {
            let expected: i64 = movements.iter().map(|(_, q)| q).sum();
            let (total, _) = summary_from_ledger(&movements);
            prop_assert_eq!(total, expected);
        }

        /// Per-warehouse levels partition the total exactly
        #[test]
        fn prop_levels_partition_total(
            movements in prop::collection::vec(movement_strategy(), 0..50)
        ) {
            let (total, levels) = summary_from_ledger(&movements);
            let level_sum: i64 = levels.iter().map(|l| l.quantity).sum();
            prop_assert_eq!(total, level_sum);
        }

        /// A rebuild over a ledger that grew by one movement equals the old
        /// summary plus that movement: no entry's contribution is lost
        #[test]
        fn prop_rebuild_additive(
            movements in prop::collection::vec(movement_strategy(), 0..30),
            extra in movement_strategy()
        ) {
            let (base_total, base_levels) = summary_from_ledger(&movements);

            let mut grown = movements.clone();
            grown.push(extra.clone());
            let (total, levels) = summary_from_ledger(&grown);

            prop_assert_eq!(total, base_total + extra.1);

            let base_level = base_levels
                .iter()
                .find(|l| l.warehouse_code == extra.0)
                .map_or(0, |l| l.quantity);
            let level = levels
                .iter()
                .find(|l| l.warehouse_code == extra.0)
                .map_or(0, |l| l.quantity);
            prop_assert_eq!(level, base_level + extra.1);
        }

        /// Ledger arithmetic is order-independent: any permutation of the
        /// same movements produces the same summary
        #[test]
        fn prop_order_independent(
            movements in prop::collection::vec(movement_strategy(), 0..30)
        ) {
            let (total, levels) = summary_from_ledger(&movements);

            let mut reversed = movements.clone();
            reversed.reverse();
            let (total_rev, levels_rev) = summary_from_ledger(&reversed);

            prop_assert_eq!(total, total_rev);
            prop_assert_eq!(levels, levels_rev);
        }
    }
}
