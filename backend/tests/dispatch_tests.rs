//! Dispatch gating tests
//!
//! Tests for the serial gate and the one-time stock deduction:
//! - Product units without a serial block order completion
//! - Spare units are exempt from the serial requirement
//! - A retried completion finds nothing left to deduct

use proptest::prelude::*;
use uuid::Uuid;

use shared::{serials_pending, units_to_deduct, validate_serial, ItemKind, UnitGate};

fn unit(kind: ItemKind, serial_no: Option<&str>, stock_deducted: bool) -> UnitGate {
    UnitGate {
        unit_id: Uuid::new_v4(),
        kind,
        serial_no: serial_no.map(str::to_string),
        stock_deducted,
        returned: false,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test a product unit without a serial blocks dispatch
    #[test]
    fn test_missing_serial_blocks() {
        assert!(unit(ItemKind::Product, None, false).blocks_dispatch());
    }

    /// Test a blank serial is treated as missing
    #[test]
    fn test_blank_serial_blocks() {
        assert!(unit(ItemKind::Product, Some("   "), false).blocks_dispatch());
    }

    /// Test a serialized product unit passes the gate
    #[test]
    fn test_serialized_product_passes() {
        assert!(!unit(ItemKind::Product, Some("SN-001"), false).blocks_dispatch());
    }

    /// Test spare units never need serials
    #[test]
    fn test_spares_exempt() {
        assert!(!unit(ItemKind::Spare, None, false).blocks_dispatch());
    }

    /// Test serials freeze once the unit's stock is deducted
    #[test]
    fn test_serial_frozen_after_deduction() {
        assert!(unit(ItemKind::Product, None, false).serial_mutable());
        assert!(!unit(ItemKind::Product, Some("SN-001"), true).serial_mutable());
        assert!(!unit(ItemKind::Spare, None, true).serial_mutable());
    }

    /// Test serial validation rejects blank input
    #[test]
    fn test_serial_validation() {
        assert!(validate_serial("SN-001").is_ok());
        assert!(validate_serial("").is_err());
        assert!(validate_serial("  ").is_err());
    }

    /// Test pending serials are reported per blocking unit
    #[test]
    fn test_serials_pending_lists_blockers() {
        let blocked = unit(ItemKind::Product, None, false);
        let units = vec![
            blocked.clone(),
            unit(ItemKind::Product, Some("SN-002"), false),
            unit(ItemKind::Spare, None, false),
        ];

        let pending = serials_pending(&units);
        assert_eq!(pending, vec![blocked.unit_id]);
    }

    /// Test only undeducted units qualify for deduction
    #[test]
    fn test_deduction_skips_already_deducted() {
        let fresh = unit(ItemKind::Product, Some("SN-001"), false);
        let units = vec![
            fresh.clone(),
            unit(ItemKind::Spare, None, true),
        ];

        let to_deduct = units_to_deduct(&units);
        assert_eq!(to_deduct, vec![fresh.unit_id]);
    }

    /// Test a retried completion is a no-op: everything already deducted
    #[test]
    fn test_retry_finds_nothing_to_deduct() {
        let units = vec![
            unit(ItemKind::Product, Some("SN-001"), true),
            unit(ItemKind::Spare, None, true),
        ];

        assert!(units_to_deduct(&units).is_empty());
    }

    /// Test item classification drives the gate
    #[test]
    fn test_kind_classification() {
        assert_eq!(ItemKind::classify("PUMP-100"), ItemKind::Product);
        assert_eq!(ItemKind::classify("4711"), ItemKind::Spare);
        assert_eq!(ItemKind::classify("A1"), ItemKind::Product);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn gate_strategy() -> impl Strategy<Value = UnitGate> {
        (
            prop::sample::select(vec![ItemKind::Product, ItemKind::Spare]),
            prop::option::of("[A-Z]{2}-[0-9]{3}"),
            any::<bool>(),
        )
            .prop_map(|(kind, serial_no, stock_deducted)| UnitGate {
                unit_id: Uuid::new_v4(),
                kind,
                serial_no,
                stock_deducted,
                returned: false,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Spare units never appear in the pending-serials list
        #[test]
        fn prop_spares_never_pending(
            units in prop::collection::vec(gate_strategy(), 0..20)
        ) {
            let pending = serials_pending(&units);
            for u in &units {
                if u.kind == ItemKind::Spare {
                    prop_assert!(!pending.contains(&u.unit_id));
                }
            }
        }

        /// After marking every unit deducted, a second pass deducts nothing
        #[test]
        fn prop_deduction_idempotent(
            units in prop::collection::vec(gate_strategy(), 0..20)
        ) {
            let first_pass = units_to_deduct(&units);

            let after: Vec<UnitGate> = units
                .iter()
                .map(|u| UnitGate { stock_deducted: true, ..u.clone() })
                .collect();

            let second_pass = units_to_deduct(&after);

            prop_assert!(second_pass.is_empty());
            // The first pass covered exactly the undeducted units
            prop_assert_eq!(
                first_pass.len(),
                units.iter().filter(|u| !u.stock_deducted).count()
            );
        }
    }
}
