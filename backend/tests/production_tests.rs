//! Production planning tests
//!
//! Tests for BOM recipe validation and run lifecycle:
//! - Weight percentages must sum to 100
//! - Frozen snapshots never change when the live recipe is edited
//! - Progress percentage drives run status

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::{snapshot_recipe, validate_weight_percents, RecipeComponent, RunStatus};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn component(weight: &str, position: i32) -> RecipeComponent {
    RecipeComponent {
        spare_id: Uuid::new_v4(),
        quantity_per_unit: 2,
        weight_percent: dec(weight),
        position,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test valid weight distribution
    #[test]
    fn test_weights_sum_to_hundred() {
        assert!(validate_weight_percents(&[dec("60"), dec("30"), dec("10")]).is_ok());
    }

    /// Test rejection when weights do not sum to 100
    #[test]
    fn test_weights_not_hundred_rejected() {
        assert!(validate_weight_percents(&[dec("60"), dec("30")]).is_err());
        assert!(validate_weight_percents(&[dec("60"), dec("50")]).is_err());
    }

    /// Test fractional weights that still sum to 100
    #[test]
    fn test_fractional_weights() {
        assert!(validate_weight_percents(&[dec("33.5"), dec("33.5"), dec("33")]).is_ok());
    }

    /// Test empty component list never validates
    #[test]
    fn test_empty_weights_rejected() {
        assert!(validate_weight_percents(&[]).is_err());
    }

    /// Test a frozen snapshot survives edits to the live recipe
    #[test]
    fn test_snapshot_immutable() {
        let mut live = vec![component("70", 0), component("30", 1)];
        let frozen = snapshot_recipe(&live);

        // Edit the live recipe after freezing
        live[0].quantity_per_unit = 99;
        live[0].weight_percent = dec("10");
        live.pop();

        assert_eq!(frozen.len(), 2);
        assert_eq!(frozen[0].quantity_per_unit, 2);
        assert_eq!(frozen[0].weight_percent, dec("70"));
    }

    /// Test run status derivation from progress
    #[test]
    fn test_status_from_progress() {
        assert_eq!(RunStatus::from_progress(0), RunStatus::Planned);
        assert_eq!(RunStatus::from_progress(1), RunStatus::InProgress);
        assert_eq!(RunStatus::from_progress(55), RunStatus::InProgress);
        assert_eq!(RunStatus::from_progress(100), RunStatus::Completed);
    }

    /// Test a completed run is terminal: a second completion attempt has
    /// nothing left to do
    #[test]
    fn test_completed_is_terminal() {
        assert!(RunStatus::from_progress(100).is_terminal());
        assert!(!RunStatus::Planned.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
    }

    /// Test status round-trips through its text tag
    #[test]
    fn test_status_text_round_trip() {
        for status in [RunStatus::Planned, RunStatus::InProgress, RunStatus::Completed] {
            assert_eq!(RunStatus::parse(status.as_str()), Some(status));
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A snapshot is always a faithful value-copy at freeze time
        #[test]
        fn prop_snapshot_copies_recipe(
            weights in prop::collection::vec(1u32..100u32, 1..8)
        ) {
            let live: Vec<RecipeComponent> = weights
                .iter()
                .enumerate()
                .map(|(i, w)| component(&w.to_string(), i as i32))
                .collect();

            let frozen = snapshot_recipe(&live);
            prop_assert_eq!(frozen, live);
        }

        /// Progress maps to exactly one status, split at 0 and 100
        #[test]
        fn prop_progress_status_bands(progress in 0i32..=100i32) {
            let status = RunStatus::from_progress(progress);
            if progress == 0 {
                prop_assert_eq!(status, RunStatus::Planned);
            } else if progress < 100 {
                prop_assert_eq!(status, RunStatus::InProgress);
            } else {
                prop_assert_eq!(status, RunStatus::Completed);
            }
        }
    }
}
