//! Returns and payment reconciliation tests
//!
//! Tests for the derived order financials:
//! - Unit price derivation from line totals
//! - Effective total shrinking as units come back
//! - Payment status derivation across the full scenario set
//! - Return state exclusivity

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::{
    derive_payment_status, derive_return_state, derive_unit_price, effective_total,
    validate_payment_amount, ItemKind, PaymentStatus, ReturnState, UnitGate,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test unit price derivation from a line total
    #[test]
    fn test_unit_price_derivation() {
        assert_eq!(derive_unit_price(dec("300"), 3), dec("100"));
        assert_eq!(derive_unit_price(dec("100"), 3), dec("33.33"));
        assert_eq!(derive_unit_price(dec("0.05"), 2), dec("0.03"));
    }

    /// Test degenerate quantities price at zero
    #[test]
    fn test_unit_price_zero_quantity() {
        assert_eq!(derive_unit_price(dec("100"), 0), Decimal::ZERO);
        assert_eq!(derive_unit_price(dec("100"), -1), Decimal::ZERO);
    }

    /// Test effective total shrinks by returned unit values
    #[test]
    fn test_effective_total_after_returns() {
        let total = effective_total(dec("1000"), &[dec("100"), dec("250")]);
        assert_eq!(total, dec("650"));
    }

    /// Test payment amount validation
    #[test]
    fn test_payment_amount_validation() {
        assert!(validate_payment_amount(dec("0.01")).is_ok());
        assert!(validate_payment_amount(Decimal::ZERO).is_err());
        assert!(validate_payment_amount(dec("-5")).is_err());
    }

    /// Order of 1000 with no payments, inside the term: pending
    #[test]
    fn test_status_unpaid_within_term() {
        let status = derive_payment_status(
            dec("1000"),
            Decimal::ZERO,
            date(2024, 1, 1),
            30,
            date(2024, 1, 15),
        );
        assert_eq!(status, PaymentStatus::Pending);
    }

    /// Order of 1000 with 400 paid: partially paid
    #[test]
    fn test_status_partial_payment() {
        let status = derive_payment_status(
            dec("1000"),
            dec("400"),
            date(2024, 1, 1),
            30,
            date(2024, 1, 15),
        );
        assert_eq!(status, PaymentStatus::PartiallyPaid);
    }

    /// Order of 1000 with 400 then 600 paid: paid
    #[test]
    fn test_status_fully_paid() {
        let status = derive_payment_status(
            dec("1000"),
            dec("400") + dec("600"),
            date(2024, 1, 1),
            30,
            date(2024, 1, 15),
        );
        assert_eq!(status, PaymentStatus::Paid);
    }

    /// Fully returned order (effective total zero), nothing paid: paid
    #[test]
    fn test_status_zero_total_is_paid() {
        let status = derive_payment_status(
            Decimal::ZERO,
            Decimal::ZERO,
            date(2024, 1, 1),
            30,
            date(2024, 1, 15),
        );
        assert_eq!(status, PaymentStatus::Paid);
    }

    /// Order of 1000, nothing paid, past the term: over due
    #[test]
    fn test_status_overdue() {
        let status = derive_payment_status(
            dec("1000"),
            Decimal::ZERO,
            date(2024, 1, 1),
            30,
            date(2024, 2, 15),
        );
        assert_eq!(status, PaymentStatus::OverDue);
    }

    /// Test the exact term boundary: the due day itself is still pending
    #[test]
    fn test_status_due_day_not_overdue() {
        let status = derive_payment_status(
            dec("1000"),
            Decimal::ZERO,
            date(2024, 1, 1),
            30,
            date(2024, 1, 31),
        );
        assert_eq!(status, PaymentStatus::Pending);
    }

    /// Test return state derivation from unit counts
    #[test]
    fn test_return_state_counts() {
        assert_eq!(derive_return_state(4, 0), ReturnState::None);
        assert_eq!(derive_return_state(4, 1), ReturnState::Partial);
        assert_eq!(derive_return_state(4, 4), ReturnState::Full);
    }

    /// Test each return's recount covers every return recorded before it:
    /// returning both units of a two-unit order one at a time must land on
    /// full, never stall at partial
    #[test]
    fn test_return_recount_includes_prior_returns() {
        let mut returned = 0;
        let mut states = Vec::new();
        for _ in 0..2 {
            returned += 1;
            states.push(derive_return_state(2, returned));
        }
        assert_eq!(states, vec![ReturnState::Partial, ReturnState::Full]);
    }

    /// Test a returned unit can never be returned again
    #[test]
    fn test_return_exclusivity() {
        let unit = UnitGate {
            unit_id: Uuid::new_v4(),
            kind: ItemKind::Product,
            serial_no: Some("SN-001".to_string()),
            stock_deducted: true,
            returned: true,
        };
        assert!(!unit.can_return());
    }

    /// Test an undispatched unit cannot be returned
    #[test]
    fn test_return_requires_dispatch() {
        let unit = UnitGate {
            unit_id: Uuid::new_v4(),
            kind: ItemKind::Spare,
            serial_no: None,
            stock_deducted: false,
            returned: false,
        };
        assert!(!unit.can_return());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn money_strategy() -> impl Strategy<Value = Decimal> {
        (1u64..1_000_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Derived unit prices always carry at most two decimal places
        #[test]
        fn prop_unit_price_two_decimals(
            total in money_strategy(),
            quantity in 1i64..1000i64
        ) {
            let price = derive_unit_price(total, quantity);
            prop_assert!(price.scale() <= 2);
            prop_assert!(price >= Decimal::ZERO);
        }

        /// Paying at least the effective total always lands on paid
        #[test]
        fn prop_covering_payment_is_paid(
            total in money_strategy(),
            extra in money_strategy()
        ) {
            let status = derive_payment_status(
                total,
                total + extra,
                date(2024, 1, 1),
                30,
                date(2024, 6, 1),
            );
            prop_assert_eq!(status, PaymentStatus::Paid);
        }

        /// A partial payment is never reported as paid or over due
        #[test]
        fn prop_partial_payment_stays_partial(
            total in money_strategy(),
            fraction in 1u32..99u32
        ) {
            let paid = (total * Decimal::from(fraction)) / Decimal::from(100);
            prop_assume!(paid > Decimal::ZERO && paid < total);

            let status = derive_payment_status(
                total,
                paid,
                date(2024, 1, 1),
                30,
                date(2024, 6, 1),
            );
            prop_assert_eq!(status, PaymentStatus::PartiallyPaid);
        }

        /// Returning every unit one at a time always ends on full: no
        /// intermediate recount may leave the final state short
        #[test]
        fn prop_all_units_returned_is_full(total in 1i64..50i64) {
            let mut state = derive_return_state(total, 0);
            for returned in 1..=total {
                state = derive_return_state(total, returned);
            }
            prop_assert_eq!(state, ReturnState::Full);
        }

        /// Return state bands are exclusive and exhaustive
        #[test]
        fn prop_return_state_bands(
            total in 1i64..100i64,
            returned in 0i64..100i64
        ) {
            let returned = returned.min(total);
            let state = derive_return_state(total, returned);

            if returned == 0 {
                prop_assert_eq!(state, ReturnState::None);
            } else if returned < total {
                prop_assert_eq!(state, ReturnState::Partial);
            } else {
                prop_assert_eq!(state, ReturnState::Full);
            }
        }

        /// Effective total decreases monotonically as units come back
        #[test]
        fn prop_effective_total_monotonic(
            original in money_strategy(),
            prices in prop::collection::vec(money_strategy(), 0..10)
        ) {
            let mut last = effective_total(original, &[]);
            for n in 1..=prices.len() {
                let current = effective_total(original, &prices[..n]);
                prop_assert!(current <= last);
                last = current;
            }
        }
    }
}
