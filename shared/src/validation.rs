//! Validation and derivation rules for the Godown fulfillment engine.
//!
//! Derived values (payment status, return state, effective totals) are
//! never ground truth in the store; these functions are the single place
//! they are computed from.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{PaymentStatus, ReturnState};

/// Validate a stock movement quantity (signed; zero carries no information).
pub fn validate_movement_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity == 0 {
        return Err("Movement quantity cannot be zero");
    }
    Ok(())
}

/// Validate a serial number before binding it to a dispatch unit.
pub fn validate_serial(serial: &str) -> Result<(), &'static str> {
    if serial.trim().is_empty() {
        return Err("Serial number cannot be blank");
    }
    Ok(())
}

/// Validate BOM component weight percentages sum to 100.
pub fn validate_weight_percents(percents: &[Decimal]) -> Result<(), &'static str> {
    let total: Decimal = percents.iter().sum();
    if total != Decimal::from(100) {
        return Err("Component weight percentages must sum to 100%");
    }
    for p in percents {
        if *p < Decimal::ZERO {
            return Err("Component weight percentages cannot be negative");
        }
    }
    Ok(())
}

/// Validate a payment amount.
pub fn validate_payment_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Payment amount must be positive");
    }
    Ok(())
}

/// Per-unit price of an order line, derived from the line total.
///
/// Rounded half-up to two decimal places; the store keeps no explicit
/// per-unit price, so this is the canonical derivation.
pub fn derive_unit_price(line_total: Decimal, quantity: i64) -> Decimal {
    if quantity <= 0 {
        return Decimal::ZERO;
    }
    (line_total / Decimal::from(quantity))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Effective payable total: original total minus the value of returned units.
pub fn effective_total(original_total: Decimal, returned_unit_prices: &[Decimal]) -> Decimal {
    original_total - returned_unit_prices.iter().sum::<Decimal>()
}

/// Derive the payment status of an order.
///
/// `effective_total == 0` (e.g. a fully returned order) counts as paid for
/// any non-negative paid amount; the comparison would otherwise degenerate.
pub fn derive_payment_status(
    effective_total: Decimal,
    total_paid: Decimal,
    invoice_date: NaiveDate,
    payment_term_days: i64,
    today: NaiveDate,
) -> PaymentStatus {
    if effective_total >= Decimal::ZERO && total_paid >= effective_total {
        return PaymentStatus::Paid;
    }
    if total_paid > Decimal::ZERO && total_paid < effective_total {
        return PaymentStatus::PartiallyPaid;
    }
    if total_paid == Decimal::ZERO
        && today > invoice_date + chrono::Duration::days(payment_term_days)
    {
        return PaymentStatus::OverDue;
    }
    PaymentStatus::Pending
}

/// Derive the return state of an order from its dispatch unit counts.
pub fn derive_return_state(total_units: i64, returned_units: i64) -> ReturnState {
    if returned_units <= 0 || total_units <= 0 {
        ReturnState::None
    } else if returned_units >= total_units {
        ReturnState::Full
    } else {
        ReturnState::Partial
    }
}
