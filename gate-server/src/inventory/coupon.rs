//! Coupon Allocator
//!
//! Remaining-use accounting and the discount transform. Uses rust_decimal
//! for the percentage path, stores minor units as i64.

use rust_decimal::prelude::*;
use shared::models::Coupon;

/// Convert minor units to Decimal for calculation
#[inline]
fn to_decimal(value: i64) -> Decimal {
    Decimal::from_i64(value).unwrap_or_default()
}

/// Convert Decimal back to minor units, rounded half-up
#[inline]
fn to_minor(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

/// Discount uses left on a coupon
///
/// `capacity - used`, where `used` counts capacity-holding attendee records
/// carrying the coupon. May be negative in transient states; callers clamp.
pub fn remaining_uses(capacity: i64, used: i64) -> i64 {
    capacity - used
}

/// Apply the coupon's discount to a unit price
///
/// Absolute discount floors at 0 and takes priority over a percentage when
/// both are configured. Percentage is `price - price * pct / 100`, floored
/// at 0.
pub fn apply_discount(coupon: &Coupon, unit_price: i64) -> i64 {
    if let Some(amount) = coupon.amount_off {
        return (unit_price - amount).max(0);
    }

    if let Some(pct) = coupon.percent_off {
        let price = to_decimal(unit_price);
        let rate = Decimal::from_f64(pct).unwrap_or_default() / Decimal::ONE_HUNDRED;
        let discounted = price - price * rate;
        return to_minor(discounted).max(0);
    }

    unit_price
}
