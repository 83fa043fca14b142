//! Proposed and corrected order shapes

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A line item as submitted by the client
///
/// `unit_price` is what the client believes the price to be; verification
/// recomputes it and drops the line on mismatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposedLine {
    pub ticket_type_id: i64,
    /// Client-side unit price in minor units
    pub unit_price: i64,
    pub quantity: i64,
}

/// An order as submitted by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposedOrder {
    pub lines: Vec<ProposedLine>,
    pub coupon_code: Option<String>,
    pub reservation_token: Option<String>,
}

/// Violation flags produced by order verification
///
/// Any non-empty flag set means "do not charge as originally requested";
/// the corrected order must be re-presented to the buyer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFlag {
    /// Line referenced an unknown or not-on-sale ticket type
    InvalidTicketId,
    /// Requested quantity exceeded remaining capacity or the per-line cap
    TicketsExcess,
    /// Coupon usage capacity could not cover all requested units
    CouponExcess,
    /// Submitted unit price did not match the freshly computed price
    TicketsPriceError,
    /// No line items survived verification
    NoTicketsSelected,
    /// Coupon code unknown, inactive, or outside its validity window
    InvalidCoupon,
    /// Reservation token unknown or no longer active
    InvalidReservation,
}

/// A verified line item
///
/// A single proposed line may split into two corrected lines when coupon
/// capacity covers it only partially (discounted units + full-price units).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrectedLine {
    pub ticket_type_id: i64,
    /// Recomputed unit price in minor units
    pub unit_price: i64,
    pub quantity: i64,
    /// Whether the coupon discount is baked into `unit_price`
    #[serde(default)]
    pub coupon_applied: bool,
}

impl CorrectedLine {
    /// Line total in minor units
    pub fn total(&self) -> i64 {
        self.unit_price * self.quantity
    }
}

/// The server-derived order: corrected lines, total, and violation flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectedOrder {
    pub lines: Vec<CorrectedLine>,
    /// Sum of line totals in minor units
    pub total: i64,
    /// Resolved coupon id, when a valid coupon applied to at least one line
    pub coupon_id: Option<i64>,
    /// Reservation token, when presented and valid
    pub reservation_token: Option<String>,
    pub flags: BTreeSet<VerifyFlag>,
}

impl CorrectedOrder {
    /// Whether the order may be charged exactly as submitted
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of ticket units across all lines
    pub fn unit_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wire_names() {
        // Flag names are part of the client contract
        let pairs = [
            (VerifyFlag::InvalidTicketId, "\"invalid_ticket_id\""),
            (VerifyFlag::TicketsExcess, "\"tickets_excess\""),
            (VerifyFlag::CouponExcess, "\"coupon_excess\""),
            (VerifyFlag::TicketsPriceError, "\"tickets_price_error\""),
            (VerifyFlag::NoTicketsSelected, "\"no_tickets_selected\""),
            (VerifyFlag::InvalidCoupon, "\"invalid_coupon\""),
            (VerifyFlag::InvalidReservation, "\"invalid_reservation\""),
        ];
        for (flag, wire) in pairs {
            assert_eq!(serde_json::to_string(&flag).unwrap(), wire);
        }
    }

    #[test]
    fn test_unit_count_and_totals() {
        let order = CorrectedOrder {
            lines: vec![
                CorrectedLine {
                    ticket_type_id: 1,
                    unit_price: 500,
                    quantity: 1,
                    coupon_applied: true,
                },
                CorrectedLine {
                    ticket_type_id: 1,
                    unit_price: 1000,
                    quantity: 1,
                    coupon_applied: false,
                },
            ],
            total: 1500,
            coupon_id: Some(9),
            reservation_token: None,
            flags: BTreeSet::new(),
        };
        assert_eq!(order.unit_count(), 2);
        assert_eq!(order.lines.iter().map(CorrectedLine::total).sum::<i64>(), 1500);
        assert!(order.is_clean());
    }
}
