//! Order Verifier
//!
//! Re-derives a proposed order against live inventory and pricing. Pure:
//! the service loads everything into a [`VerifyContext`] first, so the walk
//! itself is deterministic and unit-testable.
//!
//! The verifier never trusts client input — quantities are clamped, prices
//! recomputed, and every correction is reported as a flag. A non-empty flag
//! set means "re-present the corrected order, do not charge as requested".

use crate::inventory::coupon::apply_discount;
use shared::models::{Coupon, TicketType};
use shared::order::{CorrectedLine, CorrectedOrder, ProposedOrder, VerifyFlag};
use std::collections::{BTreeSet, HashMap};

/// Hard per-line bulk cap, independent of remaining stock
pub const MAX_UNITS_PER_LINE: i64 = 10;

/// A ticket type as the buyer may currently see it
#[derive(Debug, Clone)]
pub struct TicketSale {
    pub ticket: TicketType,
    /// Event live and sale window open
    pub on_sale: bool,
    /// Live remaining units for this caller (reservation-aware)
    pub remaining: i64,
}

/// Coupon resolution result
#[derive(Debug, Clone)]
pub enum CouponContext {
    /// No code submitted
    NotRequested,
    /// Code unknown, inactive, or outside its validity window
    Invalid,
    /// Valid coupon with its live remaining uses
    Valid { coupon: Coupon, remaining_uses: i64 },
}

/// Reservation resolution result
#[derive(Debug, Clone)]
pub enum ReservationContext {
    /// No token submitted
    NotRequested,
    /// Token unknown or the reservation is no longer active
    Invalid,
    /// Active reservation; the token grants access to its pool
    Valid { token: String, ticket_type_id: i64 },
}

/// Everything the verifier needs, loaded in one pass
#[derive(Debug, Clone)]
pub struct VerifyContext {
    pub tickets: HashMap<i64, TicketSale>,
    pub coupon: CouponContext,
    pub reservation: ReservationContext,
}

/// Verify a proposed order against the context
///
/// Walks line items in order. Per line: resolve the ticket type, clamp the
/// quantity to live capacity and the bulk cap, cover what the coupon still
/// can, and check the submitted price against the recomputed one. Items are
/// dropped rather than silently repriced; every correction raises a flag.
pub fn verify(proposed: &ProposedOrder, ctx: &VerifyContext) -> CorrectedOrder {
    let mut flags = BTreeSet::new();
    let mut lines: Vec<CorrectedLine> = Vec::new();

    // Invalid associations are flagged once and nulled for the whole pass
    let reservation_token = match &ctx.reservation {
        ReservationContext::NotRequested => None,
        ReservationContext::Invalid => {
            flags.insert(VerifyFlag::InvalidReservation);
            None
        }
        ReservationContext::Valid { token, .. } => Some(token.clone()),
    };

    let coupon = match &ctx.coupon {
        CouponContext::NotRequested => None,
        CouponContext::Invalid => {
            flags.insert(VerifyFlag::InvalidCoupon);
            None
        }
        CouponContext::Valid {
            coupon,
            remaining_uses,
        } => Some((coupon, (*remaining_uses).max(0))),
    };

    // Capacity depletes across lines of the same ticket type within one order
    let mut capacity_left: HashMap<i64, i64> = ctx
        .tickets
        .iter()
        .map(|(id, sale)| (*id, sale.remaining))
        .collect();

    // Running coupon usage across all items, in item order
    let mut coupon_used: i64 = 0;

    for item in &proposed.lines {
        // 1. Resolve; unknown or not-on-sale drops the item
        let Some(sale) = ctx.tickets.get(&item.ticket_type_id) else {
            flags.insert(VerifyFlag::InvalidTicketId);
            continue;
        };
        if !sale.on_sale {
            flags.insert(VerifyFlag::InvalidTicketId);
            continue;
        }

        // 2. Live capacity for this caller
        let cap = capacity_left
            .get(&item.ticket_type_id)
            .copied()
            .unwrap_or(0);
        if cap < 1 {
            flags.insert(VerifyFlag::TicketsExcess);
            continue;
        }

        // 3. Clamp to capacity and the hard bulk cap
        let quantity = item.quantity.min(cap).min(MAX_UNITS_PER_LINE).max(0);
        if quantity < item.quantity {
            flags.insert(VerifyFlag::TicketsExcess);
        }
        if quantity == 0 {
            continue;
        }

        // 4. Coupon coverage for this line
        let applicable = coupon
            .as_ref()
            .filter(|(c, _)| c.applies_to(item.ticket_type_id));
        let (covered, discounted_price) = match applicable {
            Some((c, uses)) => {
                let allowed = (uses - coupon_used).max(0);
                let covered = quantity.min(allowed);
                if covered < quantity {
                    flags.insert(VerifyFlag::CouponExcess);
                }
                (covered, apply_discount(c, sale.ticket.price))
            }
            None => (0, sale.ticket.price),
        };

        // 5. Price check against the freshly recomputed price. The buyer was
        // shown the discounted price when a coupon applies to this line.
        let expected = if applicable.is_some() {
            discounted_price
        } else {
            sale.ticket.price
        };
        if item.unit_price != expected {
            flags.insert(VerifyFlag::TicketsPriceError);
            continue;
        }

        // Commit: consume capacity and coupon uses, emit line(s). Partial
        // coupon coverage splits the line into discounted + full-price parts.
        coupon_used += covered;
        if let Some(left) = capacity_left.get_mut(&item.ticket_type_id) {
            *left -= quantity;
        }

        if covered > 0 {
            lines.push(CorrectedLine {
                ticket_type_id: item.ticket_type_id,
                unit_price: discounted_price,
                quantity: covered,
                coupon_applied: true,
            });
        }
        if quantity - covered > 0 {
            lines.push(CorrectedLine {
                ticket_type_id: item.ticket_type_id,
                unit_price: sale.ticket.price,
                quantity: quantity - covered,
                coupon_applied: false,
            });
        }
    }

    if lines.is_empty() {
        flags.insert(VerifyFlag::NoTicketsSelected);
    }

    let total = lines.iter().map(CorrectedLine::total).sum();
    let coupon_id = coupon
        .filter(|_| coupon_used > 0)
        .map(|(c, _)| c.id);

    CorrectedOrder {
        lines,
        total,
        coupon_id,
        reservation_token,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::ProposedLine;

    fn make_ticket(id: i64, price: i64) -> TicketType {
        TicketType {
            id,
            event_id: 1,
            name: format!("ticket_{}", id),
            price,
            capacity: 100,
            sale_starts_at: None,
            sale_ends_at: None,
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn make_coupon(id: i64, amount_off: i64, capacity: i64, ticket_ids: Vec<i64>) -> Coupon {
        Coupon {
            id,
            code: "SAVE5".into(),
            amount_off: Some(amount_off),
            percent_off: None,
            capacity,
            valid_from: None,
            valid_until: None,
            ticket_type_ids: ticket_ids,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn ctx_with(tickets: Vec<(TicketType, i64)>) -> VerifyContext {
        VerifyContext {
            tickets: tickets
                .into_iter()
                .map(|(t, remaining)| {
                    (
                        t.id,
                        TicketSale {
                            ticket: t,
                            on_sale: true,
                            remaining,
                        },
                    )
                })
                .collect(),
            coupon: CouponContext::NotRequested,
            reservation: ReservationContext::NotRequested,
        }
    }

    fn line(ticket_type_id: i64, unit_price: i64, quantity: i64) -> ProposedLine {
        ProposedLine {
            ticket_type_id,
            unit_price,
            quantity,
        }
    }

    fn order(lines: Vec<ProposedLine>) -> ProposedOrder {
        ProposedOrder {
            lines,
            coupon_code: None,
            reservation_token: None,
        }
    }

    #[test]
    fn test_clean_order_passes_unchanged() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        let result = verify(&order(vec![line(1, 1000, 2)]), &ctx);

        assert!(result.is_clean());
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].quantity, 2);
        assert_eq!(result.total, 2000);
    }

    #[test]
    fn test_unknown_ticket_dropped() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        let result = verify(&order(vec![line(99, 1000, 1)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::InvalidTicketId));
        assert!(result.flags.contains(&VerifyFlag::NoTicketsSelected));
        assert!(result.lines.is_empty());
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_not_on_sale_dropped() {
        let mut ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        ctx.tickets.get_mut(&1).unwrap().on_sale = false;
        let result = verify(&order(vec![line(1, 1000, 1)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::InvalidTicketId));
        assert!(result.lines.is_empty());
    }

    #[test]
    fn test_sold_out_flags_excess() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 0)]);
        let result = verify(&order(vec![line(1, 1000, 1)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::TicketsExcess));
        assert!(result.flags.contains(&VerifyFlag::NoTicketsSelected));
    }

    #[test]
    fn test_quantity_clamped_to_remaining() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 3)]);
        let result = verify(&order(vec![line(1, 1000, 5)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::TicketsExcess));
        assert_eq!(result.lines[0].quantity, 3);
        assert_eq!(result.total, 3000);
    }

    #[test]
    fn test_bulk_cap_applies_with_plenty_of_stock() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 50)]);
        let result = verify(&order(vec![line(1, 1000, 12)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::TicketsExcess));
        assert_eq!(result.lines[0].quantity, MAX_UNITS_PER_LINE);
    }

    #[test]
    fn test_price_mismatch_drops_item() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        let result = verify(&order(vec![line(1, 900, 1)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::TicketsPriceError));
        assert!(result.lines.is_empty());
    }

    #[test]
    fn test_zero_quantity_dropped_silently() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        let result = verify(&order(vec![line(1, 1000, 0)]), &ctx);

        assert!(!result.flags.contains(&VerifyFlag::TicketsExcess));
        assert!(result.flags.contains(&VerifyFlag::NoTicketsSelected));
    }

    #[test]
    fn test_capacity_depletes_across_duplicate_lines() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 3)]);
        let result = verify(&order(vec![line(1, 1000, 2), line(1, 1000, 2)]), &ctx);

        // second line only gets the one unit left
        assert!(result.flags.contains(&VerifyFlag::TicketsExcess));
        assert_eq!(result.unit_count(), 3);
    }

    #[test]
    fn test_coupon_splits_line_when_capacity_partial() {
        // $5 off coupon with capacity 1, two units requested at the
        // discounted price: unit 1 at $5, unit 2 at $10, total $15
        let mut ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        ctx.coupon = CouponContext::Valid {
            coupon: make_coupon(7, 500, 1, vec![1]),
            remaining_uses: 1,
        };
        let result = verify(&order(vec![line(1, 500, 2)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::CouponExcess));
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].unit_price, 500);
        assert_eq!(result.lines[0].quantity, 1);
        assert!(result.lines[0].coupon_applied);
        assert_eq!(result.lines[1].unit_price, 1000);
        assert_eq!(result.lines[1].quantity, 1);
        assert!(!result.lines[1].coupon_applied);
        assert_eq!(result.total, 1500);
        assert_eq!(result.coupon_id, Some(7));
    }

    #[test]
    fn test_coupon_usage_tracked_across_lines() {
        // capacity 3 across two eligible lines: 2 + 1 covered, rest full price
        let mut ctx = ctx_with(vec![(make_ticket(1, 1000), 10), (make_ticket(2, 2000), 10)]);
        ctx.coupon = CouponContext::Valid {
            coupon: make_coupon(7, 500, 3, vec![1, 2]),
            remaining_uses: 3,
        };
        let result = verify(&order(vec![line(1, 500, 2), line(2, 1500, 2)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::CouponExcess));
        let covered: i64 = result
            .lines
            .iter()
            .filter(|l| l.coupon_applied)
            .map(|l| l.quantity)
            .sum();
        assert_eq!(covered, 3);
        // 2x500 + 1x1500 + 1x2000
        assert_eq!(result.total, 4500);
    }

    #[test]
    fn test_coupon_not_applicable_to_ticket() {
        // eligible set does not include ticket 1: full price expected
        let mut ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        ctx.coupon = CouponContext::Valid {
            coupon: make_coupon(7, 500, 5, vec![2]),
            remaining_uses: 5,
        };
        let result = verify(&order(vec![line(1, 1000, 1)]), &ctx);

        assert!(result.is_clean());
        assert_eq!(result.lines[0].unit_price, 1000);
        assert_eq!(result.coupon_id, None);
    }

    #[test]
    fn test_invalid_coupon_flagged_and_nulled() {
        let mut ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        ctx.coupon = CouponContext::Invalid;
        let result = verify(&order(vec![line(1, 1000, 1)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::InvalidCoupon));
        assert_eq!(result.coupon_id, None);
        // the order itself still verifies at full price
        assert_eq!(result.lines[0].unit_price, 1000);
    }

    #[test]
    fn test_invalid_reservation_flagged_and_nulled() {
        let mut ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        ctx.reservation = ReservationContext::Invalid;
        let result = verify(&order(vec![line(1, 1000, 1)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::InvalidReservation));
        assert_eq!(result.reservation_token, None);
    }

    #[test]
    fn test_valid_reservation_token_carried() {
        let mut ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        ctx.reservation = ReservationContext::Valid {
            token: "press".into(),
            ticket_type_id: 1,
        };
        let result = verify(&order(vec![line(1, 1000, 1)]), &ctx);

        assert!(result.is_clean());
        assert_eq!(result.reservation_token.as_deref(), Some("press"));
    }

    #[test]
    fn test_empty_order_flags_no_tickets() {
        let ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        let result = verify(&order(vec![]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::NoTicketsSelected));
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_exhausted_coupon_with_matching_discounted_price() {
        // remaining_uses 0: nothing covered, but the buyer saw the discounted
        // price, so the line survives at full price with coupon_excess
        let mut ctx = ctx_with(vec![(make_ticket(1, 1000), 10)]);
        ctx.coupon = CouponContext::Valid {
            coupon: make_coupon(7, 500, 1, vec![1]),
            remaining_uses: 0,
        };
        let result = verify(&order(vec![line(1, 500, 1)]), &ctx);

        assert!(result.flags.contains(&VerifyFlag::CouponExcess));
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].unit_price, 1000);
        assert!(!result.lines[0].coupon_applied);
        assert_eq!(result.coupon_id, None);
    }
}
