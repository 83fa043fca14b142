//! Inventory & Allocation
//!
//! The pure calculators live in [`calculator`] and [`coupon`]; this service
//! loads live counts and feeds them in. Read-only over persisted state.

pub mod calculator;
pub mod coupon;

pub use calculator::{ReservationUsage, remaining};

use crate::db::repository::{
    AttendeeRepository, CouponRepository, RepoError, RepoResult, ReservationRepository,
    TicketTypeRepository,
};
use shared::models::{Coupon, TicketType};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Read-side service deriving remaining capacity from live record counts
#[derive(Clone)]
pub struct InventoryService {
    tickets: TicketTypeRepository,
    reservations: ReservationRepository,
    attendees: AttendeeRepository,
    coupons: CouponRepository,
}

impl InventoryService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            tickets: TicketTypeRepository::new(db.clone()),
            reservations: ReservationRepository::new(db.clone()),
            attendees: AttendeeRepository::new(db.clone()),
            coupons: CouponRepository::new(db),
        }
    }

    /// Remaining units of a ticket type for the caller
    ///
    /// `via_reservation_token` lets a reservation holder draw from their own
    /// pool; everyone else has active carve-outs subtracted.
    pub async fn remaining(
        &self,
        ticket_type_id: i64,
        via_reservation_token: Option<&str>,
    ) -> RepoResult<i64> {
        let ticket = self
            .tickets
            .find_by_id(ticket_type_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("ticket_type {}", ticket_type_id)))?;

        self.remaining_for(&ticket, via_reservation_token).await
    }

    /// Same as [`remaining`], with the ticket type already loaded
    pub async fn remaining_for(
        &self,
        ticket: &TicketType,
        via_reservation_token: Option<&str>,
    ) -> RepoResult<i64> {
        let settled = self.attendees.count_holding(ticket.id).await?;

        let mut pools = Vec::new();
        for reservation in self.reservations.list_active_by_ticket(ticket.id).await? {
            let drawn = self
                .attendees
                .count_holding_via_reservation(ticket.id, &reservation.token)
                .await?;
            pools.push(ReservationUsage {
                token: reservation.token,
                quantity: reservation.quantity,
                drawn,
            });
        }

        Ok(remaining(
            ticket.capacity,
            settled,
            &pools,
            via_reservation_token,
        ))
    }

    /// Discount uses left on a coupon (clamped at 0)
    pub async fn remaining_uses(&self, coupon: &Coupon) -> RepoResult<i64> {
        let used = self.attendees.count_holding_with_coupon(coupon.id).await?;
        Ok(coupon::remaining_uses(coupon.capacity, used).max(0))
    }

    /// Discount uses left, by coupon id
    pub async fn remaining_uses_by_id(&self, coupon_id: i64) -> RepoResult<i64> {
        let coupon = self
            .coupons
            .find_by_id(coupon_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("coupon {}", coupon_id)))?;
        self.remaining_uses(&coupon).await
    }

    /// Unused portion of a reservation (release/cancel bookkeeping)
    pub async fn reservation_unused(
        &self,
        ticket_type_id: i64,
        token: &str,
        quantity: i64,
    ) -> RepoResult<i64> {
        let drawn = self
            .attendees
            .count_holding_via_reservation(ticket_type_id, token)
            .await?;
        Ok((quantity - drawn).max(0))
    }
}
