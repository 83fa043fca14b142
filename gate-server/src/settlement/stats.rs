//! Sales counters
//!
//! Display aggregates only. Capacity decisions always count attendee rows;
//! these tallies exist for dashboards and are rebuilt from the database at
//! boot, then adjusted on real settlement transitions.

use crate::db::repository::{AttendeeRepository, RepoResult};
use dashmap::DashMap;
use serde::Serialize;
use shared::models::{AttendeeRecord, AttendeeStatus};

/// Sold units and revenue for one ticket type (minor units)
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TicketTally {
    pub sold: i64,
    pub revenue: i64,
}

/// Lock-free per-ticket-type tallies
#[derive(Debug, Default)]
pub struct SalesCounters {
    tallies: DashMap<i64, TicketTally>,
}

impl SalesCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from settled records (warmup task)
    pub async fn rebuild(&self, attendees: &AttendeeRepository) -> RepoResult<()> {
        let tallies = attendees.publish_tallies().await?;
        self.tallies.clear();
        for t in &tallies {
            self.tallies.insert(
                t.ticket_type_id,
                TicketTally {
                    sold: t.sold,
                    revenue: t.revenue,
                },
            );
        }
        tracing::info!(ticket_types = tallies.len(), "Sales counters rebuilt");
        Ok(())
    }

    /// Adjust tallies for a real group transition
    ///
    /// Entering `publish` adds each record's price; leaving it (refund)
    /// subtracts. All other transitions move only unsettled money and leave
    /// the tallies alone.
    pub fn apply_transition(
        &self,
        records: &[AttendeeRecord],
        from: AttendeeStatus,
        to: AttendeeStatus,
    ) {
        let delta: i64 = match (
            from == AttendeeStatus::Publish,
            to == AttendeeStatus::Publish,
        ) {
            (false, true) => 1,
            (true, false) => -1,
            _ => return,
        };

        for record in records {
            let mut tally = self.tallies.entry(record.ticket_type_id).or_default();
            tally.sold += delta;
            tally.revenue += delta * record.unit_price;
        }
    }

    /// Current tally for one ticket type
    pub fn get(&self, ticket_type_id: i64) -> TicketTally {
        self.tallies
            .get(&ticket_type_id)
            .map(|t| *t)
            .unwrap_or_default()
    }

    /// Snapshot of all tallies (reporting)
    pub fn snapshot(&self) -> Vec<(i64, TicketTally)> {
        let mut all: Vec<(i64, TicketTally)> =
            self.tallies.iter().map(|e| (*e.key(), *e.value())).collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(ticket_type_id: i64, unit_price: i64) -> AttendeeRecord {
        AttendeeRecord {
            id: 1,
            ticket_type_id,
            name: "a".into(),
            email: "a@example.com".into(),
            unit_price,
            payment_token: "tok".into(),
            provider: "dummy".into(),
            coupon_id: None,
            reservation_token: None,
            status: AttendeeStatus::Draft,
            transaction_id: None,
            transaction_details: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_publish_increments() {
        let counters = SalesCounters::new();
        let records = vec![make_record(1, 1000), make_record(1, 500)];
        counters.apply_transition(&records, AttendeeStatus::Draft, AttendeeStatus::Publish);

        let tally = counters.get(1);
        assert_eq!(tally.sold, 2);
        assert_eq!(tally.revenue, 1500);
    }

    #[test]
    fn test_refund_decrements() {
        let counters = SalesCounters::new();
        let records = vec![make_record(1, 1000)];
        counters.apply_transition(&records, AttendeeStatus::Draft, AttendeeStatus::Publish);
        counters.apply_transition(&records, AttendeeStatus::Publish, AttendeeStatus::Refund);

        let tally = counters.get(1);
        assert_eq!(tally.sold, 0);
        assert_eq!(tally.revenue, 0);
    }

    #[test]
    fn test_non_publish_transitions_ignored() {
        let counters = SalesCounters::new();
        let records = vec![make_record(1, 1000)];
        counters.apply_transition(&records, AttendeeStatus::Draft, AttendeeStatus::Pending);
        counters.apply_transition(&records, AttendeeStatus::Pending, AttendeeStatus::Failed);

        assert_eq!(counters.get(1).sold, 0);
    }

    #[test]
    fn test_pending_to_publish_counts() {
        let counters = SalesCounters::new();
        let records = vec![make_record(2, 700)];
        counters.apply_transition(&records, AttendeeStatus::Pending, AttendeeStatus::Publish);

        assert_eq!(counters.get(2).sold, 1);
        assert_eq!(counters.get(2).revenue, 700);
    }
}
