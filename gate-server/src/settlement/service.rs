//! Settlement service
//!
//! Applies gateway results to the attendee group sharing a payment token.
//! Safe to call from the buyer's redirect and from unattended webhooks
//! alike; duplicates and replays are absorbed by the transition table.

use super::notify::NotificationDispatcher;
use super::stats::SalesCounters;
use super::transition::{Decision, decide};
use crate::core::state::AvailabilityVersions;
use crate::db::repository::{AttendeeRepository, RepoResult};
use shared::models::AttendeeRecord;
use shared::order::{GatewayResult, SettlementOutcome, TransactionData};
use std::collections::HashSet;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct SettlementService {
    attendees: AttendeeRepository,
    notifier: Arc<dyn NotificationDispatcher>,
    counters: Arc<SalesCounters>,
    availability: Arc<AvailabilityVersions>,
}

impl SettlementService {
    pub fn new(
        db: Surreal<Db>,
        notifier: Arc<dyn NotificationDispatcher>,
        counters: Arc<SalesCounters>,
        availability: Arc<AvailabilityVersions>,
    ) -> Self {
        Self {
            attendees: AttendeeRepository::new(db),
            notifier,
            counters,
            availability,
        }
    }

    /// Apply a gateway result to every record under `payment_token`
    ///
    /// The group moves in lockstep. Side effects (notification, counters,
    /// availability invalidation) fire only on a real transition — a
    /// duplicate delivery persists transaction metadata and nothing else,
    /// and an undefined transition is rejected loudly with state unchanged.
    pub async fn apply_result(
        &self,
        payment_token: &str,
        result: GatewayResult,
        transaction: TransactionData,
    ) -> RepoResult<SettlementOutcome> {
        let records = self.attendees.find_by_payment_token(payment_token).await?;
        if records.is_empty() {
            // Expected from third parties: replayed or stale callbacks
            tracing::warn!(
                payment_token = %payment_token,
                result = ?result,
                "Callback for unknown payment token dropped"
            );
            return Ok(SettlementOutcome::UnknownToken);
        }

        let from = records[0].status;
        if records.iter().any(|r| r.status != from) {
            // Lockstep was broken by a crash mid-update; the first record
            // decides and this delivery restores agreement.
            tracing::error!(
                payment_token = %payment_token,
                "Attendee group has mixed statuses, realigning to first record"
            );
        }

        let to = result.target_status();

        match decide(from, to) {
            Decision::Rejected => {
                tracing::error!(
                    payment_token = %payment_token,
                    from = from.as_str(),
                    to = to.as_str(),
                    result = ?result,
                    "Undefined lifecycle transition rejected"
                );
                Ok(SettlementOutcome::Rejected { from, to })
            }

            Decision::Duplicate => {
                // Providers resend with richer metadata; keep the newest
                for record in &records {
                    let (txn_id, details) = merge_transaction(record, &transaction);
                    self.attendees
                        .update_transaction(record.id, txn_id, details)
                        .await?;
                }
                tracing::debug!(
                    payment_token = %payment_token,
                    status = from.as_str(),
                    "Duplicate gateway delivery, no side effects"
                );
                Ok(SettlementOutcome::Duplicate { status: from })
            }

            Decision::Transition => {
                let mut failed = 0usize;
                for record in &records {
                    let (txn_id, details) = merge_transaction(record, &transaction);
                    if let Err(e) = self
                        .attendees
                        .apply_settlement(record.id, to, txn_id, details)
                        .await
                    {
                        // Keep going: leaving part of the group behind is
                        // worse than retrying one record on the next delivery
                        failed += 1;
                        tracing::error!(
                            payment_token = %payment_token,
                            attendee_id = record.id,
                            error = %e,
                            "Failed to persist settlement on record"
                        );
                    }
                }
                if failed > 0 {
                    tracing::error!(
                        payment_token = %payment_token,
                        failed,
                        total = records.len(),
                        "Settlement group update incomplete"
                    );
                }

                self.notifier.notify(payment_token, from, to);
                self.counters.apply_transition(&records, from, to);
                self.bump_availability(&records);

                tracing::info!(
                    payment_token = %payment_token,
                    from = from.as_str(),
                    to = to.as_str(),
                    records = records.len(),
                    "Settlement applied"
                );

                Ok(SettlementOutcome::Transitioned {
                    from,
                    to,
                    records: records.len(),
                })
            }
        }
    }

    /// Invalidate cached availability for every ticket type in the group
    fn bump_availability(&self, records: &[AttendeeRecord]) {
        let tickets: HashSet<i64> = records.iter().map(|r| r.ticket_type_id).collect();
        for id in tickets {
            self.availability.bump(id);
        }
    }
}

/// Carry stored transaction metadata forward when a delivery omits it
///
/// Some providers send the transaction id only on the first callback.
fn merge_transaction(
    record: &AttendeeRecord,
    delivered: &TransactionData,
) -> (Option<String>, Option<serde_json::Value>) {
    let txn_id = delivered
        .transaction_id
        .clone()
        .or_else(|| record.transaction_id.clone());
    let details = delivered
        .details
        .clone()
        .or_else(|| record.transaction_details.clone());
    (txn_id, details)
}
