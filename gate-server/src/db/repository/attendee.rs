//! Attendee Repository
//!
//! One row per purchased ticket unit. Capacity everywhere in the system is
//! derived by counting these rows by status — there is no separately
//! maintained counter that could drift.

use super::{BaseRepository, CountRow, RepoError, RepoResult, count_from};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{
    AttendeeCreate, AttendeeIdentityUpdate, AttendeeRecord, AttendeeStatus, CAPACITY_HOLDING,
};
use shared::util::{now_millis, snowflake_id};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "attendee";

/// SurrealDB attendee 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AttendeeRow {
    attendee_id: i64,
    ticket_type_id: i64,
    name: String,
    email: String,
    unit_price: i64,
    payment_token: String,
    provider: String,
    coupon_id: Option<i64>,
    reservation_token: Option<String>,
    status: AttendeeStatus,
    transaction_id: Option<String>,
    transaction_details: Option<Value>,
    created_at: i64,
    updated_at: i64,
}

impl From<AttendeeRow> for AttendeeRecord {
    fn from(r: AttendeeRow) -> Self {
        AttendeeRecord {
            id: r.attendee_id,
            ticket_type_id: r.ticket_type_id,
            name: r.name,
            email: r.email,
            unit_price: r.unit_price,
            payment_token: r.payment_token,
            provider: r.provider,
            coupon_id: r.coupon_id,
            reservation_token: r.reservation_token,
            status: r.status,
            transaction_id: r.transaction_id,
            transaction_details: r.transaction_details,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Per-ticket-type aggregate over settled (publish) records
#[derive(Debug, Clone, Deserialize)]
pub struct PublishTally {
    pub ticket_type_id: i64,
    pub sold: i64,
    pub revenue: i64,
}

fn holding_statuses() -> Vec<String> {
    CAPACITY_HOLDING.iter().map(|s| s.as_str().to_string()).collect()
}

#[derive(Clone)]
pub struct AttendeeRepository {
    base: BaseRepository,
}

impl AttendeeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create one attendee record in `draft` status
    pub async fn create(&self, data: AttendeeCreate) -> RepoResult<AttendeeRecord> {
        let now = now_millis();
        let row = AttendeeRow {
            attendee_id: snowflake_id(),
            ticket_type_id: data.ticket_type_id,
            name: data.name,
            email: data.email,
            unit_price: data.unit_price,
            payment_token: data.payment_token,
            provider: data.provider,
            coupon_id: data.coupon_id,
            reservation_token: data.reservation_token,
            status: AttendeeStatus::Draft,
            transaction_id: None,
            transaction_details: None,
            created_at: now,
            updated_at: now,
        };

        let _: Option<AttendeeRow> = self
            .base
            .db()
            .create(TABLE)
            .content(row.clone())
            .await
            .map_err(RepoError::from)?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<AttendeeRecord>> {
        let rows: Vec<AttendeeRow> = self
            .base
            .db()
            .query("SELECT * FROM attendee WHERE attendee_id = $id LIMIT 1")
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    /// All records of one checkout attempt, in creation order
    pub async fn find_by_payment_token(&self, token: &str) -> RepoResult<Vec<AttendeeRecord>> {
        let rows: Vec<AttendeeRow> = self
            .base
            .db()
            .query(
                "SELECT * FROM attendee WHERE payment_token = $token ORDER BY attendee_id ASC",
            )
            .bind(("token", token.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // ========================================================================
    // Capacity counts (§ shared-resource policy: counting is the only truth)
    // ========================================================================

    /// Capacity-holding records for a ticket type
    pub async fn count_holding(&self, ticket_type_id: i64) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query(
                "SELECT count() FROM attendee WHERE ticket_type_id = $tt AND status IN $statuses GROUP ALL",
            )
            .bind(("tt", ticket_type_id))
            .bind(("statuses", holding_statuses()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(count_from(rows))
    }

    /// Capacity-holding records drawn from one reservation pool
    pub async fn count_holding_via_reservation(
        &self,
        ticket_type_id: i64,
        reservation_token: &str,
    ) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query(
                r#"
                SELECT count() FROM attendee
                WHERE ticket_type_id = $tt
                  AND reservation_token = $token
                  AND status IN $statuses
                GROUP ALL
                "#,
            )
            .bind(("tt", ticket_type_id))
            .bind(("token", reservation_token.to_string()))
            .bind(("statuses", holding_statuses()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(count_from(rows))
    }

    /// Capacity-holding records that consumed a coupon use
    pub async fn count_holding_with_coupon(&self, coupon_id: i64) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query(
                "SELECT count() FROM attendee WHERE coupon_id = $cid AND status IN $statuses GROUP ALL",
            )
            .bind(("cid", coupon_id))
            .bind(("statuses", holding_statuses()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(count_from(rows))
    }

    // ========================================================================
    // Settlement writes
    // ========================================================================

    /// Write status + transaction metadata onto one record
    pub async fn apply_settlement(
        &self,
        id: i64,
        to: AttendeeStatus,
        transaction_id: Option<String>,
        transaction_details: Option<Value>,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"
                UPDATE attendee
                SET status = $to,
                    transaction_id = $txn,
                    transaction_details = $details,
                    updated_at = $now
                WHERE attendee_id = $id
                "#,
            )
            .bind(("to", to.as_str()))
            .bind(("txn", transaction_id))
            .bind(("details", transaction_details))
            .bind(("now", now_millis()))
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?;
        Ok(())
    }

    /// Persist transaction metadata without touching status (duplicate delivery)
    pub async fn update_transaction(
        &self,
        id: i64,
        transaction_id: Option<String>,
        transaction_details: Option<Value>,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"
                UPDATE attendee
                SET transaction_id = $txn,
                    transaction_details = $details,
                    updated_at = $now
                WHERE attendee_id = $id
                "#,
            )
            .bind(("txn", transaction_id))
            .bind(("details", transaction_details))
            .bind(("now", now_millis()))
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?;
        Ok(())
    }

    /// Guarded status transition: only fires while the record is still in
    /// `from`. Returns whether the transition happened (reaper idempotency).
    pub async fn transition_if(
        &self,
        id: i64,
        from: AttendeeStatus,
        to: AttendeeStatus,
    ) -> RepoResult<bool> {
        let rows: Vec<AttendeeRow> = self
            .base
            .db()
            .query(
                r#"
                UPDATE attendee
                SET status = $to, updated_at = $now
                WHERE attendee_id = $id AND status = $from
                RETURN AFTER
                "#,
            )
            .bind(("to", to.as_str()))
            .bind(("now", now_millis()))
            .bind(("id", id))
            .bind(("from", from.as_str()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(!rows.is_empty())
    }

    /// Buyer-editable identity fields
    pub async fn update_identity(
        &self,
        id: i64,
        data: AttendeeIdentityUpdate,
    ) -> RepoResult<Option<AttendeeRecord>> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let rows: Vec<AttendeeRow> = self
            .base
            .db()
            .query(
                r#"
                UPDATE attendee
                SET name = $name, email = $email, updated_at = $now
                WHERE attendee_id = $id
                RETURN AFTER
                "#,
            )
            .bind(("name", data.name.unwrap_or(current.name)))
            .bind(("email", data.email.unwrap_or(current.email)))
            .bind(("now", now_millis()))
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    // ========================================================================
    // Reaper selection
    // ========================================================================

    /// Stale drafts: created before `cutoff`, positive timestamp (guards
    /// against rows mid-creation), oldest first, bounded batch.
    pub async fn find_stale_drafts(
        &self,
        cutoff: i64,
        limit: i64,
    ) -> RepoResult<Vec<AttendeeRecord>> {
        // LIMIT takes a literal; `limit` is an i64 so the interpolation is safe
        let query = format!(
            r#"
            SELECT * FROM attendee
            WHERE status = $draft
              AND created_at > 0
              AND created_at <= $cutoff
            ORDER BY created_at ASC
            LIMIT {}
            "#,
            limit.max(0)
        );
        let rows: Vec<AttendeeRow> = self
            .base
            .db()
            .query(query)
            .bind(("draft", AttendeeStatus::Draft.as_str()))
            .bind(("cutoff", cutoff))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // ========================================================================
    // Aggregates (boot-time counter rebuild)
    // ========================================================================

    /// Sold/revenue per ticket type over `publish` records
    pub async fn publish_tallies(&self) -> RepoResult<Vec<PublishTally>> {
        let rows: Vec<PublishTally> = self
            .base
            .db()
            .query(
                r#"
                SELECT ticket_type_id, count() AS sold, math::sum(unit_price) AS revenue
                FROM attendee
                WHERE status = $publish
                GROUP BY ticket_type_id
                "#,
            )
            .bind(("publish", AttendeeStatus::Publish.as_str()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }
}
