//! Reservation Repository

use super::{BaseRepository, RepoError, RepoResult};
use serde::{Deserialize, Serialize};
use shared::models::{Reservation, ReservationCreate};
use shared::util::{new_token, now_millis, snowflake_id};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "reservation";

/// SurrealDB reservation 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReservationRow {
    reservation_id: i64,
    token: String,
    ticket_type_id: i64,
    quantity: i64,
    label: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl From<ReservationRow> for Reservation {
    fn from(r: ReservationRow) -> Self {
        Reservation {
            id: r.reservation_id,
            token: r.token,
            ticket_type_id: r.ticket_type_id,
            quantity: r.quantity,
            label: r.label,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a reservation, minting its secret token
    pub async fn create(&self, data: ReservationCreate) -> RepoResult<Reservation> {
        if data.quantity < 1 {
            return Err(RepoError::Validation("quantity must be >= 1".into()));
        }

        let now = now_millis();
        let row = ReservationRow {
            reservation_id: snowflake_id(),
            token: new_token(),
            ticket_type_id: data.ticket_type_id,
            quantity: data.quantity,
            label: data.label,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let _: Option<ReservationRow> = self
            .base
            .db()
            .create(TABLE)
            .content(row.clone())
            .await
            .map_err(|e| RepoError::classify(e, "reservation token"))?;

        Ok(row.into())
    }

    pub async fn find_by_token(&self, token: &str) -> RepoResult<Option<Reservation>> {
        let rows: Vec<ReservationRow> = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE token = $token LIMIT 1")
            .bind(("token", token.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    /// Active reservations carving capacity out of a ticket type
    pub async fn list_active_by_ticket(&self, ticket_type_id: i64) -> RepoResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation WHERE ticket_type_id = $tt AND is_active = true ORDER BY reservation_id ASC",
            )
            .bind(("tt", ticket_type_id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Deactivate an active reservation
    ///
    /// Conditional on `is_active` so repeated release/cancel calls are no-ops;
    /// returns the reservation as it was deactivated, or None if it was
    /// already inactive (or unknown).
    pub async fn deactivate(&self, token: &str) -> RepoResult<Option<Reservation>> {
        let rows: Vec<ReservationRow> = self
            .base
            .db()
            .query(
                r#"
                UPDATE reservation
                SET is_active = false, updated_at = $now
                WHERE token = $token AND is_active = true
                RETURN AFTER
                "#,
            )
            .bind(("now", now_millis()))
            .bind(("token", token.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }
}
