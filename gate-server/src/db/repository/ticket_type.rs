//! Ticket Type Repository

use super::{BaseRepository, RepoError, RepoResult};
use serde::{Deserialize, Serialize};
use shared::models::{TicketType, TicketTypeCreate, TicketTypeUpdate};
use shared::util::{now_millis, snowflake_id};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "ticket_type";

/// SurrealDB ticket_type 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TicketTypeRow {
    ticket_type_id: i64,
    event_id: i64,
    name: String,
    price: i64,
    capacity: i64,
    sale_starts_at: Option<i64>,
    sale_ends_at: Option<i64>,
    sort_order: i32,
    created_at: i64,
    updated_at: i64,
}

impl From<TicketTypeRow> for TicketType {
    fn from(r: TicketTypeRow) -> Self {
        TicketType {
            id: r.ticket_type_id,
            event_id: r.event_id,
            name: r.name,
            price: r.price,
            capacity: r.capacity,
            sale_starts_at: r.sale_starts_at,
            sale_ends_at: r.sale_ends_at,
            sort_order: r.sort_order,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct TicketTypeRepository {
    base: BaseRepository,
}

impl TicketTypeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: TicketTypeCreate) -> RepoResult<TicketType> {
        if data.capacity < 0 {
            return Err(RepoError::Validation("capacity must be >= 0".into()));
        }
        if data.price < 0 {
            return Err(RepoError::Validation("price must be >= 0".into()));
        }

        let now = now_millis();
        let row = TicketTypeRow {
            ticket_type_id: snowflake_id(),
            event_id: data.event_id,
            name: data.name,
            price: data.price,
            capacity: data.capacity,
            sale_starts_at: data.sale_starts_at,
            sale_ends_at: data.sale_ends_at,
            sort_order: data.sort_order,
            created_at: now,
            updated_at: now,
        };

        let _: Option<TicketTypeRow> = self
            .base
            .db()
            .create(TABLE)
            .content(row.clone())
            .await
            .map_err(RepoError::from)?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<TicketType>> {
        let rows: Vec<TicketTypeRow> = self
            .base
            .db()
            .query("SELECT * FROM ticket_type WHERE ticket_type_id = $id LIMIT 1")
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    /// Resolve a batch of ids in one query (order-walk in the verifier)
    pub async fn find_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<TicketType>> {
        let rows: Vec<TicketTypeRow> = self
            .base
            .db()
            .query("SELECT * FROM ticket_type WHERE ticket_type_id IN $ids")
            .bind(("ids", ids.to_vec()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_by_event(&self, event_id: i64) -> RepoResult<Vec<TicketType>> {
        let rows: Vec<TicketTypeRow> = self
            .base
            .db()
            .query(
                "SELECT * FROM ticket_type WHERE event_id = $event_id ORDER BY sort_order ASC, ticket_type_id ASC",
            )
            .bind(("event_id", event_id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_all(&self) -> RepoResult<Vec<TicketType>> {
        let rows: Vec<TicketTypeRow> = self
            .base
            .db()
            .query("SELECT * FROM ticket_type ORDER BY sort_order ASC, ticket_type_id ASC")
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Full update; capacity-floor enforcement happens in the handler, which
    /// passes the current held count as `min_capacity`
    pub async fn update(
        &self,
        id: i64,
        data: TicketTypeUpdate,
        min_capacity: i64,
    ) -> RepoResult<TicketType> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("ticket_type {}", id)))?;

        let capacity = data.capacity.unwrap_or(current.capacity);
        if capacity < min_capacity {
            return Err(RepoError::Validation(format!(
                "capacity {} below held count {}",
                capacity, min_capacity
            )));
        }

        let row = TicketTypeRow {
            ticket_type_id: current.id,
            event_id: current.event_id,
            name: data.name.unwrap_or(current.name),
            price: data.price.unwrap_or(current.price),
            capacity,
            sale_starts_at: data.sale_starts_at.or(current.sale_starts_at),
            sale_ends_at: data.sale_ends_at.or(current.sale_ends_at),
            sort_order: data.sort_order.unwrap_or(current.sort_order),
            created_at: current.created_at,
            updated_at: now_millis(),
        };

        let rows: Vec<TicketTypeRow> = self
            .base
            .db()
            .query("UPDATE ticket_type CONTENT $row WHERE ticket_type_id = $id RETURN AFTER")
            .bind(("row", row))
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;

        rows.into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| RepoError::NotFound(format!("ticket_type {}", id)))
    }

    /// Shrink capacity by `by` units, flooring at zero (reservation cancel)
    pub async fn shrink_capacity(&self, id: i64, by: i64) -> RepoResult<Option<TicketType>> {
        let rows: Vec<TicketTypeRow> = self
            .base
            .db()
            .query(
                r#"
                UPDATE ticket_type
                SET capacity = math::max([capacity - $by, 0]), updated_at = $now
                WHERE ticket_type_id = $id
                RETURN AFTER
                "#,
            )
            .bind(("by", by))
            .bind(("now", now_millis()))
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }
}
