//! Event Repository

use super::{BaseRepository, RepoError, RepoResult};
use serde::{Deserialize, Serialize};
use shared::models::{Event, EventCreate, EventUpdate};
use shared::util::{now_millis, snowflake_id};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "event";

/// SurrealDB event 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventRow {
    event_id: i64,
    name: String,
    slug: String,
    published: bool,
    archived: bool,
    created_at: i64,
    updated_at: i64,
}

impl From<EventRow> for Event {
    fn from(r: EventRow) -> Self {
        Event {
            id: r.event_id,
            name: r.name,
            slug: r.slug,
            published: r.published,
            archived: r.archived,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct EventRepository {
    base: BaseRepository,
}

impl EventRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: EventCreate) -> RepoResult<Event> {
        let now = now_millis();
        let row = EventRow {
            event_id: snowflake_id(),
            name: data.name,
            slug: data.slug,
            published: data.published,
            archived: false,
            created_at: now,
            updated_at: now,
        };

        let _: Option<EventRow> = self
            .base
            .db()
            .create(TABLE)
            .content(row.clone())
            .await
            .map_err(|e| RepoError::classify(e, "event slug"))?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Event>> {
        let rows: Vec<EventRow> = self
            .base
            .db()
            .query("SELECT * FROM event WHERE event_id = $id LIMIT 1")
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Event>> {
        let rows: Vec<EventRow> = self
            .base
            .db()
            .query("SELECT * FROM event WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    pub async fn update(&self, id: i64, data: EventUpdate) -> RepoResult<Event> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("event {}", id)))?;

        let row = EventRow {
            event_id: current.id,
            name: data.name.unwrap_or(current.name),
            slug: current.slug,
            published: data.published.unwrap_or(current.published),
            archived: data.archived.unwrap_or(current.archived),
            created_at: current.created_at,
            updated_at: now_millis(),
        };

        let rows: Vec<EventRow> = self
            .base
            .db()
            .query("UPDATE event CONTENT $row WHERE event_id = $id RETURN AFTER")
            .bind(("row", row))
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;

        rows.into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| RepoError::NotFound(format!("event {}", id)))
    }
}
