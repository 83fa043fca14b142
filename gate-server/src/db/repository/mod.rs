//! Repository Module
//!
//! Per-entity CRUD and filtered queries over SurrealDB. Entities are stored
//! with their own `<entity>_id` field (the record id stays opaque), so rows
//! round-trip cleanly through the shared models.

pub mod attendee;
pub mod coupon;
pub mod event;
pub mod reservation;
pub mod ticket_type;

// Re-exports
pub use attendee::AttendeeRepository;
pub use coupon::CouponRepository;
pub use event::EventRepository;
pub use reservation::ReservationRepository;
pub use ticket_type::TicketTypeRepository;

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl RepoError {
    /// Classify a raw database error, folding unique-index violations into
    /// [`RepoError::Duplicate`]
    pub fn classify(err: surrealdb::Error, what: &str) -> Self {
        let msg = err.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("unique")
            || lower.contains("already contains")
            || lower.contains("already exists")
            || lower.contains("duplicate")
        {
            RepoError::Duplicate(what.to_string())
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Row shape of `SELECT count() ... GROUP ALL`
#[derive(Debug, Deserialize)]
pub(crate) struct CountRow {
    pub count: i64,
}

/// Extract a count from a `GROUP ALL` result (empty result = 0)
pub(crate) fn count_from(rows: Vec<CountRow>) -> i64 {
    rows.into_iter().next().map(|r| r.count).unwrap_or(0)
}
