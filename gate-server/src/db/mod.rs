//! Database Module
//!
//! Embedded SurrealDB storage. The server opens a RocksDB-backed instance
//! under the work dir; tests open an in-memory engine and call
//! [`define_schema`] themselves.

pub mod repository;

use repository::{RepoError, RepoResult};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "gate";
const DATABASE: &str = "tickets";

/// Open the embedded database under `work_dir` and apply schema definitions
pub async fn open(work_dir: &str) -> RepoResult<Surreal<Db>> {
    let path = format!("{}/data", work_dir);
    let db = Surreal::new::<RocksDb>(path.as_str())
        .await
        .map_err(RepoError::from)?;
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(RepoError::from)?;
    define_schema(&db).await?;
    tracing::info!(path = %path, "Database opened");
    Ok(db)
}

/// Select namespace/database on an already-created connection (tests)
pub async fn select_ns(db: &Surreal<Db>) -> RepoResult<()> {
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(RepoError::from)?;
    Ok(())
}

/// Index definitions
///
/// Unique indexes double as idempotency guards (duplicate coupon codes,
/// reservation tokens); the attendee indexes back the hot count queries.
pub async fn define_schema(db: &Surreal<Db>) -> RepoResult<()> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS uniq_event_slug ON TABLE event FIELDS slug UNIQUE;
        DEFINE INDEX IF NOT EXISTS uniq_coupon_code ON TABLE coupon FIELDS code UNIQUE;
        DEFINE INDEX IF NOT EXISTS uniq_reservation_token ON TABLE reservation FIELDS token UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_attendee_payment_token ON TABLE attendee FIELDS payment_token;
        DEFINE INDEX IF NOT EXISTS idx_attendee_ticket_status ON TABLE attendee FIELDS ticket_type_id, status;
        DEFINE INDEX IF NOT EXISTS idx_attendee_status_created ON TABLE attendee FIELDS status, created_at;
        "#,
    )
    .await
    .map_err(RepoError::from)?;
    Ok(())
}
