//! Coupon Repository
//!
//! Codes are stored uppercase; the unique index on `code` makes duplicate
//! creation a [`RepoError::Duplicate`].

use super::{BaseRepository, RepoError, RepoResult};
use serde::{Deserialize, Serialize};
use shared::models::{Coupon, CouponCreate, CouponUpdate};
use shared::util::{now_millis, snowflake_id};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "coupon";

/// SurrealDB coupon 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CouponRow {
    coupon_id: i64,
    code: String,
    amount_off: Option<i64>,
    percent_off: Option<f64>,
    capacity: i64,
    valid_from: Option<i64>,
    valid_until: Option<i64>,
    ticket_type_ids: Vec<i64>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl From<CouponRow> for Coupon {
    fn from(r: CouponRow) -> Self {
        Coupon {
            id: r.coupon_id,
            code: r.code,
            amount_off: r.amount_off,
            percent_off: r.percent_off,
            capacity: r.capacity,
            valid_from: r.valid_from,
            valid_until: r.valid_until,
            ticket_type_ids: r.ticket_type_ids,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct CouponRepository {
    base: BaseRepository,
}

impl CouponRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: CouponCreate) -> RepoResult<Coupon> {
        if data.capacity < 0 {
            return Err(RepoError::Validation("capacity must be >= 0".into()));
        }
        if data.amount_off.is_none() && data.percent_off.is_none() {
            return Err(RepoError::Validation(
                "coupon needs amount_off or percent_off".into(),
            ));
        }

        let now = now_millis();
        let row = CouponRow {
            coupon_id: snowflake_id(),
            code: Coupon::normalize_code(&data.code),
            amount_off: data.amount_off,
            percent_off: data.percent_off,
            capacity: data.capacity,
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            ticket_type_ids: data.ticket_type_ids,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let _: Option<CouponRow> = self
            .base
            .db()
            .create(TABLE)
            .content(row.clone())
            .await
            .map_err(|e| RepoError::classify(e, "coupon code"))?;

        Ok(row.into())
    }

    /// Case-insensitive lookup by code
    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        let rows: Vec<CouponRow> = self
            .base
            .db()
            .query("SELECT * FROM coupon WHERE code = $code LIMIT 1")
            .bind(("code", Coupon::normalize_code(code)))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Coupon>> {
        let rows: Vec<CouponRow> = self
            .base
            .db()
            .query("SELECT * FROM coupon WHERE coupon_id = $id LIMIT 1")
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    pub async fn update(&self, id: i64, data: CouponUpdate) -> RepoResult<Coupon> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("coupon {}", id)))?;

        let row = CouponRow {
            coupon_id: current.id,
            code: current.code,
            amount_off: data.amount_off.or(current.amount_off),
            percent_off: data.percent_off.or(current.percent_off),
            capacity: data.capacity.unwrap_or(current.capacity),
            valid_from: data.valid_from.or(current.valid_from),
            valid_until: data.valid_until.or(current.valid_until),
            ticket_type_ids: data.ticket_type_ids.unwrap_or(current.ticket_type_ids),
            is_active: data.is_active.unwrap_or(current.is_active),
            created_at: current.created_at,
            updated_at: now_millis(),
        };

        let rows: Vec<CouponRow> = self
            .base
            .db()
            .query("UPDATE coupon CONTENT $row WHERE coupon_id = $id RETURN AFTER")
            .bind(("row", row))
            .bind(("id", id))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;

        rows.into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| RepoError::NotFound(format!("coupon {}", id)))
    }
}
