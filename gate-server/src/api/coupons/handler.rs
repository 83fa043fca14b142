//! Coupon API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::CouponRepository;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Coupon, CouponCreate};
use shared::util::now_millis;

/// Create a coupon
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    let repo = CouponRepository::new(state.db.clone());
    let coupon = repo.create(payload).await.map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::new(ErrorCode::CouponCodeExists)
        }
        other => other.into(),
    })?;
    Ok(Json(coupon))
}

/// Remaining-uses response
#[derive(Debug, Serialize)]
pub struct RemainingResponse {
    pub code: String,
    pub remaining_uses: i64,
    pub valid: bool,
}

/// Remaining discount uses for a coupon code
pub async fn remaining(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> AppResult<Json<RemainingResponse>> {
    let repo = CouponRepository::new(state.db.clone());
    let coupon = repo
        .find_by_code(&code)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CouponNotFound))?;

    let remaining_uses = state.inventory().remaining_uses(&coupon).await?;
    Ok(Json(RemainingResponse {
        code: coupon.code.clone(),
        remaining_uses,
        valid: coupon.is_valid_at(now_millis()),
    }))
}
