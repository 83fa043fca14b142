//! Attendee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::AttendeeRepository;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{AttendeeIdentityUpdate, AttendeeRecord};

/// Revisit-link credential
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// Load a record and check the presented payment token
///
/// A wrong token answers "not found" — the token is the only credential,
/// so its absence and a missing record must be indistinguishable.
async fn load_authorized(
    state: &ServerState,
    id: i64,
    token: &str,
) -> AppResult<AttendeeRecord> {
    let attendees = AttendeeRepository::new(state.db.clone());
    let record = attendees
        .find_by_id(id)
        .await?
        .filter(|r| r.payment_token == token)
        .ok_or_else(|| AppError::new(ErrorCode::AttendeeNotFound))?;
    Ok(record)
}

/// View one attendee record via revisit link
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<AttendeeRecord>> {
    let record = load_authorized(&state, id, &query.token).await?;
    Ok(Json(record))
}

/// Identity update request
#[derive(Debug, Deserialize, Validate)]
pub struct IdentityUpdateRequest {
    pub payment_token: String,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Edit the buyer identity fields on one record
///
/// Allowed pre-settlement (draft/pending) and on settled tickets via the
/// revisit link; terminal attempts are frozen.
pub async fn update_identity(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(request): Json<IdentityUpdateRequest>,
) -> AppResult<Json<AttendeeRecord>> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let record = load_authorized(&state, id, &request.payment_token).await?;
    if record.status.is_terminal() {
        return Err(AppError::new(ErrorCode::AttendeeNotEditable));
    }

    let attendees = AttendeeRepository::new(state.db.clone());
    let updated = attendees
        .update_identity(
            id,
            AttendeeIdentityUpdate {
                name: request.name,
                email: request.email,
            },
        )
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AttendeeNotFound))?;
    Ok(Json(updated))
}
