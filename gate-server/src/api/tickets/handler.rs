//! Ticket Type API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::{AttendeeRepository, EventRepository, TicketTypeRepository};
use crate::settlement::TicketTally;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{TicketType, TicketTypeCreate, TicketTypeUpdate};

/// List all ticket types
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<TicketType>>> {
    let repo = TicketTypeRepository::new(state.db.clone());
    let tickets = repo.list_all().await?;
    Ok(Json(tickets))
}

/// Create a ticket type
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TicketTypeCreate>,
) -> AppResult<Json<TicketType>> {
    let events = EventRepository::new(state.db.clone());
    if events.find_by_id(payload.event_id).await?.is_none() {
        return Err(AppError::not_found(format!("event {}", payload.event_id)));
    }

    let repo = TicketTypeRepository::new(state.db.clone());
    let ticket = repo.create(payload).await?;
    Ok(Json(ticket))
}

/// Update a ticket type
///
/// Capacity floor: the capacity can never drop below the number of records
/// still holding it (draft/pending/publish).
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TicketTypeUpdate>,
) -> AppResult<Json<TicketType>> {
    let attendees = AttendeeRepository::new(state.db.clone());
    let held = attendees.count_holding(id).await?;

    let repo = TicketTypeRepository::new(state.db.clone());
    let ticket = repo.update(id, payload, held).await.map_err(|e| match e {
        crate::db::repository::RepoError::Validation(msg) => {
            AppError::with_message(ErrorCode::CapacityBelowSold, msg)
        }
        other => other.into(),
    })?;

    state.availability.bump(id);
    Ok(Json(ticket))
}

/// Query params for availability
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Reservation token to draw from that pool
    pub reservation: Option<String>,
}

/// Availability response
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub ticket_type_id: i64,
    pub remaining: i64,
    /// Version for cache invalidation on the display side
    pub version: u64,
}

/// Live remaining units for a ticket type
pub async fn availability(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let remaining = state
        .inventory()
        .remaining(id, query.reservation.as_deref())
        .await?;
    Ok(Json(AvailabilityResponse {
        ticket_type_id: id,
        remaining,
        version: state.availability.get(id),
    }))
}

/// Sold/revenue tally for a ticket type (display aggregate)
pub async fn stats(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TicketTally>> {
    Ok(Json(state.counters.get(id)))
}
