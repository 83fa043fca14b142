//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::{ReservationRepository, TicketTypeRepository};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Reservation, ReservationCreate};

/// Create a reservation carve-out
///
/// The quantity must fit inside what general sale still has left, otherwise
/// the carve-out would promise units that do not exist.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<Json<Reservation>> {
    let tickets = TicketTypeRepository::new(state.db.clone());
    if tickets.find_by_id(payload.ticket_type_id).await?.is_none() {
        return Err(AppError::not_found(format!(
            "ticket_type {}",
            payload.ticket_type_id
        )));
    }

    let remaining = state
        .inventory()
        .remaining(payload.ticket_type_id, None)
        .await?;
    if payload.quantity > remaining {
        return Err(AppError::validation(format!(
            "quantity {} exceeds remaining general capacity {}",
            payload.quantity, remaining
        )));
    }

    let repo = ReservationRepository::new(state.db.clone());
    let reservation = repo.create(payload).await?;
    state.availability.bump(reservation.ticket_type_id);
    Ok(Json(reservation))
}

/// Outcome of releasing or cancelling a reservation
#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub reservation: Reservation,
    /// Units that were still set aside when the pool closed
    pub unused: i64,
}

/// Release: deactivate the pool, unused units return to general sale
pub async fn release(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<ReleaseResponse>> {
    let repo = ReservationRepository::new(state.db.clone());
    let reservation = repo
        .deactivate(&token)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ReservationInactive))?;

    let unused = state
        .inventory()
        .reservation_unused(reservation.ticket_type_id, &token, reservation.quantity)
        .await?;

    state.availability.bump(reservation.ticket_type_id);
    tracing::info!(
        token = %token,
        unused,
        "Reservation released, unused units back on general sale"
    );
    Ok(Json(ReleaseResponse { reservation, unused }))
}

/// Cancel: release and additionally shrink capacity by the unused portion
pub async fn cancel(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<ReleaseResponse>> {
    let repo = ReservationRepository::new(state.db.clone());
    let reservation = repo
        .deactivate(&token)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ReservationInactive))?;

    let unused = state
        .inventory()
        .reservation_unused(reservation.ticket_type_id, &token, reservation.quantity)
        .await?;

    if unused > 0 {
        let tickets = TicketTypeRepository::new(state.db.clone());
        tickets
            .shrink_capacity(reservation.ticket_type_id, unused)
            .await?;
    }

    state.availability.bump(reservation.ticket_type_id);
    tracing::info!(
        token = %token,
        unused,
        "Reservation cancelled, capacity shrunk by unused units"
    );
    Ok(Json(ReleaseResponse { reservation, unused }))
}
