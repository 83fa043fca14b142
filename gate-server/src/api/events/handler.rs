//! Event API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::EventRepository;
use crate::utils::AppResult;
use shared::models::{Event, EventCreate, EventUpdate};

/// Create an event
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EventCreate>,
) -> AppResult<Json<Event>> {
    let repo = EventRepository::new(state.db.clone());
    let event = repo.create(payload).await?;
    Ok(Json(event))
}

/// Update an event (publish / archive toggles included)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<EventUpdate>,
) -> AppResult<Json<Event>> {
    let repo = EventRepository::new(state.db.clone());
    let event = repo.update(id, payload).await?;
    Ok(Json(event))
}
