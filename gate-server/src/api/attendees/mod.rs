//! Attendee API Module
//!
//! Revisit-link access: the payment token doubles as the secret that lets a
//! buyer view and edit their own records.

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

/// Attendee router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/attendees", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}", patch(handler::update_identity))
}
