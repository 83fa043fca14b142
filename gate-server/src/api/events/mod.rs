//! Event API Module

mod handler;

use axum::{
    Router,
    routing::{patch, post},
};

use crate::core::ServerState;

/// Event router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/events", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", patch(handler::update))
}
