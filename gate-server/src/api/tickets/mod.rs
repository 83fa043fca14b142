//! Ticket Type API Module

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

/// Ticket type router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tickets", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", patch(handler::update))
        // Live remaining units; ?reservation=<token> draws from that pool
        .route("/{id}/availability", get(handler::availability))
        .route("/{id}/stats", get(handler::stats))
}
