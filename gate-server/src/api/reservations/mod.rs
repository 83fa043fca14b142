//! Reservation API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Reservation router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        // release: unused portion returns to general sale
        .route("/{token}/release", post(handler::release))
        // cancel: additionally shrinks the ticket capacity by the unused portion
        .route("/{token}/cancel", post(handler::cancel))
}
