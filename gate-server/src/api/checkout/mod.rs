//! Checkout API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Checkout router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Selection-time verification: corrected order + flags, nothing held
        .route("/verify", post(handler::verify))
        // Full checkout: re-verify, hold, invoke the gateway
        .route("/", post(handler::checkout))
}
