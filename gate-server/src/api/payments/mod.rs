//! Payment API Module
//!
//! Callback delivery (webhook and buyer-redirect) plus operator refunds.
//! Both callback routes feed the same settlement path; duplicates and
//! replays are absorbed there.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Payment router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Asynchronous webhook delivery from the provider
        .route("/callback/{provider}", post(handler::callback_webhook))
        // Synchronous buyer redirect back from the provider
        .route("/callback/{provider}", get(handler::callback_return))
        // Settlement status view (return page polls this)
        .route("/{token}", get(handler::status))
        // Operator refund
        .route("/{token}/refund", post(handler::refund))
}
