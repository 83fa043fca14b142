//! HTTP API
//!
//! Per-resource routers merged into one `Router<ServerState>`. Handlers stay
//! thin: load, delegate to a service or repository, map errors through
//! [`convert`].

mod convert;

pub mod attendees;
pub mod checkout;
pub mod coupons;
pub mod events;
pub mod health;
pub mod payments;
pub mod reservations;
pub mod tickets;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build the full API router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(events::router())
        .merge(tickets::router())
        .merge(coupons::router())
        .merge(reservations::router())
        .merge(checkout::router())
        .merge(payments::router())
        .merge(attendees::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
