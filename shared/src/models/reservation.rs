//! Reservation Model

use serde::{Deserialize, Serialize};

/// Reservation entity (预留池)
///
/// Carves `quantity` units out of a ticket type's capacity; the carve-out is
/// invisible to general buyers and only usable by presenting the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    /// Opaque secret, presented by the holder at checkout
    pub token: String,
    pub ticket_type_id: i64,
    pub quantity: i64,
    /// Human label ("Press", "Sponsor block", ...)
    pub label: String,
    /// False once released or cancelled
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub ticket_type_id: i64,
    pub quantity: i64,
    pub label: String,
}
