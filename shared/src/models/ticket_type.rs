//! Ticket Type Model

use serde::{Deserialize, Serialize};

/// Ticket type entity (票种)
///
/// Prices are integer minor units (cents); the currency itself lives in
/// server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    /// Unit price in minor units
    pub price: i64,
    /// Total sellable capacity, including reservation carve-outs
    pub capacity: i64,
    /// Sale window start (Unix millis); None = on sale immediately
    pub sale_starts_at: Option<i64>,
    /// Sale window end (Unix millis); None = no end
    pub sale_ends_at: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TicketType {
    /// Whether the sale window is open at `now`
    ///
    /// The window itself; event publication state is checked separately.
    pub fn sale_window_open(&self, now: i64) -> bool {
        if let Some(start) = self.sale_starts_at
            && now < start
        {
            return false;
        }
        if let Some(end) = self.sale_ends_at
            && now >= end
        {
            return false;
        }
        true
    }
}

/// Create ticket type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketTypeCreate {
    pub event_id: i64,
    pub name: String,
    pub price: i64,
    pub capacity: i64,
    pub sale_starts_at: Option<i64>,
    pub sale_ends_at: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Update ticket type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketTypeUpdate {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub capacity: Option<i64>,
    pub sale_starts_at: Option<i64>,
    pub sale_ends_at: Option<i64>,
    pub sort_order: Option<i32>,
}
