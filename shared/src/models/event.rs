//! Event Model

use serde::{Deserialize, Serialize};

/// Event entity (活动)
///
/// Ticket types hang off an event; nothing is sellable while the event is
/// unpublished or after it has been archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    /// URL-safe identifier, unique
    pub slug: String,
    pub published: bool,
    pub archived: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Event {
    /// Whether tickets of this event may currently be sold
    pub fn is_live(&self) -> bool {
        self.published && !self.archived
    }
}

/// Create event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreate {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub published: bool,
}

/// Update event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub published: Option<bool>,
    pub archived: Option<bool>,
}
