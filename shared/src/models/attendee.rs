//! Attendee Record Model
//!
//! One record per purchased ticket unit. All records created in the same
//! checkout attempt share a payment token and move through the purchase
//! lifecycle in lockstep.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Purchase lifecycle status
///
/// ```text
/// draft ──▶ pending ──▶ publish ──▶ refund
///   │           │          ▲
///   │           └──▶ failed│
///   ├──▶ publish ──────────┘
///   ├──▶ cancel
///   ├──▶ failed
///   └──▶ timeout   (reaper only)
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendeeStatus {
    /// Provisional hold, payment not yet initiated/confirmed
    #[default]
    Draft,
    /// Gateway reported the payment as in flight
    Pending,
    /// Paid; the ticket is live
    Publish,
    /// Buyer backed out at the gateway
    Cancel,
    /// Gateway reported a definitive failure
    Failed,
    /// Money returned after a successful payment
    Refund,
    /// Abandoned draft reaped after the hold age limit
    Timeout,
}

/// Statuses that still count against ticket/coupon/reservation capacity
pub const CAPACITY_HOLDING: [AttendeeStatus; 3] = [
    AttendeeStatus::Draft,
    AttendeeStatus::Pending,
    AttendeeStatus::Publish,
];

impl AttendeeStatus {
    /// Whether this status still holds capacity
    pub fn is_capacity_holding(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending | Self::Publish)
    }

    /// Whether this status ends the purchase attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancel | Self::Failed | Self::Refund | Self::Timeout)
    }

    /// Storage representation (SCREAMING_SNAKE_CASE, matches serde)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Publish => "PUBLISH",
            Self::Cancel => "CANCEL",
            Self::Failed => "FAILED",
            Self::Refund => "REFUND",
            Self::Timeout => "TIMEOUT",
        }
    }
}

/// Attendee record entity (参会人记录)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub id: i64,
    pub ticket_type_id: i64,

    // Buyer identity, editable by the attendee pre-settlement or via revisit
    pub name: String,
    pub email: String,

    /// Per-unit price actually charged (minor units, after coupon)
    pub unit_price: i64,
    /// Correlation key shared by all records of one checkout attempt
    pub payment_token: String,
    /// Payment provider id chosen at checkout
    pub provider: String,
    pub coupon_id: Option<i64>,
    pub reservation_token: Option<String>,

    pub status: AttendeeStatus,

    /// Gateway transaction id, once any result has been delivered
    pub transaction_id: Option<String>,
    /// Provider-specific transaction detail blob
    pub transaction_details: Option<Value>,

    pub created_at: i64,
    pub updated_at: i64,
}

/// Payload for creating one attendee record (one ticket unit)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeCreate {
    pub ticket_type_id: i64,
    pub name: String,
    pub email: String,
    pub unit_price: i64,
    pub payment_token: String,
    pub provider: String,
    pub coupon_id: Option<i64>,
    pub reservation_token: Option<String>,
}

/// Identity fields the attendee may edit themselves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeIdentityUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}
