//! Gateway result contract and settlement outcomes

use crate::models::AttendeeStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Definitive result reported by a payment gateway
///
/// Deliveries are at-least-once and may arrive out of order relative to the
/// buyer's own redirect; the settlement state machine absorbs duplicates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GatewayResult {
    Cancelled,
    Completed,
    Pending,
    Failed,
    Refunded,
}

impl GatewayResult {
    /// The lifecycle status this result drives the record group toward
    pub fn target_status(&self) -> AttendeeStatus {
        match self {
            Self::Cancelled => AttendeeStatus::Cancel,
            Self::Completed => AttendeeStatus::Publish,
            Self::Pending => AttendeeStatus::Pending,
            Self::Failed => AttendeeStatus::Failed,
            Self::Refunded => AttendeeStatus::Refund,
        }
    }
}

/// Transaction metadata delivered alongside a gateway result
///
/// Some providers send the transaction id only on the first callback;
/// settlement carries previously stored values forward when a later
/// delivery omits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionData {
    pub transaction_id: Option<String>,
    pub details: Option<Value>,
}

/// What applying a gateway result actually did
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SettlementOutcome {
    /// The group moved to a new status; side effects fired
    Transitioned {
        from: AttendeeStatus,
        to: AttendeeStatus,
        records: usize,
    },
    /// Delivery repeated the current status; metadata persisted, no side effects
    Duplicate { status: AttendeeStatus },
    /// The transition is undefined in the lifecycle table; state unchanged
    Rejected {
        from: AttendeeStatus,
        to: AttendeeStatus,
    },
    /// The payment token matched no records; delivery dropped
    UnknownToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_status_mapping() {
        assert_eq!(GatewayResult::Cancelled.target_status(), AttendeeStatus::Cancel);
        assert_eq!(GatewayResult::Completed.target_status(), AttendeeStatus::Publish);
        assert_eq!(GatewayResult::Pending.target_status(), AttendeeStatus::Pending);
        assert_eq!(GatewayResult::Failed.target_status(), AttendeeStatus::Failed);
        assert_eq!(GatewayResult::Refunded.target_status(), AttendeeStatus::Refund);
    }

    #[test]
    fn test_result_wire_names() {
        assert_eq!(
            serde_json::to_string(&GatewayResult::Completed).unwrap(),
            "\"completed\""
        );
        let parsed: GatewayResult = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, GatewayResult::Cancelled);
    }
}
