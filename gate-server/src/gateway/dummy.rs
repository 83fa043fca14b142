//! Dummy provider
//!
//! Settles every checkout synchronously with `completed`. Used in
//! development and tests; also the reference for the adapter contract.

use super::{
    CallbackOutcome, GatewayError, OrderSummary, PaymentGateway, RefundOutcome, SettlementIntent,
};
use shared::order::{GatewayResult, TransactionData};

pub struct DummyGateway;

impl DummyGateway {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentGateway for DummyGateway {
    fn id(&self) -> &'static str {
        "dummy"
    }

    fn supported_currencies(&self) -> &[&'static str] {
        &["EUR", "USD", "GBP"]
    }

    fn checkout(&self, order: &OrderSummary) -> Result<SettlementIntent, GatewayError> {
        Ok(SettlementIntent::Immediate {
            result: GatewayResult::Completed,
            transaction: TransactionData {
                transaction_id: Some(format!("dummy-{}", &order.payment_token[..8.min(order.payment_token.len())])),
                details: Some(serde_json::json!({
                    "provider": "dummy",
                    "amount": order.total,
                    "currency": order.currency,
                })),
            },
        })
    }

    fn parse_callback(&self, raw: &serde_json::Value) -> Result<CallbackOutcome, GatewayError> {
        let token = raw
            .get("token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GatewayError::MalformedCallback("missing token".into()))?;
        let result = raw
            .get("result")
            .and_then(|v| serde_json::from_value::<GatewayResult>(v.clone()).ok())
            .ok_or_else(|| GatewayError::MalformedCallback("missing or invalid result".into()))?;

        Ok(CallbackOutcome {
            payment_token: token.to_string(),
            result,
            transaction: TransactionData {
                transaction_id: raw
                    .get("transaction_id")
                    .and_then(|v| v.as_str())
                    .map(String::from),
                details: raw.get("details").cloned(),
            },
        })
    }

    fn refund(&self, payment_token: &str) -> Result<RefundOutcome, GatewayError> {
        Ok(RefundOutcome {
            accepted: true,
            transaction: TransactionData {
                transaction_id: Some(format!(
                    "dummy-refund-{}",
                    &payment_token[..8.min(payment_token.len())]
                )),
                details: None,
            },
        })
    }
}
