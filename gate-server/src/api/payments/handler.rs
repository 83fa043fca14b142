//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::ServerState;
use crate::db::repository::AttendeeRepository;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::AttendeeStatus;
use shared::order::{GatewayResult, SettlementOutcome};

/// Apply one parsed callback through the settlement state machine
async fn deliver(
    state: &ServerState,
    provider: &str,
    raw: &Value,
) -> AppResult<SettlementOutcome> {
    let adapter = state
        .gateways
        .get(provider)
        .ok_or_else(|| AppError::new(ErrorCode::ProviderUnknown))?;

    let callback = adapter.parse_callback(raw).map_err(|e| {
        // Malformed third-party input is expected; log and reject this
        // delivery without touching any state
        tracing::warn!(provider, error = %e, "Malformed gateway callback");
        AppError::from(e)
    })?;

    let outcome = state
        .settlement()
        .apply_result(&callback.payment_token, callback.result, callback.transaction)
        .await?;
    Ok(outcome)
}

/// Webhook delivery (unattended, at-least-once)
///
/// An unknown token is acknowledged with 200: the provider already did its
/// job, redelivery would change nothing.
pub async fn callback_webhook(
    State(state): State<ServerState>,
    Path(provider): Path<String>,
    Json(raw): Json<Value>,
) -> AppResult<Json<ApiResponse<SettlementOutcome>>> {
    let outcome = deliver(&state, &provider, &raw).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// Buyer redirect back from the provider
///
/// Providers encode the result in query parameters on the return leg; the
/// payload shape matches the webhook after conversion.
pub async fn callback_return(
    State(state): State<ServerState>,
    Path(provider): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ApiResponse<SettlementOutcome>>> {
    let raw = serde_json::to_value(&params)
        .map_err(|e| AppError::with_message(ErrorCode::CallbackMalformed, e.to_string()))?;
    let outcome = deliver(&state, &provider, &raw).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// Settlement status view for a payment token
#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub payment_token: String,
    pub status: AttendeeStatus,
    pub records: usize,
    pub total: i64,
    pub transaction_id: Option<String>,
}

/// Current group status (return page / revisit link)
pub async fn status(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<PaymentStatusResponse>> {
    let attendees = AttendeeRepository::new(state.db.clone());
    let records = attendees.find_by_payment_token(&token).await?;
    let Some(first) = records.first() else {
        return Err(AppError::new(ErrorCode::PaymentTokenUnknown));
    };

    Ok(Json(PaymentStatusResponse {
        payment_token: token,
        status: first.status,
        records: records.len(),
        total: records.iter().map(|r| r.unit_price).sum(),
        transaction_id: first.transaction_id.clone(),
    }))
}

/// Operator refund for a settled token
pub async fn refund(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<SettlementOutcome>>> {
    let attendees = AttendeeRepository::new(state.db.clone());
    let records = attendees.find_by_payment_token(&token).await?;
    let Some(first) = records.first() else {
        return Err(AppError::new(ErrorCode::PaymentTokenUnknown));
    };

    if first.status != AttendeeStatus::Publish {
        return Err(AppError::with_message(
            ErrorCode::RefundNotAllowed,
            format!("group is {}, only publish can refund", first.status.as_str()),
        ));
    }

    let adapter = state
        .gateways
        .get(&first.provider)
        .ok_or_else(|| AppError::new(ErrorCode::ProviderUnknown))?;

    let refund = adapter.refund(&token)?;
    if !refund.accepted {
        return Err(AppError::with_message(
            ErrorCode::RefundNotAllowed,
            "provider declined the refund",
        ));
    }

    let outcome = state
        .settlement()
        .apply_result(&token, GatewayResult::Refunded, refund.transaction)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}
