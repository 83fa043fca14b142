//! Checkout API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::checkout::{BuyerIdentity, CheckoutOutcome};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::order::{CorrectedOrder, ProposedOrder};

/// Verify a proposed order without creating holds
pub async fn verify(
    State(state): State<ServerState>,
    Json(proposed): Json<ProposedOrder>,
) -> AppResult<Json<CorrectedOrder>> {
    let corrected = state.checkout().verify_order(&proposed).await?;
    Ok(Json(corrected))
}

/// Full checkout request
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub order: ProposedOrder,
    pub buyer: BuyerIdentity,
    pub provider: String,
}

/// Run the checkout: verify, hold, and hand off to the payment provider
pub async fn checkout(
    State(state): State<ServerState>,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutOutcome>> {
    request
        .buyer
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state
        .checkout()
        .checkout(&request.order, &request.buyer, &request.provider)
        .await?;
    Ok(Json(outcome))
}
