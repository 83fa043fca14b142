//! Checkout service
//!
//! Builds the verification context from live data, runs the verifier, and —
//! for a clean order — creates the provisional draft holds under one payment
//! token before handing the order to the gateway adapter. Verification runs
//! here a second time immediately before the holds are created, so a lost
//! capacity race surfaces as flags instead of an oversell.

use super::verifier::{
    CouponContext, ReservationContext, TicketSale, VerifyContext, verify,
};
use crate::core::Config;
use crate::db::repository::{
    AttendeeRepository, CouponRepository, EventRepository, RepoError, ReservationRepository,
    TicketTypeRepository,
};
use crate::gateway::{GatewayRegistry, OrderSummary, SettlementIntent};
use crate::inventory::InventoryService;
use crate::settlement::SettlementService;
use serde::{Deserialize, Serialize};
use shared::models::{AttendeeCreate, Event};
use shared::order::{CorrectedOrder, GatewayResult, ProposedOrder, SettlementOutcome, TransactionData};
use shared::util::new_token;
use std::collections::HashMap;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;
use validator::Validate;

/// Checkout errors
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Storage error: {0}")]
    Repo(#[from] RepoError),

    #[error("Unknown payment provider: {0}")]
    ProviderUnknown(String),
}

/// Buyer identity captured at checkout
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BuyerIdentity {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// What a checkout attempt produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum CheckoutOutcome {
    /// Verification corrected the order; re-present it, nothing was charged
    Reverify { order: CorrectedOrder },
    /// Holds created; send the buyer to the provider
    Redirect { payment_token: String, url: String },
    /// Holds created and the provider settled synchronously
    Settled {
        payment_token: String,
        outcome: SettlementOutcome,
    },
}

#[derive(Clone)]
pub struct CheckoutService {
    events: EventRepository,
    tickets: TicketTypeRepository,
    coupons: CouponRepository,
    reservations: ReservationRepository,
    attendees: AttendeeRepository,
    inventory: InventoryService,
    gateways: Arc<GatewayRegistry>,
    settlement: SettlementService,
    currency: String,
    public_base_url: String,
}

impl CheckoutService {
    pub fn new(
        db: Surreal<Db>,
        gateways: Arc<GatewayRegistry>,
        settlement: SettlementService,
        config: &Config,
    ) -> Self {
        Self {
            events: EventRepository::new(db.clone()),
            tickets: TicketTypeRepository::new(db.clone()),
            coupons: CouponRepository::new(db.clone()),
            reservations: ReservationRepository::new(db.clone()),
            attendees: AttendeeRepository::new(db.clone()),
            inventory: InventoryService::new(db),
            gateways,
            settlement,
            currency: config.currency.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Verify a proposed order against live inventory and pricing
    ///
    /// Called once when the buyer selects tickets and again inside
    /// [`checkout`](Self::checkout) right before the holds are created.
    pub async fn verify_order(&self, proposed: &ProposedOrder) -> Result<CorrectedOrder, RepoError> {
        let ctx = self.build_context(proposed).await?;
        Ok(verify(proposed, &ctx))
    }

    /// Run the full checkout: re-verify, hold, and invoke the gateway
    pub async fn checkout(
        &self,
        proposed: &ProposedOrder,
        buyer: &BuyerIdentity,
        provider_id: &str,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let adapter = self
            .gateways
            .get(provider_id)
            .ok_or_else(|| CheckoutError::ProviderUnknown(provider_id.to_string()))?;

        // Final server-side pass; any correction goes back to the buyer
        let corrected = self.verify_order(proposed).await?;
        if !corrected.is_clean() {
            tracing::info!(
                flags = ?corrected.flags,
                "Checkout verification corrected the order, re-presenting"
            );
            return Ok(CheckoutOutcome::Reverify { order: corrected });
        }

        // The reservation only covers units of its own ticket type
        let reservation_scope = match &corrected.reservation_token {
            Some(token) => self
                .reservations
                .find_by_token(token)
                .await?
                .map(|r| (r.token, r.ticket_type_id)),
            None => None,
        };

        let payment_token = new_token();
        for line in &corrected.lines {
            let reservation_token = reservation_scope
                .as_ref()
                .filter(|(_, tt)| *tt == line.ticket_type_id)
                .map(|(token, _)| token.clone());
            for _ in 0..line.quantity {
                self.attendees
                    .create(AttendeeCreate {
                        ticket_type_id: line.ticket_type_id,
                        name: buyer.name.clone(),
                        email: buyer.email.clone(),
                        unit_price: line.unit_price,
                        payment_token: payment_token.clone(),
                        provider: provider_id.to_string(),
                        coupon_id: if line.coupon_applied {
                            corrected.coupon_id
                        } else {
                            None
                        },
                        reservation_token: reservation_token.clone(),
                    })
                    .await?;
            }
        }

        tracing::info!(
            payment_token = %payment_token,
            units = corrected.unit_count(),
            total = corrected.total,
            provider = provider_id,
            "Draft holds created"
        );

        let summary = OrderSummary {
            payment_token: payment_token.clone(),
            total: corrected.total,
            currency: self.currency.clone(),
            item_count: corrected.unit_count(),
            return_url: format!(
                "{}/api/payments/callback/{}",
                self.public_base_url, provider_id
            ),
        };

        match adapter.checkout(&summary) {
            Ok(SettlementIntent::Redirect { url }) => Ok(CheckoutOutcome::Redirect {
                payment_token,
                url,
            }),
            Ok(SettlementIntent::Immediate {
                result,
                transaction,
            }) => {
                let outcome = self
                    .settlement
                    .apply_result(&payment_token, result, transaction)
                    .await?;
                Ok(CheckoutOutcome::Settled {
                    payment_token,
                    outcome,
                })
            }
            Err(e) => {
                // Charge-time gateway error is terminal for this token
                tracing::error!(
                    payment_token = %payment_token,
                    provider = provider_id,
                    error = %e,
                    "Gateway checkout failed, settling token as failed"
                );
                let outcome = self
                    .settlement
                    .apply_result(&payment_token, GatewayResult::Failed, TransactionData::default())
                    .await?;
                Ok(CheckoutOutcome::Settled {
                    payment_token,
                    outcome,
                })
            }
        }
    }

    /// Load everything the pure verifier needs
    async fn build_context(&self, proposed: &ProposedOrder) -> Result<VerifyContext, RepoError> {
        let now = shared::util::now_millis();

        let reservation = match &proposed.reservation_token {
            None => ReservationContext::NotRequested,
            Some(token) => match self.reservations.find_by_token(token).await? {
                Some(r) if r.is_active => ReservationContext::Valid {
                    token: r.token,
                    ticket_type_id: r.ticket_type_id,
                },
                _ => ReservationContext::Invalid,
            },
        };

        let coupon = match &proposed.coupon_code {
            None => CouponContext::NotRequested,
            Some(code) => match self.coupons.find_by_code(code).await? {
                Some(c) if c.is_valid_at(now) => {
                    let remaining_uses = self.inventory.remaining_uses(&c).await?;
                    CouponContext::Valid {
                        coupon: c,
                        remaining_uses,
                    }
                }
                _ => CouponContext::Invalid,
            },
        };

        let mut ids: Vec<i64> = proposed.lines.iter().map(|l| l.ticket_type_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut events: HashMap<i64, Option<Event>> = HashMap::new();
        let mut tickets = HashMap::new();
        for ticket in self.tickets.find_by_ids(&ids).await? {
            let event = match events.get(&ticket.event_id).cloned() {
                Some(cached) => cached,
                None => {
                    let loaded = self.events.find_by_id(ticket.event_id).await?;
                    events.insert(ticket.event_id, loaded.clone());
                    loaded
                }
            };
            let on_sale = event.map(|e| e.is_live()).unwrap_or(false)
                && ticket.sale_window_open(now);

            let via = match &reservation {
                ReservationContext::Valid {
                    token,
                    ticket_type_id,
                } if *ticket_type_id == ticket.id => Some(token.as_str()),
                _ => None,
            };
            let remaining = self.inventory.remaining_for(&ticket, via).await?;

            tickets.insert(
                ticket.id,
                TicketSale {
                    ticket,
                    on_sale,
                    remaining,
                },
            );
        }

        Ok(VerifyContext {
            tickets,
            coupon,
            reservation,
        })
    }
}
