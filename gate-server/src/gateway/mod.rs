//! Payment gateway adapters
//!
//! Each provider implements the small [`PaymentGateway`] capability trait;
//! the [`GatewayRegistry`] resolves providers once at startup and validates
//! their configuration there — a misconfigured provider is fatal before the
//! server accepts a single request, never at request time.
//!
//! The concrete HTTP conversation with a provider is out of scope; adapters
//! produce a redirect (or an immediate result) on the way out and parse the
//! provider's callback payload on the way in.

mod dummy;
mod hosted;

pub use dummy::DummyGateway;
pub use hosted::HostedGateway;

use crate::core::Config;
use shared::order::{GatewayResult, TransactionData};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Gateway adapter errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Provider misconfigured: {0}")]
    Misconfigured(String),

    #[error("Provider {provider} does not support currency {currency}")]
    UnsupportedCurrency { provider: String, currency: String },

    #[error("Malformed callback: {0}")]
    MalformedCallback(String),
}

/// What the checkout flow hands an adapter
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub payment_token: String,
    /// Order total in minor units
    pub total: i64,
    pub currency: String,
    /// Number of ticket units
    pub item_count: i64,
    /// Where the provider should send the buyer back to
    pub return_url: String,
}

/// Outcome of initiating a checkout with a provider
#[derive(Debug, Clone)]
pub enum SettlementIntent {
    /// Send the buyer to the provider's hosted page
    Redirect { url: String },
    /// The provider settled synchronously (dev/test, zero-amount orders)
    Immediate {
        result: GatewayResult,
        transaction: TransactionData,
    },
}

/// A parsed provider callback, ready for the settlement state machine
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub payment_token: String,
    pub result: GatewayResult,
    pub transaction: TransactionData,
}

/// Outcome of requesting a refund from a provider
#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub accepted: bool,
    pub transaction: TransactionData,
}

/// Capability interface every payment provider implements
pub trait PaymentGateway: Send + Sync {
    /// Stable provider id, used in callback routes and attendee records
    fn id(&self) -> &'static str;

    /// Currencies this provider can settle
    fn supported_currencies(&self) -> &[&'static str];

    /// Initiate a checkout for the order
    fn checkout(&self, order: &OrderSummary) -> Result<SettlementIntent, GatewayError>;

    /// Parse a raw callback payload into the settlement contract
    fn parse_callback(&self, raw: &serde_json::Value) -> Result<CallbackOutcome, GatewayError>;

    /// Request a refund for a settled payment token
    fn refund(&self, payment_token: &str) -> Result<RefundOutcome, GatewayError>;
}

/// Provider registry, built once at startup
///
/// Registration validates each adapter (non-empty id, currency support for
/// the configured currency) and fails hard on operator error.
pub struct GatewayRegistry {
    adapters: HashMap<&'static str, Arc<dyn PaymentGateway>>,
}

impl std::fmt::Debug for GatewayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRegistry")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl GatewayRegistry {
    /// Build the registry from configuration
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let mut registry = Self {
            adapters: HashMap::new(),
        };

        for name in &config.payment_providers {
            let adapter: Arc<dyn PaymentGateway> = match name.as_str() {
                "dummy" => Arc::new(DummyGateway::new()),
                "hosted" => Arc::new(HostedGateway::new(config.hosted_checkout_url.clone())),
                other => {
                    return Err(GatewayError::Misconfigured(format!(
                        "unknown payment provider '{}'",
                        other
                    )));
                }
            };
            registry.register(adapter, &config.currency)?;
        }

        if registry.adapters.is_empty() {
            return Err(GatewayError::Misconfigured(
                "no payment providers configured".into(),
            ));
        }

        Ok(registry)
    }

    /// Register one adapter after validating its configuration
    pub fn register(
        &mut self,
        adapter: Arc<dyn PaymentGateway>,
        currency: &str,
    ) -> Result<(), GatewayError> {
        let id = adapter.id();
        if id.is_empty() {
            return Err(GatewayError::Misconfigured(
                "provider id must not be empty".into(),
            ));
        }
        if adapter.supported_currencies().is_empty() {
            return Err(GatewayError::Misconfigured(format!(
                "provider {} declares no currencies",
                id
            )));
        }
        if !adapter
            .supported_currencies()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(currency))
        {
            return Err(GatewayError::UnsupportedCurrency {
                provider: id.to_string(),
                currency: currency.to_string(),
            });
        }

        tracing::info!(provider = id, "Payment provider registered");
        self.adapters.insert(id, adapter);
        Ok(())
    }

    /// Resolve a provider by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn PaymentGateway>> {
        self.adapters.get(id).cloned()
    }

    /// Registered provider ids
    pub fn providers(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.adapters.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(providers: &[&str], currency: &str) -> Config {
        let mut config = Config::with_overrides("/tmp/gate-test", 0);
        config.payment_providers = providers.iter().map(|s| s.to_string()).collect();
        config.currency = currency.to_string();
        config
    }

    #[test]
    fn test_registry_builds_known_providers() {
        let registry = GatewayRegistry::from_config(&test_config(&["dummy", "hosted"], "EUR"))
            .expect("registry");
        assert!(registry.get("dummy").is_some());
        assert!(registry.get("hosted").is_some());
        assert!(registry.get("stripe").is_none());
        assert_eq!(registry.providers(), vec!["dummy", "hosted"]);
    }

    #[test]
    fn test_unknown_provider_is_fatal() {
        let err = GatewayRegistry::from_config(&test_config(&["acme"], "EUR")).unwrap_err();
        assert!(matches!(err, GatewayError::Misconfigured(_)));
    }

    #[test]
    fn test_unsupported_currency_is_fatal() {
        let err = GatewayRegistry::from_config(&test_config(&["dummy"], "XXX")).unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedCurrency { .. }));
    }

    #[test]
    fn test_empty_provider_list_is_fatal() {
        let err = GatewayRegistry::from_config(&test_config(&[], "EUR")).unwrap_err();
        assert!(matches!(err, GatewayError::Misconfigured(_)));
    }
}
