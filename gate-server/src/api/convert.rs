//! Error conversions at the API boundary

use crate::checkout::CheckoutError;
use crate::db::repository::RepoError;
use crate::gateway::GatewayError;
use shared::error::{AppError, ErrorCode};

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(what) => AppError::conflict(format!("{} already exists", what)),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Repo(e) => e.into(),
            CheckoutError::ProviderUnknown(id) => {
                AppError::with_message(ErrorCode::ProviderUnknown, format!("unknown provider '{}'", id))
            }
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MalformedCallback(msg) => {
                AppError::with_message(ErrorCode::CallbackMalformed, msg)
            }
            GatewayError::UnsupportedCurrency { provider, currency } => AppError::with_message(
                ErrorCode::CurrencyUnsupported,
                format!("provider {} does not support {}", provider, currency),
            ),
            GatewayError::Misconfigured(msg) => {
                AppError::with_message(ErrorCode::ConfigError, msg)
            }
        }
    }
}
