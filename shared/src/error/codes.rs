//! Unified error codes for the Gate ticket server
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Ticket / order errors
//! - 5xxx: Payment errors
//! - 6xxx: Coupon / reservation errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Ticket / Order ====================
    /// Ticket type not found
    TicketNotFound = 4001,
    /// Ticket type is not currently on sale
    TicketNotOnSale = 4002,
    /// Order contains no sellable items
    OrderEmpty = 4003,
    /// Failed to create provisional attendee holds
    HoldCreationFailed = 4004,
    /// Attendee record not found
    AttendeeNotFound = 4005,
    /// Attendee record can no longer be edited
    AttendeeNotEditable = 4006,
    /// Capacity cannot be lowered below the held/sold count
    CapacityBelowSold = 4007,

    // ==================== 5xxx: Payment ====================
    /// Payment provider is not registered
    ProviderUnknown = 5001,
    /// Gateway callback payload could not be parsed
    CallbackMalformed = 5002,
    /// Payment token matches no attendee records
    PaymentTokenUnknown = 5003,
    /// Requested lifecycle transition is not defined
    TransitionRejected = 5004,
    /// Refund is not allowed in the current lifecycle state
    RefundNotAllowed = 5005,
    /// Provider does not support the configured currency
    CurrencyUnsupported = 5006,

    // ==================== 6xxx: Coupon / Reservation ====================
    /// Coupon code not found
    CouponNotFound = 6001,
    /// Coupon code already exists
    CouponCodeExists = 6002,
    /// Reservation token not found
    ReservationNotFound = 6003,
    /// Reservation has been released or cancelled
    ReservationInactive = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            Self::TicketNotFound => "Ticket type not found",
            Self::TicketNotOnSale => "Ticket type is not on sale",
            Self::OrderEmpty => "No tickets selected",
            Self::HoldCreationFailed => "Failed to create ticket holds",
            Self::AttendeeNotFound => "Attendee not found",
            Self::AttendeeNotEditable => "Attendee record can no longer be edited",
            Self::CapacityBelowSold => "Capacity cannot be lowered below the held count",

            Self::ProviderUnknown => "Unknown payment provider",
            Self::CallbackMalformed => "Malformed gateway callback",
            Self::PaymentTokenUnknown => "Unknown payment token",
            Self::TransitionRejected => "Lifecycle transition rejected",
            Self::RefundNotAllowed => "Refund not allowed in current state",
            Self::CurrencyUnsupported => "Currency not supported by provider",

            Self::CouponNotFound => "Coupon not found",
            Self::CouponCodeExists => "Coupon code already exists",
            Self::ReservationNotFound => "Reservation not found",
            Self::ReservationInactive => "Reservation is no longer active",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,

            4001 => Self::TicketNotFound,
            4002 => Self::TicketNotOnSale,
            4003 => Self::OrderEmpty,
            4004 => Self::HoldCreationFailed,
            4005 => Self::AttendeeNotFound,
            4006 => Self::AttendeeNotEditable,
            4007 => Self::CapacityBelowSold,

            5001 => Self::ProviderUnknown,
            5002 => Self::CallbackMalformed,
            5003 => Self::PaymentTokenUnknown,
            5004 => Self::TransitionRejected,
            5005 => Self::RefundNotAllowed,
            5006 => Self::CurrencyUnsupported,

            6001 => Self::CouponNotFound,
            6002 => Self::CouponCodeExists,
            6003 => Self::ReservationNotFound,
            6004 => Self::ReservationInactive,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
