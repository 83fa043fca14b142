//! Shared types for the Gate ticket server
//!
//! This crate holds everything both the server and its callers agree on:
//!
//! - **模型** (`models`): Event / TicketType / Coupon / Reservation / Attendee
//! - **订单** (`order`): proposed and corrected order shapes, verification
//!   flags, gateway result contract
//! - **错误** (`error`): unified error codes and API response envelope
//! - **工具** (`util`): timestamps, id and token generation

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-export the types almost every consumer needs
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use models::{
    AttendeeRecord, AttendeeStatus, Coupon, Event, Reservation, TicketType, CAPACITY_HOLDING,
};
pub use order::{CorrectedOrder, GatewayResult, ProposedOrder, TransactionData, VerifyFlag};
