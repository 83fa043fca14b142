//! Checkout flow
//!
//! [`verifier`] is the pure order-correction pass; [`service`] wires it to
//! live data, creates the draft holds, and talks to the gateway adapter.

pub mod service;
pub mod verifier;

pub use service::{BuyerIdentity, CheckoutError, CheckoutOutcome, CheckoutService};
pub use verifier::{
    CouponContext, MAX_UNITS_PER_LINE, ReservationContext, TicketSale, VerifyContext, verify,
};
