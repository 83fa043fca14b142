//! Payment settlement
//!
//! The state machine driving attendee records through the purchase
//! lifecycle. [`transition`] holds the exhaustive table, [`service`] applies
//! results transactionally per payment token, [`notify`] and [`stats`] are
//! the side-effect seams that fire only on real transitions.

pub mod notify;
pub mod service;
pub mod stats;
pub mod transition;

pub use notify::{CountingDispatcher, LogDispatcher, NotificationDispatcher};
pub use service::SettlementService;
pub use stats::{SalesCounters, TicketTally};
pub use transition::{Decision, decide};
