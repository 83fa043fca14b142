//! Order and settlement wire types
//!
//! An order is ephemeral: it is re-derived from live inventory on every
//! verification pass and never persisted or trusted from client input.

mod settlement;
mod types;

pub use settlement::{GatewayResult, SettlementOutcome, TransactionData};
pub use types::{CorrectedLine, CorrectedOrder, ProposedLine, ProposedOrder, VerifyFlag};
