//! Escrow lifecycle primitives shared by every Trustora process:
//! the state machine, fixed-point amount/fee arithmetic, the
//! Coordinator<->Signer authenticated envelope, and idempotency rules.
//!
//! This crate has no I/O. Everything here is pure functions and plain
//! data so it can be unit tested without a database, a Redis instance,
//! or a chain RPC endpoint.

pub mod amount;
pub mod chain;
pub mod deposit;
pub mod error;
pub mod fee;
pub mod idempotency;
pub mod review;
pub mod security;
pub mod state_machine;

pub use amount::{format_amount, parse_amount, quantize};
pub use chain::{Chain, Token};
pub use error::CoreError;
pub use fee::{calculate_fee, calculate_net, FeeSnapshot};
pub use state_machine::{validate_transition, EscrowStatus};
