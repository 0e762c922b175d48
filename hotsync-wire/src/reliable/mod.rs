//! Reliability mechanisms for PADP's stop-and-wait delivery.
//!
//! - [`MessageAssembler`]: accumulates in-order DATA fragments on receive.
//! - [`RetryPolicy`] / [`RetransmitStats`]: timeout and attempt-budget
//!   bookkeeping for the single outstanding fragment on send.

mod reassembler;
mod retransmit;

pub use reassembler::MessageAssembler;
pub use retransmit::{RetransmitStats, RetryOutcome, RetryPolicy};
