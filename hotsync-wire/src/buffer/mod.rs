//! Buffer management for the wire layer.
//!
//! - [`RingBuffer`]: circular byte buffer used by the SLP reader while it
//!   scans for the next datagram signature.
//! - [`PendingFragment`]: the single fragment PADP's stop-and-wait sender
//!   keeps in flight while awaiting an ACK.

mod ring;
mod window;

pub use ring::RingBuffer;
pub use window::PendingFragment;
