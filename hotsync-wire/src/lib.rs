#![cfg_attr(not(feature = "std"), no_std)]

//! Wire framing for the Palm OS HotSync protocol stack.
//!
//! This crate implements the layered transport beneath HotSync: SLP
//! datagrams, PADP fragmentation and stop-and-wait delivery, the CMP
//! connection handshake, and the alternate NetSync framing used over
//! USB/TCP. It does not know anything about DLP requests or database
//! reconciliation; see `hotsync-dlp` and `hotsync-sync` for those.

pub mod buffer;
pub mod channel;
pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod reliable;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use protocol::{CmpHandshake, HandshakeState};
pub use transport::Transport;
