//! Async session orchestration on top of the lower HotSync layers:
//! NetSync/serial transport adapters, the handshake, per-user storage, and
//! the accept loop that turns incoming connections into
//! [`orchestrator::run_session`] calls.

pub mod dlp_client;
pub mod error;
pub mod netsync;
pub mod orchestrator;
pub mod serial;
pub mod server;
pub mod storage;
pub mod usb;

pub use error::{Result, SessionError};
pub use orchestrator::{run_session, EndStatus, SessionInfo};
