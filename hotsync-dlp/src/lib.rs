//! Desktop Link Protocol (DLP): the request/response RPC layer HotSync
//! conduits speak once a PADP or NetSync channel is up.
//!
//! This crate only knows about DLP's own framing (arguments, function ids,
//! error codes) and the catalog of commands built on top of it. Database
//! reconciliation lives in `hotsync-sync`; driving a whole session lives in
//! `hotsync-session`.

pub mod args;
pub mod catalog;
pub mod client;
pub mod datetime;
pub mod error;
pub mod message;
pub mod vfs;

pub use args::ArgSchema;
pub use catalog::{DlpCategory, DlpFunction};
pub use client::DlpClient;
pub use error::{DlpError, DlpErrorCode, Result};
