//! PADP channel endpoints built on top of the SLP stream reader.
//!
//! [`PadpSender`] drives the stop-and-wait send path; [`PadpReceiver`]
//! drives the receive path. Both share [`SlpReader`] for pulling and
//! resynchronizing on SLP datagrams from a raw [`crate::transport::Transport`].

mod reader;
mod receiver;
mod sender;

pub use reader::SlpReader;
pub use receiver::{PadpReceiver, ReceiveEvent};
pub use sender::{PadpSender, FRAGMENT_SCRATCH_SIZE};
