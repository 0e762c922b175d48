//! Wire data structures for the four HotSync framing layers: SLP, PADP,
//! CMP, and NetSync.

mod checksum;
mod cmp;
mod netsync;
mod padp;
pub(crate) mod slp;

pub use checksum::{header_checksum, Crc16};
pub use cmp::{negotiate_baud, CmpDatagram, CmpType, CMP_XID};
pub use netsync::{handshake, NetSyncFrame, CONST_BYTE, HEADER_SIZE};
pub use padp::{PadpDatagram, PadpType};
pub use slp::{SlpDatagram, SlpType};
