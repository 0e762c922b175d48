//! CMP (Connection Management Protocol) handshake datagram.
//!
//! CMP rides inside a single PADP message exchanged at the start of a
//! serial session, before any DLP traffic. It negotiates the baud rate
//! the link will switch to once the handshake completes.

use crate::error::{Error, Result};

/// Reserved SLP/PADP transaction id used for the CMP exchange. Never
/// reused by ordinary PADP messages.
pub const CMP_XID: u8 = 0xFF;

/// Wire size of a CMP datagram: type + flags + major + minor + pad + baud.
pub const WIRE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CmpType {
    /// Sent by the device to open the handshake.
    Wakeup = 0x01,
    /// Sent by the host in reply, carrying the negotiated baud rate.
    Init = 0x02,
    /// Either side aborts the handshake.
    Abort = 0x03,
}

impl CmpType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Wakeup),
            0x02 => Some(Self::Init),
            0x03 => Some(Self::Abort),
            _ => None,
        }
    }
}

const FLAG_CHANGE_BAUD: u8 = 1 << 7;
const FLAG_LONG_FORM_PADP: u8 = 1 << 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmpDatagram {
    pub kind: CmpType,
    pub change_baud: bool,
    pub long_form_padp_supported: bool,
    pub major_ver: u8,
    pub minor_ver: u8,
    pub baud_rate: u32,
}

impl CmpDatagram {
    /// Builds the host's `INIT` reply to a device's `WAKEUP`.
    pub fn init_reply(negotiated_baud: u32) -> Self {
        Self {
            kind: CmpType::Init,
            change_baud: negotiated_baud != 9600,
            long_form_padp_supported: true,
            major_ver: 1,
            minor_ver: 0,
            baud_rate: negotiated_baud,
        }
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < WIRE_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let mut flags = 0u8;
        if self.change_baud {
            flags |= FLAG_CHANGE_BAUD;
        }
        if self.long_form_padp_supported {
            flags |= FLAG_LONG_FORM_PADP;
        }

        buf[0] = self.kind as u8;
        buf[1] = flags;
        buf[2] = self.major_ver;
        buf[3] = self.minor_ver;
        buf[4..6].copy_from_slice(&0u16.to_be_bytes());
        buf[6..10].copy_from_slice(&self.baud_rate.to_be_bytes());

        Ok(WIRE_SIZE)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < WIRE_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let kind = CmpType::from_u8(buf[0]).ok_or(Error::MalformedFrame)?;
        let flags = buf[1];
        let baud_rate = u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]);

        Ok(Self {
            kind,
            change_baud: flags & FLAG_CHANGE_BAUD != 0,
            long_form_padp_supported: flags & FLAG_LONG_FORM_PADP != 0,
            major_ver: buf[2],
            minor_ver: buf[3],
            baud_rate,
        })
    }
}

/// Picks the negotiated baud rate: the lower of the device's advertised
/// rate and the host's maximum.
pub fn negotiate_baud(device_baud: u32, host_max: u32) -> u32 {
    device_baud.min(host_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let d = CmpDatagram::init_reply(115200);
        let mut buf = [0u8; WIRE_SIZE];
        d.encode(&mut buf).unwrap();
        let decoded = CmpDatagram::decode(&buf).unwrap();
        assert_eq!(decoded, d);
        assert!(decoded.change_baud);
    }

    #[test]
    fn keeps_default_baud_unchanged() {
        let d = CmpDatagram::init_reply(9600);
        assert!(!d.change_baud);
    }

    #[test]
    fn negotiate_picks_lower() {
        assert_eq!(negotiate_baud(57600, 115200), 57600);
        assert_eq!(negotiate_baud(230400, 115200), 115200);
    }
}
