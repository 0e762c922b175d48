//! PADP (Packet Assembly/Disassembly Protocol) datagram framing.
//!
//! A PADP datagram is the payload carried inside an SLP datagram of type
//! [`crate::core::SlpType::Padp`]. It never appears in isolation on the
//! wire; [`crate::channel`] layers stop-and-wait delivery on top of it.
//!
//! # Wire format
//!
//! ```text
//! +--------+--------+-------------------------------+
//! |  type  | flags  |   size_or_offset (2 or 4 bytes) |
//! +--------+--------+-------------------------------+
//! |                  fragment payload                |
//! +---------------------------------------------------+
//! ```
//!
//! `size_or_offset` is two bytes unless the `long_form` flag is set, in
//! which case it is four bytes.

use crate::error::{Error, Result};

/// The kind of a PADP datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PadpType {
    /// Carries a message fragment.
    Data = 0x01,
    /// Acknowledges a `Data` fragment.
    Ack = 0x02,
    /// Keep-alive with no payload; silently dropped on receive.
    Tickle = 0x04,
    /// Aborts the in-progress message.
    Abort = 0x08,
}

impl PadpType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Data),
            0x02 => Some(Self::Ack),
            0x04 => Some(Self::Tickle),
            0x08 => Some(Self::Abort),
            _ => None,
        }
    }
}

const FLAG_FIRST: u8 = 1 << 7;
const FLAG_LAST: u8 = 1 << 6;
const FLAG_ERR_MEMORY: u8 = 1 << 5;
const FLAG_LONG_FORM: u8 = 1 << 4;

/// A parsed PADP datagram borrowing its payload from the underlying buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadpDatagram<'a> {
    pub kind: PadpType,
    pub first: bool,
    pub last: bool,
    pub err_memory: bool,
    pub long_form: bool,
    /// On a `first` DATA fragment: total assembled message size. On later
    /// fragments: cumulative bytes already delivered. On ACK: mirrors the
    /// acknowledged fragment's value.
    pub size_or_offset: u32,
    pub payload: &'a [u8],
}

impl<'a> PadpDatagram<'a> {
    fn flags_byte(&self) -> u8 {
        let mut flags = 0u8;
        if self.first {
            flags |= FLAG_FIRST;
        }
        if self.last {
            flags |= FLAG_LAST;
        }
        if self.err_memory {
            flags |= FLAG_ERR_MEMORY;
        }
        if self.long_form {
            flags |= FLAG_LONG_FORM;
        }
        flags
    }

    fn size_field_len(&self) -> usize {
        if self.long_form {
            4
        } else {
            2
        }
    }

    /// Builds a DATA fragment. `long_form` is chosen automatically based on
    /// whether `size_or_offset` fits in 16 bits.
    pub fn data(first: bool, last: bool, size_or_offset: u32, payload: &'a [u8]) -> Self {
        Self {
            kind: PadpType::Data,
            first,
            last,
            err_memory: false,
            long_form: size_or_offset > u16::MAX as u32,
            size_or_offset,
            payload,
        }
    }

    /// Builds an ACK mirroring a received fragment's `size_or_offset`.
    pub fn ack(size_or_offset: u32) -> Self {
        Self {
            kind: PadpType::Ack,
            first: false,
            last: false,
            err_memory: false,
            long_form: size_or_offset > u16::MAX as u32,
            size_or_offset,
            payload: &[],
        }
    }

    /// Total wire size of this datagram.
    pub fn wire_size(&self) -> usize {
        2 + self.size_field_len() + self.payload.len()
    }

    /// Serializes the datagram into `buf`.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let size_field_len = self.size_field_len();
        let total = self.wire_size();
        if buf.len() < total {
            return Err(Error::BufferTooSmall);
        }

        buf[0] = self.kind as u8;
        buf[1] = self.flags_byte();

        if self.long_form {
            buf[2..6].copy_from_slice(&self.size_or_offset.to_be_bytes());
        } else {
            if self.size_or_offset > u16::MAX as u32 {
                return Err(Error::ValueTooLarge);
            }
            buf[2..4].copy_from_slice(&(self.size_or_offset as u16).to_be_bytes());
        }

        let header_len = 2 + size_field_len;
        if !self.payload.is_empty() {
            buf[header_len..total].copy_from_slice(self.payload);
        }

        Ok(total)
    }

    /// Parses a PADP datagram from `buf` (the entire SLP payload).
    pub fn decode(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < 2 {
            return Err(Error::BufferTooSmall);
        }

        let kind = PadpType::from_u8(buf[0]).ok_or(Error::MalformedFrame)?;
        let flags = buf[1];
        let long_form = flags & FLAG_LONG_FORM != 0;
        let size_field_len = if long_form { 4 } else { 2 };
        let header_len = 2 + size_field_len;

        if buf.len() < header_len {
            return Err(Error::BufferTooSmall);
        }

        let size_or_offset = if long_form {
            u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]])
        } else {
            u16::from_be_bytes([buf[2], buf[3]]) as u32
        };

        Ok(Self {
            kind,
            first: flags & FLAG_FIRST != 0,
            last: flags & FLAG_LAST != 0,
            err_memory: flags & FLAG_ERR_MEMORY != 0,
            long_form,
            size_or_offset,
            payload: &buf[header_len..],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_short_form() {
        let d = PadpDatagram::data(true, false, 1100, b"abcd");
        let mut buf = [0u8; 64];
        let n = d.encode(&mut buf).unwrap();
        let decoded = PadpDatagram::decode(&buf[..n]).unwrap();
        assert_eq!(decoded, d);
        assert!(!decoded.long_form);
    }

    #[test]
    fn roundtrip_long_form() {
        let big = (u16::MAX as u32) + 42;
        let d = PadpDatagram::data(false, true, big, b"tail");
        let mut buf = [0u8; 64];
        let n = d.encode(&mut buf).unwrap();
        let decoded = PadpDatagram::decode(&buf[..n]).unwrap();
        assert!(decoded.long_form);
        assert_eq!(decoded.size_or_offset, big);
    }

    #[test]
    fn ack_mirrors_offset() {
        let ack = PadpDatagram::ack(512);
        let mut buf = [0u8; 16];
        let n = ack.encode(&mut buf).unwrap();
        let decoded = PadpDatagram::decode(&buf[..n]).unwrap();
        assert_eq!(decoded.kind, PadpType::Ack);
        assert_eq!(decoded.size_or_offset, 512);
        assert!(decoded.payload.is_empty());
    }
}
