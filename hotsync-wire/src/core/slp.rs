//! SLP (Serial Link Protocol) datagram framing.
//!
//! This is the lowest layer of the HotSync stack: a checksummed, CRC
//! protected datagram wrapped around an opaque payload produced by PADP.
//!
//! # Wire format
//!
//! ```text
//! 0       1       2       3       4       5       6       7       8       9
//! +-------+-------+-------+-------+-------+-------+-------+-------+-------+-------+
//! | 0xBE  | 0xEF  | 0xED  |dest_sk|src_sock|  type | payload_len(be)| xid  | hdr_cksum |
//! +-------+-------+-------+-------+-------+-------+-------+-------+-------+-------+
//! |                          payload (payload_len bytes)                          |
//! +---------------------------------------------------------------------------------+
//! |               CRC-16 (big-endian, over header + payload)                       |
//! +---------------------------------------------------------------------------------+
//! ```

use super::checksum::{header_checksum, Crc16};
use crate::error::{Error, Result};

/// Three-byte signature that opens every SLP datagram.
pub const SIGNATURE: [u8; 3] = [0xBE, 0xEF, 0xED];

/// Size of the SLP header, signature through `header_checksum` inclusive.
pub const HEADER_SIZE: usize = 10;

/// Size of the trailing CRC-16 field.
pub const CRC_SIZE: usize = 2;

/// The protocol carried by an SLP datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SlpType {
    /// Reserved system-level traffic (used only during the CMP handshake
    /// on some devices; most traffic uses `Padp`).
    System = 0,
    /// PADP-framed payload; the overwhelming majority of traffic.
    Padp = 2,
    /// Loopback test traffic, dropped by the PADP receive path.
    Loopback = 3,
}

impl SlpType {
    /// Converts a raw byte into an `SlpType`.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::System),
            2 => Some(Self::Padp),
            3 => Some(Self::Loopback),
            _ => None,
        }
    }
}

/// A parsed SLP datagram borrowing its payload from the underlying buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlpDatagram<'a> {
    pub dest_sock: u8,
    pub src_sock: u8,
    pub kind: SlpType,
    pub xid: u8,
    pub payload: &'a [u8],
}

impl<'a> SlpDatagram<'a> {
    /// Creates a new datagram. `payload` must fit in 16 bits.
    pub fn new(dest_sock: u8, src_sock: u8, kind: SlpType, xid: u8, payload: &'a [u8]) -> Result<Self> {
        if payload.len() > u16::MAX as usize {
            return Err(Error::ValueTooLarge);
        }
        Ok(Self { dest_sock, src_sock, kind, xid, payload })
    }

    /// Total wire size of this datagram: header + payload + CRC.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CRC_SIZE
    }

    /// Serializes the datagram into `buf`, returning the number of bytes
    /// written. Computes the header checksum and trailing CRC-16.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let total = self.wire_size();
        if buf.len() < total {
            return Err(Error::BufferTooSmall);
        }

        buf[0..3].copy_from_slice(&SIGNATURE);
        buf[3] = self.dest_sock;
        buf[4] = self.src_sock;
        buf[5] = self.kind as u8;
        buf[6..8].copy_from_slice(&(self.payload.len() as u16).to_be_bytes());
        buf[8] = self.xid;
        buf[9] = header_checksum(&buf[0..9]);

        let payload_end = HEADER_SIZE + self.payload.len();
        if !self.payload.is_empty() {
            buf[HEADER_SIZE..payload_end].copy_from_slice(self.payload);
        }

        let crc = Crc16::compute_slices(&[&buf[0..HEADER_SIZE], self.payload]);
        buf[payload_end..payload_end + CRC_SIZE].copy_from_slice(&crc.to_be_bytes());

        Ok(total)
    }

    /// Parses a single datagram starting at the beginning of `buf` (the
    /// caller is responsible for signature resynchronization; see
    /// [`crate::channel`]). Returns the datagram and the number of bytes
    /// consumed.
    pub fn decode(buf: &'a [u8]) -> Result<(Self, usize)> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::BufferTooSmall);
        }
        if buf[0..3] != SIGNATURE {
            return Err(Error::SignatureNotFound);
        }

        let dest_sock = buf[3];
        let src_sock = buf[4];
        let kind = SlpType::from_u8(buf[5]).ok_or(Error::MalformedFrame)?;
        let payload_len = u16::from_be_bytes([buf[6], buf[7]]) as usize;
        let xid = buf[8];
        let stored_checksum = buf[9];

        if stored_checksum != header_checksum(&buf[0..9]) {
            return Err(Error::BadHeaderChecksum);
        }

        let total = HEADER_SIZE + payload_len + CRC_SIZE;
        if buf.len() < total {
            return Err(Error::BufferTooSmall);
        }

        let payload = &buf[HEADER_SIZE..HEADER_SIZE + payload_len];
        let stored_crc = u16::from_be_bytes([buf[total - 2], buf[total - 1]]);
        let computed_crc = Crc16::compute_slices(&[&buf[0..HEADER_SIZE], payload]);
        if stored_crc != computed_crc {
            return Err(Error::BadCrc);
        }

        Ok((
            Self { dest_sock, src_sock, kind, xid, payload },
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let d = SlpDatagram::new(3, 3, SlpType::Padp, 7, b"hello").unwrap();
        let mut buf = [0u8; 64];
        let n = d.encode(&mut buf).unwrap();

        let (decoded, consumed) = SlpDatagram::decode(&buf[..n]).unwrap();
        assert_eq!(consumed, n);
        assert_eq!(decoded, d);
    }

    #[test]
    fn rejects_missing_signature() {
        let buf = [0u8; 32];
        assert_eq!(SlpDatagram::decode(&buf).unwrap_err(), Error::SignatureNotFound);
    }

    #[test]
    fn rejects_bad_header_checksum() {
        let d = SlpDatagram::new(3, 3, SlpType::Padp, 1, b"x").unwrap();
        let mut buf = [0u8; 32];
        let n = d.encode(&mut buf).unwrap();
        buf[9] ^= 0xFF;
        assert_eq!(SlpDatagram::decode(&buf[..n]).unwrap_err(), Error::BadHeaderChecksum);
    }

    #[test]
    fn rejects_bad_crc() {
        let d = SlpDatagram::new(3, 3, SlpType::Padp, 1, b"payload").unwrap();
        let mut buf = [0u8; 32];
        let n = d.encode(&mut buf).unwrap();
        buf[n - 1] ^= 0xFF;
        assert_eq!(SlpDatagram::decode(&buf[..n]).unwrap_err(), Error::BadCrc);
    }
}
