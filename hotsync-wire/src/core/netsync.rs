//! NetSync framing: the alternate transport used over USB and TCP.
//!
//! Unlike SLP/PADP, NetSync has no checksum, no retry layer, and no
//! fragmentation — framing is the entire contract. A fixed 6-byte header
//! precedes each payload.

use crate::error::{Error, Result};

/// The constant first byte of every NetSync frame.
pub const CONST_BYTE: u8 = 0x01;

/// Size of the NetSync frame header: const byte + xid + u32be length.
pub const HEADER_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetSyncFrame<'a> {
    pub xid: u8,
    pub payload: &'a [u8],
}

impl<'a> NetSyncFrame<'a> {
    pub fn new(xid: u8, payload: &'a [u8]) -> Result<Self> {
        if payload.len() > u32::MAX as usize {
            return Err(Error::ValueTooLarge);
        }
        Ok(Self { xid, payload })
    }

    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let total = self.wire_size();
        if buf.len() < total {
            return Err(Error::BufferTooSmall);
        }

        buf[0] = CONST_BYTE;
        buf[1] = self.xid;
        buf[2..6].copy_from_slice(&(self.payload.len() as u32).to_be_bytes());
        if !self.payload.is_empty() {
            buf[HEADER_SIZE..total].copy_from_slice(self.payload);
        }

        Ok(total)
    }

    pub fn decode(buf: &'a [u8]) -> Result<(Self, usize)> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::BufferTooSmall);
        }
        if buf[0] != CONST_BYTE {
            return Err(Error::MalformedFrame);
        }

        let xid = buf[1];
        let payload_len = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]) as usize;
        let total = HEADER_SIZE + payload_len;
        if buf.len() < total {
            return Err(Error::BufferTooSmall);
        }

        Ok((
            Self { xid, payload: &buf[HEADER_SIZE..total] },
            total,
        ))
    }
}

/// The three-step NetSync magic-byte handshake exchanged before any
/// framed DLP traffic, per the connection setup every NetSync transport
/// (USB or TCP) requires.
pub mod handshake {
    /// Length of the host's first inbound read (device's opening request).
    pub const REQUEST_1_LEN: usize = 22;
    /// Length of the host's first outbound write.
    pub const RESPONSE_1_LEN: usize = 50;
    /// Length of the device's second request.
    pub const REQUEST_2_LEN: usize = 22;
    /// Length of the host's second response.
    pub const RESPONSE_2_LEN: usize = 50;
    /// The device's third and final handshake message: a fixed 8-byte
    /// sequence with no reply expected.
    pub const REQUEST_3: [u8; 8] = [0x93, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

    /// Builds the host's first handshake response. Only the leading bytes
    /// are specified by the protocol; the remainder is zero-filled.
    pub fn build_response_1() -> [u8; RESPONSE_1_LEN] {
        let mut buf = [0u8; RESPONSE_1_LEN];
        buf[0] = 0x12;
        buf[1] = 0x01;
        buf
    }

    /// Builds the host's second handshake response.
    pub fn build_response_2() -> [u8; RESPONSE_2_LEN] {
        let mut buf = [0u8; RESPONSE_2_LEN];
        buf[0] = 0x13;
        buf[1] = 0x01;
        buf
    }

    /// The full literal prefix opening request 1.
    const REQUEST_1_PREFIX: [u8; 4] = [0x90, 0x01, 0x00, 0x00];

    /// Validates the device's first request: correct length and the full
    /// `90 01 00 00` prefix that opens the handshake.
    pub fn validate_request_1(buf: &[u8]) -> bool {
        buf.len() == REQUEST_1_LEN && buf.starts_with(&REQUEST_1_PREFIX)
    }

    /// Validates the device's second request: correct length and the
    /// `92 01` prefix.
    pub fn validate_request_2(buf: &[u8]) -> bool {
        buf.len() == REQUEST_2_LEN && buf[0] == 0x92 && buf[1] == 0x01
    }

    /// Validates the device's third and final request against the fixed
    /// literal sequence.
    pub fn validate_request_3(buf: &[u8]) -> bool {
        buf == REQUEST_3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let f = NetSyncFrame::new(3, b"payload bytes").unwrap();
        let mut buf = [0u8; 64];
        let n = f.encode(&mut buf).unwrap();
        let (decoded, consumed) = NetSyncFrame::decode(&buf[..n]).unwrap();
        assert_eq!(consumed, n);
        assert_eq!(decoded, f);
    }

    #[test]
    fn rejects_wrong_const_byte() {
        let mut buf = [0u8; 16];
        buf[0] = 0x02;
        assert_eq!(NetSyncFrame::decode(&buf).unwrap_err(), Error::MalformedFrame);
    }

    #[test]
    fn handshake_validates_request_prefixes() {
        let mut req1 = [0u8; handshake::REQUEST_1_LEN];
        req1[0] = 0x90;
        req1[1] = 0x01;
        assert!(handshake::validate_request_1(&req1));

        let mut short_prefix = [0u8; handshake::REQUEST_1_LEN];
        short_prefix[0] = 0x90;
        short_prefix[1] = 0x01;
        short_prefix[2] = 0xff;
        assert!(!handshake::validate_request_1(&short_prefix));

        let mut req2 = [0u8; handshake::REQUEST_2_LEN];
        req2[0] = 0x92;
        req2[1] = 0x01;
        assert!(handshake::validate_request_2(&req2));

        assert!(handshake::validate_request_3(&handshake::REQUEST_3));
    }

    #[test]
    fn handshake_responses_have_correct_prefix() {
        let r1 = handshake::build_response_1();
        assert_eq!(&r1[0..2], &[0x12, 0x01]);

        let r2 = handshake::build_response_2();
        assert_eq!(&r2[0..2], &[0x13, 0x01]);
    }
}
