//! SLP stream reader: signature resynchronization and datagram extraction.
//!
//! Before the first successful frame on a serial transport, arbitrary
//! garbage may precede the signature; this reader scans forward for the
//! three-byte signature, discarding anything before it, and preserves any
//! partial prefix across read boundaries via the underlying ring buffer.
//! That leniency only applies pre-sync: once one frame has been parsed
//! successfully, every subsequent frame must start immediately after the
//! previous one's CRC, and a signature mismatch at that point means the
//! stream itself is corrupt, not that more garbage needs scanning past.

use crate::buffer::RingBuffer;
use crate::core::slp;
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Buffers bytes from a [`Transport`] and extracts complete SLP datagrams.
#[derive(Debug)]
pub struct SlpReader<const N: usize> {
    buf: RingBuffer<N>,
    /// Set once the first datagram has been successfully extracted. Before
    /// that, a signature mismatch is scanned past as leading garbage;
    /// after, it's a fatal [`Error::MalformedFrame`].
    synced: bool,
}

impl<const N: usize> SlpReader<N> {
    pub const fn new() -> Self {
        Self { buf: RingBuffer::new(), synced: false }
    }

    /// Pulls whatever bytes are currently available from the transport into
    /// the internal buffer. A `WouldBlock` from the transport is not an
    /// error here — it just means nothing new has arrived yet.
    pub fn pull<T: Transport>(&mut self, transport: &mut T) -> Result<()> {
        let mut tmp = [0u8; 256];
        match transport.read(&mut tmp) {
            Ok(0) => Ok(()),
            Ok(n) => self.buf.write_all(&tmp[..n]),
            Err(Error::WouldBlock) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Feeds bytes directly into the buffer without reading from a
    /// transport. Used when a datagram was obtained by some other means
    /// (e.g. an implicit ACK's piggybacked DATA fragment) but still needs
    /// to flow through the normal extraction path.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.write_all(bytes)
    }

    /// Attempts to extract one complete datagram (header, payload and CRC)
    /// into `scratch`. Returns `Ok(None)` when not enough data has arrived
    /// yet.
    ///
    /// Before the first successful frame, any garbage preceding the
    /// signature is discarded as it's scanned past. Once synchronized, a
    /// signature mismatch means the stream desynced mid-session — that's
    /// a fatal [`Error::MalformedFrame`] rather than more bytes to skip.
    pub fn try_extract(&mut self, scratch: &mut [u8]) -> Result<Option<usize>> {
        loop {
            if self.buf.len() < 3 {
                return Ok(None);
            }
            let mut probe = [0u8; 3];
            self.buf.peek(&mut probe);
            if probe == slp::SIGNATURE {
                break;
            }
            if self.synced {
                return Err(Error::MalformedFrame);
            }
            self.buf.skip(1);
        }

        if self.buf.len() < slp::HEADER_SIZE {
            return Ok(None);
        }

        let mut header = [0u8; slp::HEADER_SIZE];
        self.buf.peek(&mut header);
        let payload_len = u16::from_be_bytes([header[6], header[7]]) as usize;
        let total = slp::HEADER_SIZE + payload_len + slp::CRC_SIZE;

        if self.buf.len() < total {
            return Ok(None);
        }
        if scratch.len() < total {
            return Err(Error::BufferTooSmall);
        }

        self.buf.peek(&mut scratch[..total]);
        self.buf.skip(total);
        self.synced = true;
        Ok(Some(total))
    }
}

impl<const N: usize> Default for SlpReader<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SlpDatagram, SlpType};
    use crate::transport::LoopbackTransport;

    #[test]
    fn extracts_datagram_after_garbage_prefix() {
        let mut transport: LoopbackTransport<256> = LoopbackTransport::new();
        transport.write(b"\x00\x01garbage").unwrap();

        let datagram = SlpDatagram::new(3, 3, SlpType::Padp, 5, b"payload").unwrap();
        let mut encoded = [0u8; 64];
        let n = datagram.encode(&mut encoded).unwrap();
        transport.write(&encoded[..n]).unwrap();

        let mut reader: SlpReader<256> = SlpReader::new();
        reader.pull(&mut transport).unwrap();

        let mut scratch = [0u8; 64];
        let extracted = reader.try_extract(&mut scratch).unwrap().unwrap();
        let (decoded, consumed) = SlpDatagram::decode(&scratch[..extracted]).unwrap();
        assert_eq!(consumed, extracted);
        assert_eq!(decoded.xid, 5);
        assert_eq!(decoded.payload, b"payload");
    }

    #[test]
    fn returns_none_on_partial_datagram() {
        let mut transport: LoopbackTransport<256> = LoopbackTransport::new();
        transport.write(&slp::SIGNATURE).unwrap();
        transport.write(&[3, 3, 2]).unwrap();

        let mut reader: SlpReader<256> = SlpReader::new();
        reader.pull(&mut transport).unwrap();

        let mut scratch = [0u8; 64];
        assert!(reader.try_extract(&mut scratch).unwrap().is_none());
    }

    #[test]
    fn desync_after_first_frame_is_fatal() {
        let mut transport: LoopbackTransport<256> = LoopbackTransport::new();
        let datagram = SlpDatagram::new(3, 3, SlpType::Padp, 5, b"payload").unwrap();
        let mut encoded = [0u8; 64];
        let n = datagram.encode(&mut encoded).unwrap();
        transport.write(&encoded[..n]).unwrap();

        let mut reader: SlpReader<256> = SlpReader::new();
        reader.pull(&mut transport).unwrap();
        let mut scratch = [0u8; 64];
        reader.try_extract(&mut scratch).unwrap().unwrap();
        assert!(reader.synced);

        // Garbage where the next frame's signature should start.
        transport.write(b"not a signature at all").unwrap();
        reader.pull(&mut transport).unwrap();
        assert_eq!(reader.try_extract(&mut scratch), Err(Error::MalformedFrame));
    }
}
