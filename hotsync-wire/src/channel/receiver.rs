//! PADP stop-and-wait receive path.
//!
//! Reassembles fragments into a complete message, validating that the
//! first fragment is marked `first` and that each subsequent fragment's
//! `size_or_offset` matches the number of bytes already delivered. TICKLE
//! datagrams are dropped silently; a DATA fragment that duplicates the last
//! one delivered is re-ACKed without being re-delivered to the caller.

use crate::core::{PadpDatagram, PadpType, SlpDatagram, SlpType};
use crate::error::Result;
use crate::reliable::MessageAssembler;
use crate::transport::Transport;

use super::reader::SlpReader;

/// Outcome of processing one incoming SLP datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveEvent {
    /// Not a complete message yet; more fragments are expected.
    Pending,
    /// A complete message was just assembled and can be read via
    /// [`PadpReceiver::take_message`].
    MessageReady,
    /// The datagram was not PADP DATA (e.g. TICKLE) and was ignored.
    Ignored,
}

/// Reassembles PADP messages arriving over an abstract byte [`Transport`],
/// sending an ACK for every DATA fragment it accepts or re-accepts.
///
/// `R` sizes the internal read buffer; `N` bounds the largest message this
/// receiver can reassemble.
pub struct PadpReceiver<const R: usize, const N: usize> {
    reader: SlpReader<R>,
    assembler: MessageAssembler<N>,
    last_xid: Option<u8>,
    last_offset: Option<u32>,
}

impl<const R: usize, const N: usize> PadpReceiver<R, N> {
    pub const fn new() -> Self {
        Self {
            reader: SlpReader::new(),
            assembler: MessageAssembler::new(),
            last_xid: None,
            last_offset: None,
        }
    }

    /// Pulls bytes from `transport` and processes at most one complete SLP
    /// datagram, ACKing PADP DATA fragments as required by the protocol.
    pub fn poll<T: Transport>(&mut self, transport: &mut T) -> Result<ReceiveEvent> {
        self.reader.pull(transport)?;
        self.process_next(transport)
    }

    /// Feeds a raw SLP frame straight into the reassembler, as if it had
    /// just arrived over `transport`, without actually reading `transport`.
    /// Used for a DATA fragment that arrived as an implicit ACK on the
    /// send path: it must still be reassembled and ACKed like any other
    /// fragment, it just didn't come through this receiver's own poll.
    pub fn ingest<T: Transport>(&mut self, transport: &mut T, raw_slp_frame: &[u8]) -> Result<ReceiveEvent> {
        self.reader.ingest(raw_slp_frame)?;
        self.process_next(transport)
    }

    fn process_next<T: Transport>(&mut self, transport: &mut T) -> Result<ReceiveEvent> {
        let mut scratch = [0u8; 1100];
        let Some(len) = self.reader.try_extract(&mut scratch)? else {
            return Ok(ReceiveEvent::Pending);
        };

        let (datagram, _) = SlpDatagram::decode(&scratch[..len])?;
        if datagram.kind != SlpType::Padp {
            return Ok(ReceiveEvent::Ignored);
        }
        let padp = PadpDatagram::decode(datagram.payload)?;
        if padp.kind != PadpType::Data {
            return Ok(ReceiveEvent::Ignored);
        }

        if self.is_duplicate(datagram.xid, padp.size_or_offset) {
            self.send_ack(transport, datagram.dest_sock, datagram.src_sock, datagram.xid, padp.size_or_offset)?;
            return Ok(ReceiveEvent::Pending);
        }

        if padp.first {
            self.assembler.begin(padp.size_or_offset as usize, padp.payload)?;
        } else {
            self.assembler.append(padp.size_or_offset as usize, padp.payload)?;
        }
        self.last_xid = Some(datagram.xid);
        self.last_offset = Some(padp.size_or_offset);

        self.send_ack(transport, datagram.dest_sock, datagram.src_sock, datagram.xid, padp.size_or_offset)?;

        if padp.last {
            Ok(ReceiveEvent::MessageReady)
        } else {
            Ok(ReceiveEvent::Pending)
        }
    }

    fn is_duplicate(&self, xid: u8, size_or_offset: u32) -> bool {
        self.last_xid == Some(xid) && self.last_offset == Some(size_or_offset)
    }

    fn send_ack<T: Transport>(
        &self,
        transport: &mut T,
        dest_sock: u8,
        src_sock: u8,
        xid: u8,
        size_or_offset: u32,
    ) -> Result<()> {
        let ack = PadpDatagram::ack(size_or_offset);
        let mut padp_buf = [0u8; 16];
        let padp_len = ack.encode(&mut padp_buf)?;

        // ACK flows back to whoever sent the fragment, so sockets swap.
        let slp = SlpDatagram::new(src_sock, dest_sock, SlpType::Padp, xid, &padp_buf[..padp_len])?;
        let mut slp_buf = [0u8; 32];
        let slp_len = slp.encode(&mut slp_buf)?;
        transport.write_all(&slp_buf[..slp_len])
    }

    /// Takes the completed message out of the assembler, if one is ready.
    pub fn take_message(&mut self) -> Option<&[u8]> {
        self.assembler.take()
    }
}

impl<const R: usize, const N: usize> Default for PadpReceiver<R, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;

    fn push_fragment(
        transport: &mut LoopbackTransport<4096>,
        xid: u8,
        first: bool,
        last: bool,
        size_or_offset: u32,
        payload: &[u8],
    ) {
        let padp = PadpDatagram::data(first, last, size_or_offset, payload);
        let mut padp_buf = [0u8; 600];
        let padp_len = padp.encode(&mut padp_buf).unwrap();
        let slp = SlpDatagram::new(3, 3, SlpType::Padp, xid, &padp_buf[..padp_len]).unwrap();
        let mut slp_buf = [0u8; 700];
        let slp_len = slp.encode(&mut slp_buf).unwrap();
        transport.write(&slp_buf[..slp_len]).unwrap();
    }

    #[test]
    fn reassembles_two_fragment_message() {
        let mut transport: LoopbackTransport<4096> = LoopbackTransport::new();
        push_fragment(&mut transport, 1, true, false, 13, b"hello, ");
        push_fragment(&mut transport, 1, false, true, 7, b"world!");

        let mut receiver: PadpReceiver<1024, 64> = PadpReceiver::new();
        assert_eq!(receiver.poll(&mut transport).unwrap(), ReceiveEvent::Pending);
        assert_eq!(receiver.poll(&mut transport).unwrap(), ReceiveEvent::MessageReady);
        assert_eq!(receiver.take_message().unwrap(), b"hello, world!");
    }

    #[test]
    fn reacks_duplicate_fragment_without_error() {
        let mut transport: LoopbackTransport<4096> = LoopbackTransport::new();
        push_fragment(&mut transport, 1, true, true, 5, b"hello");
        push_fragment(&mut transport, 1, true, true, 5, b"hello");

        let mut receiver: PadpReceiver<1024, 64> = PadpReceiver::new();
        assert_eq!(receiver.poll(&mut transport).unwrap(), ReceiveEvent::MessageReady);
        assert_eq!(receiver.take_message().unwrap(), b"hello");
        assert_eq!(receiver.poll(&mut transport).unwrap(), ReceiveEvent::Pending);
    }
}
