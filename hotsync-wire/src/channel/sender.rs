//! PADP stop-and-wait send path.
//!
//! A message is split into fragments of at most `config.max_fragment_size`
//! bytes. A single transaction id is allocated per message and reused for
//! every fragment; each fragment is transmitted and the sender waits for a
//! matching ACK before sending the next one, retransmitting the same
//! fragment on timeout up to the configured attempt budget.

use crate::buffer::PendingFragment;
use crate::config::{self, Config};
use crate::core::{PadpDatagram, PadpType, SlpDatagram, SlpType};
use crate::error::{Error, Result};
use crate::reliable::{RetransmitStats, RetryOutcome, RetryPolicy};
use crate::transport::Transport;

use super::reader::SlpReader;

/// Size of the scratch buffer used to encode one fragment plus its SLP
/// wrapper. Large enough for the default 512-byte fragment cap.
pub const FRAGMENT_SCRATCH_SIZE: usize = 600;

/// Drives a single message through PADP's stop-and-wait send path over an
/// abstract byte [`Transport`].
///
/// `R` sizes the internal read buffer used while scanning for ACKs.
pub struct PadpSender<const R: usize> {
    config: Config,
    retry: RetryPolicy,
    next_xid: u8,
    reader: SlpReader<R>,
    pending: PendingFragment<FRAGMENT_SCRATCH_SIZE>,
    stats: RetransmitStats,
    /// A DATA fragment that arrived carrying our own outstanding xid while
    /// we were waiting for an ACK. Treated as an implicit ACK of that
    /// fragment, but the DATA itself still needs to reach the receive
    /// path, so it's stashed here for the caller to hand to its
    /// [`super::receiver::PadpReceiver`] instead of being dropped.
    implicit_data: Option<([u8; FRAGMENT_SCRATCH_SIZE], usize)>,
}

impl<const R: usize> PadpSender<R> {
    pub fn new(config: Config) -> Self {
        Self {
            retry: RetryPolicy::new(config.ack_timeout_ms, config.max_retransmit),
            config,
            next_xid: config::XID_RANGE_START,
            reader: SlpReader::new(),
            pending: PendingFragment::new(),
            stats: RetransmitStats::new(),
            implicit_data: None,
        }
    }

    pub const fn stats(&self) -> &RetransmitStats {
        &self.stats
    }

    /// Takes the raw SLP frame of a DATA fragment that arrived as an
    /// implicit ACK during the last [`Self::send_message`] call, if any.
    /// The caller should feed these bytes to its receive path exactly as
    /// if they'd arrived outside the send wait loop.
    pub fn take_implicit_data(&mut self) -> Option<([u8; FRAGMENT_SCRATCH_SIZE], usize)> {
        self.implicit_data.take()
    }

    fn allocate_xid(&mut self) -> u8 {
        let xid = self.next_xid;
        self.next_xid = if self.next_xid >= config::XID_RANGE_END {
            config::XID_RANGE_START
        } else {
            self.next_xid + 1
        };
        xid
    }

    /// Sends `payload` as a complete PADP message to `(dest_sock, src_sock)`
    /// over `transport`, blocking (via repeated polling of `now_ms`) until
    /// every fragment is acknowledged or the retry budget is exhausted.
    pub fn send_message<T: Transport>(
        &mut self,
        transport: &mut T,
        dest_sock: u8,
        src_sock: u8,
        payload: &[u8],
        mut now_ms: impl FnMut() -> u64,
    ) -> Result<()> {
        if payload.len() > config::MAX_MESSAGE_SIZE {
            return Err(Error::ValueTooLarge);
        }

        let xid = self.allocate_xid();
        let frag_size = self.config.max_fragment_size;
        let total = payload.len();
        let mut offset = 0usize;

        loop {
            let end = (offset + frag_size).min(total);
            let first = offset == 0;
            let last = end == total;
            let size_or_offset = if first { total as u32 } else { offset as u32 };

            self.send_fragment_until_acked(
                transport,
                dest_sock,
                src_sock,
                xid,
                first,
                last,
                size_or_offset,
                &payload[offset..end],
                &mut now_ms,
            )?;

            offset = end;
            if last {
                return Ok(());
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn send_fragment_until_acked<T: Transport>(
        &mut self,
        transport: &mut T,
        dest_sock: u8,
        src_sock: u8,
        xid: u8,
        first: bool,
        last: bool,
        size_or_offset: u32,
        fragment: &[u8],
        now_ms: &mut impl FnMut() -> u64,
    ) -> Result<()> {
        let mut padp_buf = [0u8; FRAGMENT_SCRATCH_SIZE];
        let padp_len = PadpDatagram::data(first, last, size_or_offset, fragment).encode(&mut padp_buf)?;

        let slp = SlpDatagram::new(dest_sock, src_sock, SlpType::Padp, xid, &padp_buf[..padp_len])?;
        let mut slp_buf = [0u8; FRAGMENT_SCRATCH_SIZE];
        let slp_len = slp.encode(&mut slp_buf)?;

        let mut sent_at = now_ms();
        transport.write_all(&slp_buf[..slp_len])?;
        self.stats.fragments_sent += 1;
        self.pending.set(&slp_buf[..slp_len], xid, size_or_offset, sent_at);

        loop {
            self.reader.pull(transport)?;

            let mut scratch = [0u8; FRAGMENT_SCRATCH_SIZE];
            while let Some(len) = self.reader.try_extract(&mut scratch)? {
                let (datagram, _) = SlpDatagram::decode(&scratch[..len])?;
                if datagram.kind != SlpType::Padp {
                    continue;
                }
                let padp = PadpDatagram::decode(datagram.payload)?;
                if padp.kind == PadpType::Ack && self.pending.matches_ack(datagram.xid, padp.size_or_offset) {
                    self.pending.clear();
                    self.stats.successful_deliveries += 1;
                    return Ok(());
                }
                if padp.kind == PadpType::Data && self.pending.is_outstanding() && datagram.xid == self.pending.xid() {
                    self.implicit_data = Some((scratch, len));
                    self.pending.clear();
                    self.stats.successful_deliveries += 1;
                    return Ok(());
                }
            }

            let now = now_ms();
            match self.retry.evaluate(sent_at, self.pending.attempts(), now) {
                RetryOutcome::StillWaiting => continue,
                RetryOutcome::Retransmit => {
                    transport.write_all(self.pending.bytes())?;
                    sent_at = now;
                    self.pending.record_retransmit(now);
                    self.stats.retransmissions += 1;
                }
                RetryOutcome::Exhausted => {
                    self.pending.clear();
                    self.stats.failed_fragments += 1;
                    return Err(Error::RetryExhausted);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;

    #[test]
    fn delivers_single_fragment_message() {
        let config = Config::default();
        let mut sender: PadpSender<1024> = PadpSender::new(config);
        let mut transport: LoopbackTransport<4096> = LoopbackTransport::new();

        // Pre-seed the loopback's read side with the ACK the peer would
        // reply with, so the first poll finds it immediately.
        let ack = PadpDatagram::ack(5);
        let mut ack_buf = [0u8; 32];
        let ack_len = ack.encode(&mut ack_buf).unwrap();
        let slp_ack = SlpDatagram::new(3, 3, SlpType::Padp, config::XID_RANGE_START, &ack_buf[..ack_len]).unwrap();
        let mut slp_buf = [0u8; 64];
        let slp_len = slp_ack.encode(&mut slp_buf).unwrap();
        transport.write(&slp_buf[..slp_len]).unwrap();

        let mut clock = 0u64;
        let result = sender.send_message(&mut transport, 3, 3, b"hello", || {
            clock += 1;
            clock
        });
        assert!(result.is_ok());
        assert_eq!(sender.stats().successful_deliveries, 1);
    }

    #[test]
    fn retransmits_until_exhausted_when_unacked() {
        let config = Config::default().with_ack_timeout_ms(10).with_max_retransmit(2);
        let mut sender: PadpSender<1024> = PadpSender::new(config);
        let mut transport: LoopbackTransport<4096> = LoopbackTransport::new();

        let mut clock = 0u64;
        let result = sender.send_message(&mut transport, 3, 3, b"hello", || {
            clock += 20;
            clock
        });
        assert_eq!(result, Err(Error::RetryExhausted));
        assert_eq!(sender.stats().failed_fragments, 1);
    }
}
