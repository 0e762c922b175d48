//! CMP handshake state machine.
//!
//! Runs once at the start of a serial HotSync session, before any DLP
//! traffic: the device sends WAKEUP, the host replies with INIT carrying
//! the negotiated baud rate, and the device ACKs it. Both CMP datagrams
//! ride inside an ordinary PADP DATA fragment at the reserved
//! [`config::CMP_XID`] transaction id; the ACK is a plain PADP ACK of that
//! fragment, not a third CMP message type.

use crate::config::{self, Config};
use crate::core::{negotiate_baud, CmpDatagram, CmpType};
use crate::core::{PadpDatagram, PadpType, SlpDatagram, SlpType};
use crate::error::{Error, Result};
use crate::transport::Transport;

use crate::channel::SlpReader;

/// State of the CMP handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Waiting for the device's WAKEUP.
    AwaitingWakeup,
    /// INIT sent, waiting for the device to ACK it.
    AwaitingAck,
    /// Handshake complete; the link may now switch to the negotiated baud.
    Established,
    /// Either side aborted the handshake.
    Aborted,
}

/// Counts of handshake events, for diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandshakeStats {
    pub wakeups_received: u32,
    pub inits_sent: u32,
    pub acks_received: u32,
}

/// Drives the CMP handshake to completion over a raw [`Transport`].
///
/// `R` sizes the internal read buffer used while scanning for SLP
/// datagrams (see [`SlpReader`]).
pub struct CmpHandshake<const R: usize> {
    reader: SlpReader<R>,
    state: HandshakeState,
    host_max_baud: u32,
    negotiated_baud: Option<u32>,
    peer_dest_sock: u8,
    peer_src_sock: u8,
    stats: HandshakeStats,
}

impl<const R: usize> CmpHandshake<R> {
    /// Creates a new handshake driver. `host_max_baud` is the fastest rate
    /// this host is willing to negotiate up to.
    pub fn new(host_max_baud: u32) -> Self {
        Self {
            reader: SlpReader::new(),
            state: HandshakeState::AwaitingWakeup,
            host_max_baud,
            negotiated_baud: None,
            peer_dest_sock: 0,
            peer_src_sock: 0,
            stats: HandshakeStats::default(),
        }
    }

    /// Creates a handshake driver using the baud ceiling implied by
    /// `config` (HotSync itself negotiates baud independently of the PADP
    /// tunables, but sharing one `Config` keeps callers from juggling two
    /// objects).
    pub fn from_config(config: &Config, host_max_baud: u32) -> Self {
        let _ = config;
        Self::new(host_max_baud)
    }

    pub const fn state(&self) -> HandshakeState {
        self.state
    }

    pub const fn is_established(&self) -> bool {
        matches!(self.state, HandshakeState::Established)
    }

    /// The baud rate the link should switch to, once [`Self::is_established`].
    pub const fn negotiated_baud(&self) -> Option<u32> {
        self.negotiated_baud
    }

    pub const fn stats(&self) -> &HandshakeStats {
        &self.stats
    }

    /// Pulls bytes from `transport` and advances the handshake by at most
    /// one step. Returns `true` once [`HandshakeState::Established`] is
    /// reached.
    pub fn poll<T: Transport>(&mut self, transport: &mut T) -> Result<bool> {
        if matches!(self.state, HandshakeState::Established | HandshakeState::Aborted) {
            return Ok(self.is_established());
        }

        self.reader.pull(transport)?;

        let mut scratch = [0u8; 64];
        let Some(len) = self.reader.try_extract(&mut scratch)? else {
            return Ok(false);
        };

        let (datagram, _) = SlpDatagram::decode(&scratch[..len])?;
        if datagram.kind != SlpType::Padp || datagram.xid != config::CMP_XID {
            // Not CMP traffic; ignore and keep waiting.
            return Ok(false);
        }
        self.peer_dest_sock = datagram.src_sock;
        self.peer_src_sock = datagram.dest_sock;

        let padp = PadpDatagram::decode(datagram.payload)?;
        match (self.state, padp.kind) {
            (HandshakeState::AwaitingWakeup, PadpType::Data) => {
                let wakeup = CmpDatagram::decode(padp.payload)?;
                if wakeup.kind != CmpType::Wakeup {
                    return Err(Error::MalformedFrame);
                }
                self.stats.wakeups_received += 1;

                let negotiated = negotiate_baud(wakeup.baud_rate, self.host_max_baud);
                self.negotiated_baud = Some(negotiated);
                self.send_init(transport, negotiated)?;
                self.state = HandshakeState::AwaitingAck;
                Ok(false)
            }
            (HandshakeState::AwaitingAck, PadpType::Ack) => {
                self.stats.acks_received += 1;
                self.state = HandshakeState::Established;
                Ok(true)
            }
            (HandshakeState::AwaitingAck, PadpType::Data) => {
                // Device never saw our INIT reply; resend it.
                let wakeup = CmpDatagram::decode(padp.payload)?;
                if wakeup.kind == CmpType::Wakeup {
                    let baud = self.negotiated_baud.unwrap_or(self.host_max_baud);
                    self.send_init(transport, baud)?;
                }
                Ok(false)
            }
            (_, PadpType::Abort) => {
                self.state = HandshakeState::Aborted;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn send_init<T: Transport>(&mut self, transport: &mut T, negotiated_baud: u32) -> Result<()> {
        let init = CmpDatagram::init_reply(negotiated_baud);
        let mut cmp_buf = [0u8; 16];
        let cmp_len = init.encode(&mut cmp_buf)?;

        let padp = PadpDatagram::data(true, true, cmp_len as u32, &cmp_buf[..cmp_len]);
        let mut padp_buf = [0u8; 32];
        let padp_len = padp.encode(&mut padp_buf)?;

        let slp = SlpDatagram::new(
            self.peer_dest_sock,
            self.peer_src_sock,
            SlpType::Padp,
            config::CMP_XID,
            &padp_buf[..padp_len],
        )?;
        let mut slp_buf = [0u8; 64];
        let slp_len = slp.encode(&mut slp_buf)?;
        transport.write_all(&slp_buf[..slp_len])?;
        self.stats.inits_sent += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;

    #[test]
    fn wakeup_then_ack_reaches_established() {
        let mut transport: LoopbackTransport<512> = LoopbackTransport::new();
        let mut handshake: CmpHandshake<512> = CmpHandshake::new(115200);

        let wakeup = CmpDatagram { kind: CmpType::Wakeup, change_baud: false, long_form_padp_supported: true, major_ver: 1, minor_ver: 0, baud_rate: 57600 };
        let mut cmp_buf = [0u8; 16];
        let cmp_len = wakeup.encode(&mut cmp_buf).unwrap();
        let padp = PadpDatagram::data(true, true, cmp_len as u32, &cmp_buf[..cmp_len]);
        let mut padp_buf = [0u8; 32];
        let padp_len = padp.encode(&mut padp_buf).unwrap();
        let slp = SlpDatagram::new(3, 4, SlpType::Padp, config::CMP_XID, &padp_buf[..padp_len]).unwrap();
        let mut slp_buf = [0u8; 64];
        let slp_len = slp.encode(&mut slp_buf).unwrap();
        transport.write(&slp_buf[..slp_len]).unwrap();

        assert!(!handshake.poll(&mut transport).unwrap());
        assert_eq!(handshake.state(), HandshakeState::AwaitingAck);
        assert_eq!(handshake.negotiated_baud(), Some(57600));

        let ack = PadpDatagram::ack(10);
        let mut ack_buf = [0u8; 16];
        let ack_len = ack.encode(&mut ack_buf).unwrap();
        let slp_ack = SlpDatagram::new(3, 4, SlpType::Padp, config::CMP_XID, &ack_buf[..ack_len]).unwrap();
        let mut slp_buf2 = [0u8; 32];
        let slp_len2 = slp_ack.encode(&mut slp_buf2).unwrap();
        transport.write(&slp_buf2[..slp_len2]).unwrap();

        assert!(handshake.poll(&mut transport).unwrap());
        assert!(handshake.is_established());
    }
}
