//! Drives one DLP request/response exchange over a PADP channel.
//!
//! DLP itself has no framing of its own — a request or response is just a
//! PADP message, reassembled by the time it reaches this module. The
//! client's only job is to pick the HotSync socket id, hand the encoded
//! request to [`PadpSender`], and pull messages out of [`PadpReceiver`]
//! until one arrives.

use hotsync_wire::channel::{PadpReceiver, PadpSender, ReceiveEvent};
use hotsync_wire::config::Config;
use hotsync_wire::transport::Transport;
use hotsync_wire::Error as WireError;

use crate::error::Result;
use crate::message::encode_request;

/// The well-known SLP socket both ends of a HotSync link use for DLP
/// traffic (the loopback socket reserved by the protocol for the desktop
/// link).
pub const DLP_SOCKET: u8 = 3;

/// Synchronous DLP request/response driver over an abstract [`Transport`].
///
/// `R` sizes the internal SLP read buffer; `N` bounds the largest
/// reassembled DLP message this client can receive.
pub struct DlpClient<const R: usize, const N: usize> {
    sender: PadpSender<R>,
    receiver: PadpReceiver<R, N>,
}

impl<const R: usize, const N: usize> DlpClient<R, N> {
    pub fn new(config: Config) -> Self {
        Self { sender: PadpSender::new(config), receiver: PadpReceiver::new() }
    }

    /// Encodes `func_id` with `arg_groups`, sends it, and blocks until the
    /// matching response message is fully reassembled or `timeout_ms`
    /// elapses with no progress. Returns the raw response bytes; callers
    /// decode them with [`crate::message::decode_response`] to check the
    /// function id and error code.
    pub fn call<T: Transport>(
        &mut self,
        transport: &mut T,
        func_id: u8,
        arg_groups: &[(u8, &[u8])],
        timeout_ms: u64,
        mut now_ms: impl FnMut() -> u64,
    ) -> Result<Vec<u8>> {
        let request = encode_request(func_id, arg_groups)?;
        self.sender.send_message(transport, DLP_SOCKET, DLP_SOCKET, &request, &mut now_ms)?;

        // A response fragment can legitimately arrive before our own last
        // fragment's ACK does; the sender treats that as an implicit ACK
        // and stashes the raw frame here instead of dropping it.
        if let Some((frame, len)) = self.sender.take_implicit_data() {
            if self.receiver.ingest(transport, &frame[..len])? == ReceiveEvent::MessageReady {
                let message = self.receiver.take_message().expect("ingest reported a ready message");
                return Ok(message.to_vec());
            }
        }

        let deadline = now_ms().saturating_add(timeout_ms);
        loop {
            match self.receiver.poll(transport)? {
                ReceiveEvent::MessageReady => {
                    let message = self.receiver.take_message().expect("poll reported a ready message");
                    return Ok(message.to_vec());
                }
                ReceiveEvent::Pending | ReceiveEvent::Ignored => {
                    if now_ms() >= deadline {
                        return Err(WireError::RetryExhausted.into());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{decode_response, encode_response};
    use hotsync_wire::core::{PadpDatagram, SlpDatagram, SlpType};
    use hotsync_wire::transport::LoopbackTransport;

    #[test]
    fn call_round_trips_a_request_and_response() {
        let mut transport: LoopbackTransport<4096> = LoopbackTransport::new();
        let mut client: DlpClient<1024, 2048> = DlpClient::new(Config::default());

        let mut clock = 0u64;
        // A real peer would decode the request and reply; here we just
        // assert the client can drive the exchange against a canned
        // response seeded directly into the loopback's read side.
        let response = encode_response(0x12, crate::error::DlpErrorCode::None, &[(0x20, b"ok")]).unwrap();
        let padp = PadpDatagram::data(true, true, response.len() as u32, &response);
        let mut padp_buf = [0u8; 256];
        let padp_len = padp.encode(&mut padp_buf).unwrap();
        let slp = SlpDatagram::new(DLP_SOCKET, DLP_SOCKET, SlpType::Padp, 1, &padp_buf[..padp_len]).unwrap();
        let mut slp_buf = [0u8; 300];
        let slp_len = slp.encode(&mut slp_buf).unwrap();
        transport.write(&slp_buf[..slp_len]).unwrap();

        let raw = client
            .call(&mut transport, 0x12, &[], 1000, || {
                clock += 1;
                clock
            })
            .unwrap();
        let decoded = decode_response(&raw, 0x12, crate::args::ArgSchema::fixed(1)).unwrap();
        assert_eq!(decoded.args[0].data, b"ok");
    }
}
