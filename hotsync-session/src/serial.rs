//! Bridges an async serial stream into the wire layer's synchronous
//! [`hotsync_wire::transport::Transport`], for devices that speak
//! SLP/PADP/CMP rather than bare NetSync (see [`crate::usb::ProtocolStack`]).
//!
//! The wire layer's framing is written as a blocking, poll-driven state
//! machine (it's meant to run on embedded targets with no executor at
//! all), so rather than reworking it to be async, a serial session runs
//! on a blocking task via [`tokio::task::spawn_blocking`], with
//! [`tokio_util::io::SyncIoBridge`] turning the async stream into a
//! `std::io::Read + Write` the blocking task can drive synchronously.

use std::time::Instant;

use hotsync_dlp::catalog::{DlpFunction, SysInfo, UserInfo};
use hotsync_dlp::client::DlpClient;
use hotsync_dlp::message::decode_response;
use hotsync_wire::config::Config;
use hotsync_wire::protocol::CmpHandshake;
use hotsync_wire::transport::StdTransport;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::io::SyncIoBridge;

use crate::error::{Result, SessionError};
use crate::orchestrator::{EndStatus, SessionInfo};

/// A synchronous [`hotsync_wire::transport::Transport`] backed by an async
/// stream, usable only from inside a blocking context (e.g.
/// `spawn_blocking`) since [`SyncIoBridge`] blocks the calling thread on
/// I/O.
pub type BridgedTransport<S> = StdTransport<SyncIoBridge<S>>;

/// Wraps an async serial stream so it can be driven synchronously from a
/// blocking task. Must be called from within a Tokio runtime context (the
/// usual case: construct it on the async side, then move the result into
/// [`tokio::task::spawn_blocking`] — `SyncIoBridge` captures the current
/// runtime handle to keep driving the stream's I/O while the blocking task
/// waits on it).
pub fn bridge<S>(stream: S) -> BridgedTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    StdTransport::new(SyncIoBridge::new(stream))
}

/// Read/reassembly buffer sizes for a serial DLP client. Serial links run
/// far slower than NetSync-over-TCP but still carry one DLP message at a
/// time, so these match the sizes already exercised in `hotsync-dlp`'s own
/// tests rather than anything tied to a particular device.
type SerialDlpClient = DlpClient<1024, 4096>;

const DLP_CALL_TIMEOUT_MS: u64 = 10_000;

/// Runs one complete HotSync session over a serial/USB stream speaking
/// SLP/PADP/CMP: the CMP handshake, `ReadSysInfo`/`ReadUserInfo`, the
/// caller's blocking sync logic, then `EndOfSync`. The async counterpart
/// for NetSync-over-TCP is [`crate::orchestrator::run_session`]; this
/// version runs entirely on a blocking task since the wire layer
/// underneath is a synchronous state machine, not an async one.
pub async fn run_serial_session<S, F>(stream: S, host_max_baud: u32, sync_fn: F) -> Result<SessionInfo>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    F: FnOnce(&SessionInfo, &mut SerialDlpClient, &mut BridgedTransport<S>) -> Result<EndStatus> + Send + 'static,
{
    let mut transport = bridge(stream);

    tokio::task::spawn_blocking(move || -> Result<SessionInfo> {
        let mut handshake: CmpHandshake<1024> = CmpHandshake::new(host_max_baud);
        while !handshake.poll(&mut transport)? {}

        let started = Instant::now();
        let now_ms = || started.elapsed().as_millis() as u64;

        let mut client = SerialDlpClient::new(Config::default());

        let sys_info_raw = client.call(&mut transport, DlpFunction::ReadSysInfo.id(), &[], DLP_CALL_TIMEOUT_MS, now_ms)?;
        let sys_info =
            SysInfo::decode(decode_response(&sys_info_raw, DlpFunction::ReadSysInfo.id(), DlpFunction::ReadSysInfo.response_schema())?.args[0].data)?;

        let user_info_raw = client.call(&mut transport, DlpFunction::ReadUserInfo.id(), &[], DLP_CALL_TIMEOUT_MS, now_ms)?;
        let user_info = UserInfo::decode(
            decode_response(&user_info_raw, DlpFunction::ReadUserInfo.id(), DlpFunction::ReadUserInfo.response_schema())?.args[0].data,
        )?;

        let info = SessionInfo { sys_info, user_info };

        let status = sync_fn(&info, &mut client, &mut transport)?;

        client.call(
            &mut transport,
            DlpFunction::EndOfSync.id(),
            &[(0x20, &[status as u8])],
            DLP_CALL_TIMEOUT_MS,
            now_ms,
        )?;

        Ok(info)
    })
    .await
    .map_err(|e| SessionError::Storage(format!("serial session task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotsync_dlp::datetime::PalmDateTime;
    use hotsync_dlp::error::DlpErrorCode;
    use hotsync_dlp::message::{decode_request, encode_response};
    use hotsync_wire::config::CMP_XID;
    use hotsync_wire::core::{CmpDatagram, CmpType, PadpDatagram, SlpDatagram, SlpType};
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    const SLP_HEADER_SIZE: usize = 10;
    const SLP_CRC_SIZE: usize = 2;

    async fn read_slp_frame<S: AsyncRead + Unpin>(stream: &mut S) -> Vec<u8> {
        let mut header = [0u8; SLP_HEADER_SIZE];
        stream.read_exact(&mut header).await.unwrap();
        let payload_len = u16::from_be_bytes([header[6], header[7]]) as usize;
        let mut frame = vec![0u8; SLP_HEADER_SIZE + payload_len + SLP_CRC_SIZE];
        frame[..SLP_HEADER_SIZE].copy_from_slice(&header);
        stream.read_exact(&mut frame[SLP_HEADER_SIZE..]).await.unwrap();
        frame
    }

    async fn write_padp<S: AsyncWrite + Unpin>(stream: &mut S, xid: u8, padp: PadpDatagram<'_>) {
        let mut padp_buf = [0u8; 1100];
        let padp_len = padp.encode(&mut padp_buf).unwrap();
        let slp = SlpDatagram::new(3, 3, SlpType::Padp, xid, &padp_buf[..padp_len]).unwrap();
        let mut slp_buf = [0u8; 1200];
        let slp_len = slp.encode(&mut slp_buf).unwrap();
        stream.write_all(&slp_buf[..slp_len]).await.unwrap();
    }

    /// Reads one DLP request frame and replies with `response` at the same
    /// transaction id, which is enough for the sender's implicit-ACK rule
    /// to accept it without a separate PADP ACK round.
    async fn answer_dlp_call<S: AsyncRead + AsyncWrite + Unpin>(device: &mut S, expected_func: u8, response: &[u8]) {
        let frame = read_slp_frame(device).await;
        let (datagram, _) = SlpDatagram::decode(&frame).unwrap();
        let padp = PadpDatagram::decode(datagram.payload).unwrap();
        let schema = DlpFunction::from_u8(expected_func).unwrap().request_schema();
        let request = decode_request(padp.payload, schema).unwrap();
        assert_eq!(request.func_id, expected_func);

        let data = PadpDatagram::data(true, true, response.len() as u32, response);
        write_padp(device, datagram.xid, data).await;
    }

    #[tokio::test]
    async fn full_serial_session_reaches_end_of_sync() {
        let (host, mut device) = duplex(8192);

        let device_task = tokio::spawn(async move {
            let wakeup = CmpDatagram {
                kind: CmpType::Wakeup,
                change_baud: false,
                long_form_padp_supported: true,
                major_ver: 1,
                minor_ver: 0,
                baud_rate: 57600,
            };
            let mut cmp_buf = [0u8; 16];
            let cmp_len = wakeup.encode(&mut cmp_buf).unwrap();
            write_padp(&mut device, CMP_XID, PadpDatagram::data(true, true, cmp_len as u32, &cmp_buf[..cmp_len])).await;

            let init_frame = read_slp_frame(&mut device).await;
            let (init_datagram, _) = SlpDatagram::decode(&init_frame).unwrap();
            let init_padp = PadpDatagram::decode(init_datagram.payload).unwrap();
            let init = CmpDatagram::decode(init_padp.payload).unwrap();
            assert_eq!(init.kind, CmpType::Init);

            write_padp(&mut device, CMP_XID, PadpDatagram::ack(0)).await;

            let sys_info = SysInfo { rom_version: 0x04000000, locale: 0, product_id: 0x0002 };
            let response = encode_response(DlpFunction::ReadSysInfo.id(), DlpErrorCode::None, &[(0x20, &sys_info.encode())]).unwrap();
            answer_dlp_call(&mut device, DlpFunction::ReadSysInfo.id(), &response).await;

            let user_info = UserInfo {
                user_id: 9,
                last_sync_pc_id: 1,
                last_sync_time: PalmDateTime::UNSET,
                user_name: "mcclane".to_string(),
            };
            let response = encode_response(DlpFunction::ReadUserInfo.id(), DlpErrorCode::None, &[(0x20, &user_info.encode())]).unwrap();
            answer_dlp_call(&mut device, DlpFunction::ReadUserInfo.id(), &response).await;

            let response = encode_response(DlpFunction::EndOfSync.id(), DlpErrorCode::None, &[]).unwrap();
            answer_dlp_call(&mut device, DlpFunction::EndOfSync.id(), &response).await;
        });

        let info = run_serial_session(host, 115200, |info, _client, _transport| {
            assert_eq!(info.user_info.user_name, "mcclane");
            Ok(EndStatus::Ok)
        })
        .await
        .unwrap();

        assert_eq!(info.sys_info.product_id, 0x0002);
        device_task.await.unwrap();
    }
}
