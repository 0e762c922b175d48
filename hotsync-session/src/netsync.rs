//! Async driver for the NetSync transport: the three-step magic-byte
//! handshake and frame read/write, built directly on [`tokio::io`] since
//! NetSync (unlike SLP/PADP) needs no retry or reassembly layer underneath
//! it — framing is the entire contract, so there's nothing for the
//! synchronous wire-layer `Transport` abstraction to add here.

use hotsync_wire::core::{handshake, NetSyncFrame, HEADER_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, SessionError};

/// Runs the host side of the three-step NetSync handshake: read the
/// device's opening request, reply, read its second request, reply again,
/// then read its fixed third request with no reply.
pub async fn perform_handshake<S>(stream: &mut S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut req1 = [0u8; handshake::REQUEST_1_LEN];
    stream.read_exact(&mut req1).await?;
    if !handshake::validate_request_1(&req1) {
        return Err(SessionError::Handshake("unexpected opening request"));
    }
    stream.write_all(&handshake::build_response_1()).await?;

    let mut req2 = [0u8; handshake::REQUEST_2_LEN];
    stream.read_exact(&mut req2).await?;
    if !handshake::validate_request_2(&req2) {
        return Err(SessionError::Handshake("unexpected second request"));
    }
    stream.write_all(&handshake::build_response_2()).await?;

    let mut req3 = [0u8; handshake::REQUEST_3.len()];
    stream.read_exact(&mut req3).await?;
    if !handshake::validate_request_3(&req3) {
        return Err(SessionError::Handshake("unexpected closing request"));
    }

    Ok(())
}

/// Reads one NetSync frame, returning its transaction id and payload.
pub async fn read_frame<S>(stream: &mut S) -> Result<(u8, Vec<u8>)>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    stream.read_exact(&mut header).await?;
    let payload_len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;

    let mut framed = vec![0u8; HEADER_SIZE + payload_len];
    framed[..HEADER_SIZE].copy_from_slice(&header);
    stream.read_exact(&mut framed[HEADER_SIZE..]).await?;

    let (frame, _) = NetSyncFrame::decode(&framed)?;
    Ok((frame.xid, frame.payload.to_vec()))
}

/// Writes one NetSync frame.
pub async fn write_frame<S>(stream: &mut S, xid: u8, payload: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let frame = NetSyncFrame::new(xid, payload)?;
    let mut buf = vec![0u8; frame.wire_size()];
    frame.encode(&mut buf)?;
    stream.write_all(&buf).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn handshake_completes_over_a_duplex_pipe() {
        let (mut host, mut device) = duplex(256);

        let device_side = tokio::spawn(async move {
            let mut req1 = [0u8; handshake::REQUEST_1_LEN];
            req1[0] = 0x90;
            req1[1] = 0x01;
            device.write_all(&req1).await.unwrap();
            let mut resp1 = [0u8; handshake::RESPONSE_1_LEN];
            device.read_exact(&mut resp1).await.unwrap();
            assert_eq!(&resp1[0..2], &[0x12, 0x01]);

            let mut req2 = [0u8; handshake::REQUEST_2_LEN];
            req2[0] = 0x92;
            req2[1] = 0x01;
            device.write_all(&req2).await.unwrap();
            let mut resp2 = [0u8; handshake::RESPONSE_2_LEN];
            device.read_exact(&mut resp2).await.unwrap();
            assert_eq!(&resp2[0..2], &[0x13, 0x01]);

            device.write_all(&handshake::REQUEST_3).await.unwrap();
        });

        perform_handshake(&mut host).await.unwrap();
        device_side.await.unwrap();
    }

    #[tokio::test]
    async fn frame_round_trips_over_a_duplex_pipe() {
        let (mut a, mut b) = duplex(256);
        write_frame(&mut a, 7, b"hello").await.unwrap();
        let (xid, payload) = read_frame(&mut b).await.unwrap();
        assert_eq!(xid, 7);
        assert_eq!(payload, b"hello");
    }
}
