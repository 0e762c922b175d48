//! End-to-end: handshake + ReadSysInfo/ReadUserInfo + caller sync logic +
//! EndOfSync, driven against a fake device on the other end of an
//! in-memory duplex pipe instead of a real NetSync socket.

use hotsync_dlp::catalog::{DlpFunction, SysInfo, UserInfo};
use hotsync_dlp::datetime::PalmDateTime;
use hotsync_dlp::error::DlpErrorCode;
use hotsync_dlp::message::{decode_request, encode_response};
use hotsync_session::orchestrator::{run_session, EndStatus};
use hotsync_wire::core::{handshake, NetSyncFrame};
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

async fn read_netsync_frame<S: tokio::io::AsyncRead + Unpin>(stream: &mut S) -> (u8, Vec<u8>) {
    let mut header = [0u8; 6];
    stream.read_exact(&mut header).await.unwrap();
    let payload_len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;
    let mut framed = vec![0u8; 6 + payload_len];
    framed[..6].copy_from_slice(&header);
    stream.read_exact(&mut framed[6..]).await.unwrap();
    let (frame, _) = NetSyncFrame::decode(&framed).unwrap();
    (frame.xid, frame.payload.to_vec())
}

async fn write_netsync_frame<S: tokio::io::AsyncWrite + Unpin>(stream: &mut S, xid: u8, payload: &[u8]) {
    let frame = NetSyncFrame::new(xid, payload).unwrap();
    let mut buf = vec![0u8; frame.wire_size()];
    frame.encode(&mut buf).unwrap();
    stream.write_all(&buf).await.unwrap();
}

#[tokio::test]
async fn full_session_reaches_end_of_sync() {
    let (mut host, mut device) = duplex(4096);

    let device_task = tokio::spawn(async move {
        // Step 1 of the handshake.
        let mut req1 = [0u8; handshake::REQUEST_1_LEN];
        req1[0] = 0x90;
        req1[1] = 0x01;
        device.write_all(&req1).await.unwrap();
        let mut resp1 = [0u8; handshake::RESPONSE_1_LEN];
        device.read_exact(&mut resp1).await.unwrap();

        let mut req2 = [0u8; handshake::REQUEST_2_LEN];
        req2[0] = 0x92;
        req2[1] = 0x01;
        device.write_all(&req2).await.unwrap();
        let mut resp2 = [0u8; handshake::RESPONSE_2_LEN];
        device.read_exact(&mut resp2).await.unwrap();

        device.write_all(&handshake::REQUEST_3).await.unwrap();

        // ReadSysInfo
        let (xid, req) = read_netsync_frame(&mut device).await;
        let parsed = decode_request(&req, DlpFunction::ReadSysInfo.request_schema()).unwrap();
        assert_eq!(parsed.func_id, DlpFunction::ReadSysInfo.id());
        let sys_info = SysInfo { rom_version: 0x04000000, locale: 0, product_id: 0x0001 };
        let response = encode_response(DlpFunction::ReadSysInfo.id(), DlpErrorCode::None, &[(0x20, &sys_info.encode())]).unwrap();
        write_netsync_frame(&mut device, xid, &response).await;

        // ReadUserInfo
        let (xid, req) = read_netsync_frame(&mut device).await;
        let parsed = decode_request(&req, DlpFunction::ReadUserInfo.request_schema()).unwrap();
        assert_eq!(parsed.func_id, DlpFunction::ReadUserInfo.id());
        let user_info = UserInfo {
            user_id: 7,
            last_sync_pc_id: 1,
            last_sync_time: PalmDateTime::UNSET,
            user_name: "ripley".to_string(),
        };
        let encoded = user_info.encode();
        let response = encode_response(DlpFunction::ReadUserInfo.id(), DlpErrorCode::None, &[(0x20, &encoded)]).unwrap();
        write_netsync_frame(&mut device, xid, &response).await;

        // EndOfSync
        let (xid, req) = read_netsync_frame(&mut device).await;
        let parsed = decode_request(&req, DlpFunction::EndOfSync.request_schema()).unwrap();
        assert_eq!(parsed.func_id, DlpFunction::EndOfSync.id());
        assert_eq!(parsed.args[0].data, &[0]);
        let response = encode_response(DlpFunction::EndOfSync.id(), DlpErrorCode::None, &[]).unwrap();
        write_netsync_frame(&mut device, xid, &response).await;
    });

    let info = run_session(&mut host, |info, _client| async move {
        assert_eq!(info.user_info.user_name, "ripley");
        Ok(EndStatus::Ok)
    })
    .await
    .unwrap();

    assert_eq!(info.sys_info.product_id, 0x0001);
    device_task.await.unwrap();
}
