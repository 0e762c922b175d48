//! Drives one complete HotSync session over an already-accepted NetSync
//! stream: handshake, then `ReadSysInfo`/`ReadUserInfo` (cached on the
//! session so the caller's sync logic doesn't have to re-issue them),
//! then the caller's own sync logic, then `EndOfSync` with a status code.
//!
//! Grounded on the teacher's `TransServer::handle_connection` /
//! `handle_stream` shape: one task drives one connection's whole
//! lifecycle start to finish, same as a yamux stream handler reads a
//! request and writes a reply before returning — except here the
//! "request/reply" is the full handshake-through-EndOfSync sequence,
//! since a DLP session never multiplexes concurrent requests.

use hotsync_dlp::catalog::{DlpFunction, SysInfo, UserInfo};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::dlp_client::NetSyncDlpClient;
use crate::error::Result;
use crate::netsync::perform_handshake;

/// Status code sent in the final `EndOfSync` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EndStatus {
    Ok = 0,
    Cancelled = 1,
    ErrorOccurred = 2,
    NoSpaceOnDevice = 3,
}

/// `ReadSysInfo`/`ReadUserInfo` results cached for the duration of the
/// session, so the caller's sync logic can consult them without issuing
/// its own DLP calls for information the orchestrator already fetched.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub sys_info: SysInfo,
    pub user_info: UserInfo,
}

/// Runs a complete session on `stream`: handshake, info calls, `sync_fn`,
/// then `EndOfSync`. `sync_fn` receives the cached [`SessionInfo`] and a
/// DLP client already positioned after the info calls, and returns the
/// status to report to the device.
pub async fn run_session<S, F, Fut>(stream: &mut S, sync_fn: F) -> Result<SessionInfo>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FnOnce(SessionInfo, &mut NetSyncDlpClient<'_, S>) -> Fut,
    Fut: std::future::Future<Output = Result<EndStatus>>,
{
    perform_handshake(stream).await?;

    let mut client = NetSyncDlpClient::new(stream);

    let sys_info_raw = client.call_checked(DlpFunction::ReadSysInfo.id(), &[]).await?;
    let sys_info = SysInfo::decode(
        hotsync_dlp::message::decode_response(&sys_info_raw, DlpFunction::ReadSysInfo.id(), DlpFunction::ReadSysInfo.response_schema())?.args[0].data,
    )?;

    let user_info_raw = client.call_checked(DlpFunction::ReadUserInfo.id(), &[]).await?;
    let user_info = UserInfo::decode(
        hotsync_dlp::message::decode_response(&user_info_raw, DlpFunction::ReadUserInfo.id(), DlpFunction::ReadUserInfo.response_schema())?.args[0]
            .data,
    )?;

    let info = SessionInfo { sys_info, user_info };

    let status = sync_fn(info.clone(), &mut client).await?;

    client.call_checked(DlpFunction::EndOfSync.id(), &[(0x20, &[status as u8])]).await?;

    Ok(info)
}
