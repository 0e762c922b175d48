//! TCP accept loop for NetSync sessions.
//!
//! Grounded on the teacher's `TransServer::run`/`handle_connection` shape:
//! `loop { accept; tokio::spawn(handle) }`, one task per connection, with
//! `log::info!` at each step. The teacher multiplexes yamux streams inside
//! each connection's task; a HotSync connection doesn't multiplex at all
//! (§5: "at most one outstanding request at any time"), so each spawned
//! task just runs [`crate::orchestrator::run_session`] once and exits.
//!
//! The stop signal is a plain `tokio::sync::watch<bool>`, matching the
//! teacher's own preference for a plain channel over a dedicated
//! cancellation primitive.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::dlp_client::NetSyncDlpClient;
use crate::orchestrator::{run_session, EndStatus, SessionInfo};

/// The well-known HotSync-over-TCP port.
pub const DEFAULT_PORT: u16 = 14238;

/// Runs the accept loop on `addr` until `stop` is set to `true`. `handler`
/// is invoked once per accepted connection, after the handshake and
/// `ReadSysInfo`/`ReadUserInfo` calls, with the cached session info and a
/// DLP client it can use to drive the rest of the sync; its return value
/// becomes the `EndOfSync` status reported to the device.
pub async fn serve<F, Fut>(addr: SocketAddr, mut stop: watch::Receiver<bool>, handler: F) -> std::io::Result<()>
where
    F: for<'a> Fn(SessionInfo, &'a mut NetSyncDlpClient<'_, tokio::net::TcpStream>) -> Fut + Clone + Send + Sync + 'static,
    Fut: std::future::Future<Output = crate::error::Result<EndStatus>> + Send,
{
    let listener = TcpListener::bind(addr).await?;
    log::info!("hotsync-session listening on {addr}");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (mut stream, peer) = accepted?;
                log::info!("accepted NetSync connection from {peer}");
                let handler = handler.clone();
                tokio::spawn(async move {
                    match run_session(&mut stream, |info, client| handler(info, client)).await {
                        Ok(_) => log::info!("session with {peer} completed"),
                        Err(e) => log::error!("session with {peer} failed: {e}"),
                    }
                });
            }
            _ = stop.changed() => {
                if *stop.borrow() {
                    log::info!("stop signal received, accept loop exiting");
                    return Ok(());
                }
            }
        }
    }
}
