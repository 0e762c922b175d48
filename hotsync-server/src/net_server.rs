//! Thin wiring around [`hotsync_session::server::serve`]: bind the
//! well-known HotSync TCP port and log each session's outcome.
//!
//! Grounded on the teacher's `TransServer`, which this replaces: same
//! bind-log-accept-spawn shape, just pointed at NetSync sessions instead
//! of yamux streams.

use std::net::SocketAddr;

use hotsync_dlp::catalog::DlpFunction;
use hotsync_session::orchestrator::EndStatus;
use hotsync_session::server;
use tokio::sync::watch;

pub async fn run(addr: SocketAddr, stop: watch::Receiver<bool>) -> std::io::Result<()> {
    server::serve(addr, stop, |info, client| async move {
        log::info!(
            "syncing user {} (last pc {}) against device product 0x{:04x}",
            info.user_info.user_name,
            info.user_info.last_sync_pc_id,
            info.sys_info.product_id,
        );

        // No conduits are wired in yet; a real deployment would drive its
        // database syncs here via `hotsync_sync::SyncEngine`, one call per
        // database, using `client` to issue the OpenDb/ReadRecord/WriteRecord
        // DLP calls an implementation of `hotsync_sync::DbSync` needs.
        client.call_checked(DlpFunction::OpenConduit.id(), &[]).await?;

        Ok(EndStatus::Ok)
    })
    .await
}
