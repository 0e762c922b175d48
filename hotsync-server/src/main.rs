mod net_server;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use hotsync_session::server::DEFAULT_PORT;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    env_logger::init();

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT);
    let (_stop_tx, stop_rx) = watch::channel(false);

    if let Err(e) = net_server::run(addr, stop_rx).await {
        log::error!("server exited: {e}");
    }
}
