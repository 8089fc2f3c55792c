use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::app::App;
use crate::config::Config;
use crate::http::connection::Connection;

/// Accepts connections forever, one task per client.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, cfg).await
}

/// Pause before accepting again after a failure that is not specific to
/// one peer (out of file descriptors, out of memory).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Runs the accept loop on an already bound listener. Accept failures are
/// logged and retried; only binding can fail the server.
pub async fn serve(listener: TcpListener, cfg: &Config) -> anyhow::Result<()> {
    let app = Arc::new(App::new(&cfg.static_files));
    let limits = cfg.server.read_limits();

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                match accept_retry_delay(&e) {
                    None => warn!(error = %e, "Failed to accept connection"),
                    Some(delay) => {
                        error!(error = %e, "Failed to accept connection, backing off");
                        tokio::time::sleep(delay).await;
                    }
                }
                continue;
            }
        };
        debug!("Accepted connection from {}", peer);

        let conn = Connection::new(socket, Arc::clone(&app), limits);
        tokio::spawn(
            async move {
                if let Err(e) = conn.run().await {
                    debug!(error = %e, "Failed to deliver response");
                }
            }
            .instrument(info_span!("conn", peer = %peer)),
        );
    }
}

/// Errors tied to a single aborted handshake are retried at once; anything
/// else waits for [`ACCEPT_BACKOFF`] so a resource shortage cannot spin.
fn accept_retry_delay(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}
