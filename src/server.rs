use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::protocol::SERVER_FULL;
use crate::state::ServerState;
use crate::transport;

/// Pause after a failed accept so errors like EMFILE don't spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the configured address and serves until Ctrl+C.
pub async fn run(config: &ServerConfig) -> Result<()> {
    let listen_addr = config.bind_addr();
    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to listen on {listen_addr}"))?;

    let state = ServerState::new(config);

    serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Accept loop. Only spawns; per-connection I/O never runs on this task.
pub async fn serve<F>(listener: TcpListener, state: ServerState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    info!("listening on {}", listener.local_addr()?);
    tokio::pin!(shutdown);

    loop {
        let (socket, peer) = tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!("failed to accept connection: {err}");
                    sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
        };

        let ticket = match state.reserve() {
            Ok(ticket) => ticket,
            Err(err) => {
                info!(%peer, "rejecting connection: {err}");
                tokio::spawn(reject(socket));
                continue;
            }
        };

        let state = state.clone();
        tokio::spawn(async move {
            let (reader, writer) = socket.into_split();
            if let Err(err) = crate::conn::handle(state, ticket, reader, writer, peer).await {
                warn!(%peer, "connection error: {err}");
            }
        });
    }
}

async fn reject(mut socket: TcpStream) {
    let _ = transport::send_line(&mut socket, SERVER_FULL).await;
    let _ = socket.shutdown().await;
}
