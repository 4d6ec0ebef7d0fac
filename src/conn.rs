use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::protocol::{self, Command, INVALID_NAME, NAME_PROMPT};
use crate::registry::ClientId;
use crate::state::{ServerState, Ticket};
use crate::transport::{self, LineReader};

/// Runs one connection from the name prompt to teardown.
pub async fn handle<R, W>(
    state: ServerState,
    ticket: Ticket,
    reader: R,
    mut writer: W,
    peer: SocketAddr,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut lines = transport::lines(reader);

    transport::send_raw(&mut writer, NAME_PROMPT).await?;

    let name = match lines.next_line().await {
        Ok(Some(name)) => name,
        Ok(None) => {
            debug!(%peer, "closed before sending a name");
            return Ok(());
        }
        Err(err) => {
            debug!(%peer, "error reading name: {err}");
            return Ok(());
        }
    };

    if name.is_empty() {
        warn!(%peer, "invalid name received");
        transport::send_line(&mut writer, INVALID_NAME).await?;
        return Ok(());
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let (id, replay) = state.admit(ticket, &name, tx);
    info!(client = %id, %peer, "{name} joined the chat");

    let result = session(&state, id, &name, lines, writer, rx, replay).await;

    if let Some(name) = state.depart(id) {
        info!(client = %id, "{name} left the chat");
    }

    Ok(result?)
}

async fn session<R, W>(
    state: &ServerState,
    id: ClientId,
    name: &str,
    mut lines: LineReader<R>,
    mut writer: W,
    outbox: mpsc::UnboundedReceiver<String>,
    replay: Vec<String>,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    // History goes straight to the socket so it lands before anything queued.
    for line in &replay {
        transport::send_line(&mut writer, line).await?;
    }

    state.broadcast(&protocol::joined(name), Some(id));
    crate::writer::spawn(id, writer, outbox);

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                debug!(client = %id, "read failed: {err}");
                break;
            }
        };

        match Command::parse(&line) {
            None | Some(Command::Ignored) => {}
            Some(Command::Rename(new_name)) => {
                if let Some(old_name) = state.rename(id, new_name) {
                    info!(client = %id, "{old_name} changed their name to {new_name}");
                }
            }
            Some(Command::Chat(body)) => {
                if let Some(formatted) = state.post_chat(id, body) {
                    debug!(client = %id, "{formatted}");
                }
            }
        }
    }

    Ok(())
}
