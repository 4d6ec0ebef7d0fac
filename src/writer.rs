use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::registry::ClientId;
use crate::transport;

pub fn spawn<W>(id: ClientId, writer: W, outbox: mpsc::UnboundedReceiver<String>) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(run(id, writer, outbox))
}

/// Drains the client's outbox onto its socket until every sender is gone
/// or a write fails. Never touches the registry.
pub async fn run<W>(id: ClientId, mut writer: W, mut outbox: mpsc::UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = outbox.recv().await {
        if let Err(err) = transport::send_line(&mut writer, &line).await {
            warn!(client = %id, "error writing to client: {err}");
            return;
        }
    }

    debug!(client = %id, "outbox closed");
    let _ = writer.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn writes_queued_lines_in_order() {
        let (mut client, server) = tokio::io::duplex(256);
        let (tx, rx) = mpsc::unbounded_channel();
        let task = spawn(ClientId::next(), server, rx);

        tx.send("one".to_string()).unwrap();
        tx.send("two".to_string()).unwrap();
        drop(tx);
        task.await.unwrap();

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "one\ntwo\n");
    }

    #[tokio::test]
    async fn stops_when_peer_is_gone() {
        let (client, server) = tokio::io::duplex(16);
        drop(client);
        let (tx, rx) = mpsc::unbounded_channel();
        let task = spawn(ClientId::next(), server, rx);

        tx.send("lost".to_string()).unwrap();
        task.await.unwrap();

        assert!(tx.send("after".to_string()).is_err());
    }
}
