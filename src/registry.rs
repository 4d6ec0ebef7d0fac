use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

pub type Outbox = mpsc::UnboundedSender<String>;

/// Identity of one accepted socket, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session state of an admitted client.
#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub outbox: Outbox,
}

impl Client {
    pub fn new(name: impl Into<String>, outbox: Outbox) -> Self {
        Self {
            name: name.into(),
            outbox,
        }
    }

    /// Queues a line for the client's writer. A writer that already exited
    /// leaves the line in an abandoned queue.
    pub fn enqueue(&self, line: &str) {
        let _ = self.outbox.send(line.to_string());
    }
}

/// Who is currently connected. Not synchronized on its own; the server
/// state keeps it behind its lock.
#[derive(Debug, Default)]
pub struct Registry {
    clients: HashMap<ClientId, Client>,
}

impl Registry {
    pub fn register(&mut self, id: ClientId, client: Client) {
        let previous = self.clients.insert(id, client);
        debug_assert!(previous.is_none(), "client {id} registered twice");
    }

    pub fn deregister(&mut self, id: ClientId) -> Option<Client> {
        self.clients.remove(&id)
    }

    pub fn snapshot_except(&self, excluded: Option<ClientId>) -> Vec<&Client> {
        self.clients
            .iter()
            .filter(|(id, _)| Some(**id) != excluded)
            .map(|(_, client)| client)
            .collect()
    }

    /// Returns the previous name, or `None` if `id` is not registered.
    pub fn rename(&mut self, id: ClientId, new_name: &str) -> Option<String> {
        self.clients
            .get_mut(&id)
            .map(|client| std::mem::replace(&mut client.name, new_name.to_string()))
    }

    pub fn name_of(&self, id: ClientId) -> Option<&str> {
        self.clients.get(&id).map(|client| client.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(name: &str) -> (Client, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Client::new(name, tx), rx)
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ClientId::next(), ClientId::next());
    }

    #[test]
    fn deregister_is_idempotent() {
        let mut registry = Registry::default();
        let id = ClientId::next();
        let (alice, _rx) = client("alice");
        registry.register(id, alice);

        assert!(registry.deregister(id).is_some());
        assert!(registry.deregister(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_skips_excluded() {
        let mut registry = Registry::default();
        let a = ClientId::next();
        let b = ClientId::next();
        let (alice, _ra) = client("alice");
        let (bob, _rb) = client("bob");
        registry.register(a, alice);
        registry.register(b, bob);

        let names: Vec<_> = registry
            .snapshot_except(Some(a))
            .into_iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["bob"]);
        assert_eq!(registry.snapshot_except(None).len(), 2);
    }

    #[test]
    fn rename_returns_old_name() {
        let mut registry = Registry::default();
        let id = ClientId::next();
        let (bob, _rx) = client("bob");
        registry.register(id, bob);

        assert_eq!(registry.rename(id, "carol").as_deref(), Some("bob"));
        assert_eq!(registry.name_of(id), Some("carol"));
        assert_eq!(registry.rename(ClientId::next(), "dave"), None);
    }

    #[test]
    fn enqueue_to_closed_outbox_is_harmless() {
        let (bob, rx) = client("bob");
        drop(rx);

        bob.enqueue("hello");
    }
}
