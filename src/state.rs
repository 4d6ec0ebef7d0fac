//! Shared chat state: the registry of admitted clients, the history log and
//! the capacity reservations, all behind one lock.
//!
//! Every broadcast enqueues onto the recipients' outboxes while the lock is
//! held. Enqueueing never blocks, and holding the lock gives every client
//! the same relative order of broadcast lines.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{Clock, SystemClock};
use crate::config::ServerConfig;
use crate::error::{ChatError, Result};
use crate::history::History;
use crate::protocol;
use crate::registry::{Client, ClientId, Outbox, Registry};

#[derive(Debug)]
struct Shared {
    registry: Registry,
    history: History,
    /// Accepted connections that have not finished admission yet.
    reserved: usize,
}

impl Shared {
    fn broadcast(&self, line: &str, exclude: Option<ClientId>) {
        for client in self.registry.snapshot_except(exclude) {
            client.enqueue(line);
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    shared: Arc<Mutex<Shared>>,
    clock: Arc<dyn Clock>,
    max_clients: usize,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                registry: Registry::default(),
                history: History::new(config.history_limit),
                reserved: 0,
            })),
            clock,
            max_clients: config.max_clients,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Holds a slot for a freshly accepted connection, or fails if admitted
    /// plus pending connections already reach the limit.
    pub fn reserve(&self) -> Result<Ticket> {
        let mut shared = self.lock();
        if shared.registry.len() + shared.reserved >= self.max_clients {
            return Err(ChatError::ServerFull {
                max: self.max_clients,
            });
        }
        shared.reserved += 1;

        Ok(Ticket {
            id: ClientId::next(),
            state: self.clone(),
            pending: true,
        })
    }

    /// Registers the client and returns the history to replay to it, both
    /// taken in one critical section.
    pub fn admit(&self, mut ticket: Ticket, name: &str, outbox: Outbox) -> (ClientId, Vec<String>) {
        let mut shared = self.lock();
        shared.reserved -= 1;
        ticket.pending = false;

        shared.registry.register(ticket.id, Client::new(name, outbox));
        (ticket.id, shared.history.snapshot())
    }

    /// Removes the client and tells everyone left. Returns the client's last
    /// name if it was still registered.
    pub fn depart(&self, id: ClientId) -> Option<String> {
        let mut shared = self.lock();
        let client = shared.registry.deregister(id)?;
        shared.broadcast(&protocol::left(&client.name), None);

        Some(client.name)
    }

    /// Returns the previous name.
    pub fn rename(&self, id: ClientId, new_name: &str) -> Option<String> {
        let mut shared = self.lock();
        let old = shared.registry.rename(id, new_name)?;
        shared.broadcast(&protocol::renamed(&old, new_name), None);

        Some(old)
    }

    /// Formats `body` under the sender's current name, records it and sends
    /// it to every client, the sender included.
    pub fn post_chat(&self, id: ClientId, body: &str) -> Option<String> {
        let mut shared = self.lock();
        let line = protocol::format_chat(self.clock.now(), shared.registry.name_of(id)?, body);
        shared.history.append(line.clone());
        shared.broadcast(&line, None);

        Some(line)
    }

    pub fn broadcast(&self, line: &str, exclude: Option<ClientId>) {
        self.lock().broadcast(line, exclude);
    }

    pub fn client_count(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().history.snapshot()
    }
}

/// A reserved slot for a connection still being admitted. Dropping it
/// without admission frees the slot.
pub struct Ticket {
    id: ClientId,
    state: ServerState,
    pending: bool,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if self.pending {
            self.state.lock().reserved -= 1;
        }
    }
}
