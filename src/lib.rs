//! Line-oriented TCP chat relay.
//!
//! Each accepted connection picks a display name, receives the chat history,
//! and from then on every line it sends is stamped and relayed to all
//! connected clients. Every client has its own writer task fed by an
//! unbounded queue, so a slow or dead peer never holds up the others.

pub mod clock;
pub mod config;
pub mod conn;
pub mod error;
pub mod history;
pub mod logger;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod state;
pub mod transport;
pub mod writer;
