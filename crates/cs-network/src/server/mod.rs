//! Server side of the protocol.

mod connection;
mod listener;

pub use connection::{ConnectionHandler, ConnectionState};
pub use listener::ClipSyncListener;
