//! Network adapters for ClipSync.
//!
//! - [`framing`]: newline-delimited frames with an upper bound
//! - [`server`]: the listener and the per-connection protocol state machine
//! - [`client`]: the client transport used by sync cycles

pub mod client;
pub mod framing;
pub mod server;

pub use client::TcpClipSyncTransport;
pub use server::{ClipSyncListener, ConnectionHandler};
