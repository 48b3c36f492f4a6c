//! # cs-core
//!
//! Core domain models and wire protocol for ClipSync.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! the [`Clip`] value, the size-bounded [`ClipHistory`], the line protocol and the
//! ports implemented by the outer crates.

pub mod clip;
pub mod config;
pub mod history;
pub mod ports;
pub mod protocol;

// Re-export commonly used types at the crate root
pub use clip::{Clip, ClipError, Timestamp};
pub use config::{ByteSize, ClientConfig, ServerConfig};
pub use history::{ClipHistory, InvariantViolation, StoreError, StoreStats};
pub use protocol::{Command, ProtocolError, Response};
