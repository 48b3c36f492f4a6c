//! ClipSync Application Orchestration Layer
//!
//! This crate contains the use cases driven by the network and platform
//! adapters: answering protocol commands on the server and running sync
//! cycles on the client.

pub mod usecases;

pub use usecases::{CommandDispatcher, SyncClipboardUseCase, SyncOutcome};
