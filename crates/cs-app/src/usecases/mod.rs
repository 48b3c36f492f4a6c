//! Business logic use cases
//!
//! [ConnectionHandler]                  [ClientRuntime]
//!         ↓                                   ↓
//! CommandDispatcher                    SyncClipboardUseCase
//!         ↓                                   ↓
//! ClipboardStorePort           SystemClipboardPort + ClipSyncTransportPort

pub mod dispatch_command;
pub mod sync_clipboard;

pub use dispatch_command::CommandDispatcher;
pub use sync_clipboard::{SyncClipboardUseCase, SyncOutcome};
