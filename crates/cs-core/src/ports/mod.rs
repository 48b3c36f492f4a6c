//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases in `cs-app` and the
//! adapters in `cs-infra`, `cs-network` and `cs-platform`.

mod clipboard_store;
mod clock;
mod system_clipboard;
mod transport;

pub use clipboard_store::ClipboardStorePort;
pub use clock::ClockPort;
pub use system_clipboard::SystemClipboardPort;
pub use transport::ClipSyncTransportPort;
