//! Platform adapters for the ClipSync client.

pub mod clipboard;
pub mod runtime;

pub use clipboard::LocalClipboard;
pub use runtime::ClientRuntime;
