//! Infrastructure adapters for ClipSync.

pub mod store;
pub mod time;

pub use store::InMemoryClipboardStore;
pub use time::SystemClock;
