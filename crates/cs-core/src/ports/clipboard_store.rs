use crate::clip::Clip;
use crate::history::{StoreError, StoreStats};

/// The shared clipboard history.
///
/// Every call must be linearizable with respect to every other call, and must
/// not suspend while it holds exclusive access. Results are returned by value
/// so no borrow of the store outlives a call.
pub trait ClipboardStorePort: Send + Sync {
    /// Insert all clips, run one eviction pass, return the newest clip held.
    fn push(&self, clips: Vec<Clip>) -> Result<Clip, StoreError>;

    /// Newest clip, without removing it.
    fn peek(&self) -> Result<Clip, StoreError>;

    /// Remove and return the newest clip.
    fn pop(&self) -> Result<Clip, StoreError>;

    fn stats(&self) -> StoreStats;
}
