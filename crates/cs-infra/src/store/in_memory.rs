//! Process-wide clipboard history shared by every connection.
//!
//! A single [`ClipHistory`] sits behind a [`std::sync::Mutex`]. The guard is
//! only ever held inside one synchronous history call, never across `.await`,
//! so a slow peer cannot stall other connections while it owns the store.

use std::sync::{Mutex, MutexGuard};

use cs_core::history::{ClipHistory, StoreError, StoreStats};
use cs_core::ports::ClipboardStorePort;
use cs_core::Clip;
use tracing::{debug, error};

pub struct InMemoryClipboardStore {
    history: Mutex<ClipHistory>,
}

impl InMemoryClipboardStore {
    pub fn new(max_size: usize) -> Self {
        Self {
            history: Mutex::new(ClipHistory::new(max_size)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClipHistory> {
        match self.history.lock() {
            Ok(guard) => guard,
            // A panic while holding the guard may have left a torn history.
            Err(_) => fatal("clipboard history lock poisoned"),
        }
    }
}

impl ClipboardStorePort for InMemoryClipboardStore {
    fn push(&self, clips: Vec<Clip>) -> Result<Clip, StoreError> {
        let mut history = self.lock();
        let pushed = clips.len();
        let newest = history.push_batch(clips).cloned();
        ensure_invariants(&history);
        debug!(
            pushed,
            len = history.len(),
            current_size = history.current_size(),
            "pushed clips"
        );
        newest
    }

    fn peek(&self) -> Result<Clip, StoreError> {
        self.lock().peek().cloned()
    }

    fn pop(&self) -> Result<Clip, StoreError> {
        let mut history = self.lock();
        let popped = history.pop();
        ensure_invariants(&history);
        debug!(
            len = history.len(),
            current_size = history.current_size(),
            "popped clip"
        );
        popped
    }

    fn stats(&self) -> StoreStats {
        self.lock().stats()
    }
}

/// The budget is checked on every mutation. The full size rescan is linear in
/// the number of held clips, so it only runs in debug builds.
fn ensure_invariants(history: &ClipHistory) {
    let checked = if cfg!(debug_assertions) {
        history.check_invariants()
    } else {
        history.check_budget()
    };
    if let Err(violation) = checked {
        fatal(&violation.to_string());
    }
}

fn fatal(reason: &str) -> ! {
    error!(reason, "clipboard store invariant violated, aborting");
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn push_returns_newest_and_peek_agrees() {
        let store = InMemoryClipboardStore::new(1000);
        let newest = store.push(vec![Clip::new(1, "a")]).unwrap();
        assert_eq!(newest, Clip::new(1, "a"));
        assert_eq!(store.peek().unwrap(), newest);
    }

    #[test]
    fn empty_store_errors() {
        let store = InMemoryClipboardStore::new(1000);
        assert_eq!(store.peek(), Err(StoreError::Empty));
        assert_eq!(store.pop(), Err(StoreError::Empty));
        assert_eq!(store.push(Vec::new()), Err(StoreError::Empty));
    }

    #[test]
    fn pop_removes_newest() {
        let store = InMemoryClipboardStore::new(1000);
        store
            .push(vec![Clip::new(5, "five"), Clip::new(3, "three")])
            .unwrap();
        assert_eq!(store.pop().unwrap(), Clip::new(5, "five"));
        assert_eq!(store.peek().unwrap(), Clip::new(3, "three"));
        assert_eq!(store.stats().len, 1);
    }

    #[test]
    fn concurrent_threads_keep_accounting_exact() {
        let store = Arc::new(InMemoryClipboardStore::new(64));
        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..200u64 {
                        let ts = worker * 1000 + i;
                        let body = "y".repeat(((worker + i) % 9) as usize);
                        store.push(vec![Clip::new(ts, body)]).ok();
                        if i % 3 == 0 {
                            store.pop().ok();
                        }
                        store.peek().ok();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = store.stats();
        assert!(stats.len == 0 || stats.current_size <= stats.max_size);
        // Draining must account for every remaining byte and end empty.
        let mut drained = 0;
        while let Ok(clip) = store.pop() {
            drained += clip.size();
        }
        assert_eq!(drained, stats.current_size);
        assert_eq!(store.stats().current_size, 0);
    }
}
