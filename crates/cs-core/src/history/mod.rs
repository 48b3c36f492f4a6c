//! Size-bounded clipboard history.
//!
//! [`ClipHistory`] keeps clips ordered by age and evicts the oldest ones once the
//! configured byte budget is exceeded. Eviction is FIFO by timestamp: reading a
//! clip does not refresh its age.
//!
//! The type itself is not synchronized. Sharing it between connections is the
//! job of the store adapter, which must hold exclusive access for the whole
//! duration of each call.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::clip::{Clip, Timestamp};

/// Errors reported by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("clipboard empty")]
    Empty,
}

/// Broken bookkeeping. Never expected; callers treat it as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("size accounting drift: tracked {tracked} bytes, held clips sum to {actual}")]
    SizeDrift { tracked: usize, actual: usize },

    #[error("{current} bytes held exceeds budget of {max} bytes")]
    OverBudget { current: usize, max: usize },
}

/// Point-in-time view of the history counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub len: usize,
    pub current_size: usize,
    pub max_size: usize,
}

/// Ordering key. Equal timestamps are broken by insertion order, so the clip
/// pushed later counts as newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct HistoryKey {
    timestamp: Timestamp,
    seq: u64,
}

#[derive(Debug)]
pub struct ClipHistory {
    clips: BTreeMap<HistoryKey, Clip>,
    next_seq: u64,
    current_size: usize,
    max_size: usize,
}

impl ClipHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            clips: BTreeMap::new(),
            next_seq: 0,
            current_size: 0,
            max_size,
        }
    }

    /// Insert one clip, evict, and return the newest clip left.
    pub fn push(&mut self, clip: Clip) -> Result<&Clip, StoreError> {
        self.push_batch(std::iter::once(clip))
    }

    /// Insert every clip of a batch, then run a single eviction pass.
    ///
    /// Returns the newest clip held afterwards, which may not be one of the
    /// pushed clips (older than the current newest, or evicted).
    pub fn push_batch<I>(&mut self, clips: I) -> Result<&Clip, StoreError>
    where
        I: IntoIterator<Item = Clip>,
    {
        for clip in clips {
            let key = HistoryKey {
                timestamp: clip.timestamp(),
                seq: self.next_seq,
            };
            self.next_seq += 1;
            self.current_size += clip.size();
            self.clips.insert(key, clip);
        }
        self.evict();
        self.peek()
    }

    /// The clip with the greatest timestamp.
    pub fn peek(&self) -> Result<&Clip, StoreError> {
        self.clips
            .last_key_value()
            .map(|(_, clip)| clip)
            .ok_or(StoreError::Empty)
    }

    /// Remove and return the clip with the greatest timestamp.
    pub fn pop(&mut self) -> Result<Clip, StoreError> {
        let (_, clip) = self.clips.pop_last().ok_or(StoreError::Empty)?;
        self.current_size -= clip.size();
        Ok(clip)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn current_size(&self) -> usize {
        self.current_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            len: self.len(),
            current_size: self.current_size,
            max_size: self.max_size,
        }
    }

    /// Clips from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.values()
    }

    /// Constant-time check that the held bytes fit the budget.
    pub fn check_budget(&self) -> Result<(), InvariantViolation> {
        if !self.is_empty() && self.current_size > self.max_size {
            return Err(InvariantViolation::OverBudget {
                current: self.current_size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    /// Verify the byte accounting against every held clip, then the budget.
    /// Linear in the number of clips. Ordering holds by construction of the map.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let actual: usize = self.clips.values().map(Clip::size).sum();
        if actual != self.current_size {
            return Err(InvariantViolation::SizeDrift {
                tracked: self.current_size,
                actual,
            });
        }
        self.check_budget()
    }

    /// Drop oldest clips until the held bytes fit the budget.
    fn evict(&mut self) -> usize {
        let mut evicted = 0;
        while self.current_size > self.max_size {
            let Some((key, clip)) = self.clips.pop_first() else {
                break;
            };
            self.current_size -= clip.size();
            evicted += 1;
            debug!(
                timestamp = %key.timestamp,
                size = clip.size(),
                current_size = self.current_size,
                max_size = self.max_size,
                "evicted oldest clip"
            );
        }
        evicted
    }
}
