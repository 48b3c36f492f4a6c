use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use cs_core::ports::{ClipSyncTransportPort, ClockPort, SystemClipboardPort};
use cs_core::{Clip, Command, Response, Timestamp};
use tracing::{debug, info, warn};

/// Result of one sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The server held a newer clip and it was written to the local clipboard.
    Applied(Clip),
    /// Nothing newer than the last local change.
    UpToDate,
    /// The server answered with `{"err": ..}`.
    ServerError(String),
}

#[derive(Debug, Default)]
struct SyncState {
    /// Local changes not yet acknowledged by the server, oldest first.
    pending: Vec<Clip>,
    /// Last clipboard text seen or written by this client.
    last_seen: Option<String>,
    /// The first read only records what is already on the clipboard.
    primed: bool,
    last_local_change: Timestamp,
}

/// Client side of a sync cycle: buffer local clipboard changes, push them (or
/// pull when there are none), and adopt the server's newest clip when it is
/// newer than anything copied locally.
///
/// 客户端同步用例：缓冲本地变更，推送或拉取，并在服务端更新时写回本地剪贴板
pub struct SyncClipboardUseCase {
    transport: Arc<dyn ClipSyncTransportPort>,
    clipboard: Arc<dyn SystemClipboardPort>,
    clock: Arc<dyn ClockPort>,
    max_clip_item_size: usize,
    state: Mutex<SyncState>,
}

impl SyncClipboardUseCase {
    pub fn new(
        transport: Arc<dyn ClipSyncTransportPort>,
        clipboard: Arc<dyn SystemClipboardPort>,
        clock: Arc<dyn ClockPort>,
        max_clip_item_size: usize,
    ) -> Self {
        let state = SyncState {
            last_local_change: clock.now(),
            ..SyncState::default()
        };
        Self {
            transport,
            clipboard,
            clock,
            max_clip_item_size,
            state: Mutex::new(state),
        }
    }

    /// Read the local clipboard and buffer its text if it changed.
    ///
    /// Returns `true` when a new clip was buffered for the next push.
    pub fn observe_local_clipboard(&self) -> Result<bool> {
        let text = self
            .clipboard
            .read_text()
            .context("failed to read local clipboard")?;
        let now = self.clock.now();

        let mut state = self.lock_state();
        if !state.primed {
            state.primed = true;
            state.last_seen = text;
            return Ok(false);
        }

        let Some(text) = text else {
            return Ok(false);
        };
        if state.last_seen.as_deref() == Some(text.as_str()) {
            return Ok(false);
        }

        state.last_seen = Some(text.clone());
        state.last_local_change = now;

        if text.len() >= self.max_clip_item_size {
            debug!(
                size = text.len(),
                max = self.max_clip_item_size,
                "local clip too large to push, skipping"
            );
            return Ok(false);
        }

        debug!(size = text.len(), timestamp = %now, "buffered local clip");
        state.pending.push(Clip::new(now.as_secs(), text));
        Ok(true)
    }

    /// Run one exchange with the server.
    pub async fn sync(&self) -> Result<SyncOutcome> {
        let batch = self.lock_state().pending.clone();
        let sent = batch.len();
        let command = if batch.is_empty() {
            Command::Pull
        } else {
            Command::Push(batch)
        };
        let cmd = command.name();

        let response = self
            .transport
            .exchange(command)
            .await
            .with_context(|| format!("{cmd} exchange with server failed"))?;

        // Only what was sent is acknowledged; later changes stay queued.
        if sent > 0 {
            self.lock_state().pending.drain(..sent);
        }

        match response {
            Response::Error { err } => {
                warn!(cmd, error = %err, "server reported an error");
                Ok(SyncOutcome::ServerError(err))
            }
            Response::Clip(clip) => self.adopt(clip),
        }
    }

    pub fn pending_len(&self) -> usize {
        self.lock_state().pending.len()
    }

    fn adopt(&self, clip: Clip) -> Result<SyncOutcome> {
        let last_local_change = self.lock_state().last_local_change;
        // The server may not hold every local change (large items are never
        // pushed), so only strictly newer clips replace the local clipboard.
        if !clip.is_newer_than(last_local_change) {
            return Ok(SyncOutcome::UpToDate);
        }

        self.clipboard
            .write_text(clip.contents())
            .context("failed to write local clipboard")?;

        let mut state = self.lock_state();
        state.last_seen = Some(clip.contents().to_string());
        state.last_local_change = clip.timestamp();
        info!(timestamp = %clip.timestamp(), size = clip.size(), "applied clip from server");
        Ok(SyncOutcome::Applied(clip))
    }

    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
