//! Timer-driven client loop.
//!
//! Polls the local clipboard on one interval and runs a sync cycle on another,
//! until the shutdown future resolves. A failed cycle is logged and retried on
//! the next tick.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cs_app::{SyncClipboardUseCase, SyncOutcome};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct ClientRuntime {
    use_case: Arc<SyncClipboardUseCase>,
    poll_interval: Duration,
    sync_interval: Duration,
}

impl ClientRuntime {
    pub fn new(
        use_case: Arc<SyncClipboardUseCase>,
        poll_interval: Duration,
        sync_interval: Duration,
    ) -> Self {
        Self {
            use_case,
            poll_interval,
            sync_interval,
        }
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut poll = interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sync = interval(self.sync_interval);
        sync.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            poll_ms = self.poll_interval.as_millis() as u64,
            sync_ms = self.sync_interval.as_millis() as u64,
            "clipsync client started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = poll.tick() => self.poll_once().await,
                _ = sync.tick() => self.sync_once().await,
            }
        }

        info!("clipsync client stopped");
        Ok(())
    }

    async fn poll_once(&self) {
        // Clipboard backends block; keep them off the async workers.
        let use_case = Arc::clone(&self.use_case);
        match tokio::task::spawn_blocking(move || use_case.observe_local_clipboard()).await {
            Ok(Ok(true)) => debug!(pending = self.use_case.pending_len(), "local change queued"),
            Ok(Ok(false)) => {}
            Ok(Err(e)) => warn!(error = %e, "failed to observe local clipboard"),
            Err(e) => warn!(error = %e, "clipboard poll task failed"),
        }
    }

    async fn sync_once(&self) {
        match self.use_case.sync().await {
            Ok(SyncOutcome::Applied(clip)) => {
                debug!(timestamp = %clip.timestamp(), "local clipboard updated")
            }
            Ok(SyncOutcome::UpToDate) => {}
            Ok(SyncOutcome::ServerError(err)) => debug!(error = %err, "sync answered with error"),
            Err(e) => warn!(error = %e, "sync cycle failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_core::ports::{ClipSyncTransportPort, ClockPort, SystemClipboardPort};
    use cs_core::{Clip, Command, Response, Timestamp};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        commands: Mutex<Vec<Command>>,
    }

    #[async_trait::async_trait]
    impl ClipSyncTransportPort for RecordingTransport {
        async fn exchange(&self, command: Command) -> Result<Response> {
            self.commands.lock().unwrap().push(command);
            Ok(Response::Clip(Clip::new(500, "remote")))
        }
    }

    #[derive(Default)]
    struct MemoryClipboard(Mutex<Option<String>>);

    impl SystemClipboardPort for MemoryClipboard {
        fn read_text(&self) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn write_text(&self, text: &str) -> Result<()> {
            *self.0.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    struct FixedClock;

    impl ClockPort for FixedClock {
        fn now(&self) -> Timestamp {
            Timestamp::from_epoch_secs(100)
        }
    }

    #[tokio::test]
    async fn syncs_until_shutdown_and_applies_newer_remote_clip() {
        let transport = Arc::new(RecordingTransport::default());
        let clipboard = Arc::new(MemoryClipboard::default());
        let use_case = Arc::new(SyncClipboardUseCase::new(
            transport.clone(),
            clipboard.clone(),
            Arc::new(FixedClock),
            1_000,
        ));

        let runtime = ClientRuntime::new(
            use_case,
            Duration::from_millis(5),
            Duration::from_millis(20),
        );
        runtime
            .run_until(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        let commands = transport.commands.lock().unwrap();
        assert!(!commands.is_empty());
        assert_eq!(commands[0], Command::Pull);
        assert_eq!(clipboard.read_text().unwrap().as_deref(), Some("remote"));
    }
}
