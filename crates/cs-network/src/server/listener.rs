use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::ConnectionHandler;

/// Pause after a failed `accept` (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// How long shutdown waits for in-flight connections before aborting them.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Accepts connections and runs one [`ConnectionHandler`] task per connection.
///
/// Connections are served concurrently; they only meet at the store, which
/// serializes its own operations.
pub struct ClipSyncListener {
    listener: TcpListener,
    handler: Arc<ConnectionHandler>,
    drain_timeout: Duration,
}

impl ClipSyncListener {
    pub async fn bind<A>(addr: A, handler: Arc<ConnectionHandler>) -> Result<Self>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr)
            .await
            .context("failed to bind clipsync listener")?;
        Ok(Self {
            listener,
            handler,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        })
    }

    /// Bound the wait for in-flight connections once shutdown starts.
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process exits.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then stop accepting and wait for
    /// in-flight connections to finish. Connections still open after the drain
    /// timeout (a client that never sends its newline) are aborted.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = self.local_addr()?;
        info!(%local_addr, "clipsync server listening");

        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let handler = Arc::clone(&self.handler);
                            let span = info_span!("connection", %peer);
                            connections.spawn(
                                async move {
                                    debug!("accepted connection");
                                    if let Err(e) = handler.handle(stream).await {
                                        warn!(error = %e, "connection failed");
                                    }
                                }
                                .instrument(span),
                            );
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                        }
                    }
                }
                Some(finished) = connections.join_next() => {
                    if let Err(e) = finished {
                        error!(error = %e, "connection task panicked");
                    }
                }
            }
        }

        let in_flight = connections.len();
        if in_flight > 0 {
            info!(in_flight, "waiting for in-flight connections");
        }
        let drain = async {
            while let Some(finished) = connections.join_next().await {
                if let Err(e) = finished {
                    error!(error = %e, "connection task panicked");
                }
            }
        };
        if tokio::time::timeout(self.drain_timeout, drain).await.is_err() {
            warn!(
                remaining = connections.len(),
                timeout_ms = self.drain_timeout.as_millis() as u64,
                "drain timed out, aborting remaining connections"
            );
            connections.abort_all();
            while connections.join_next().await.is_some() {}
        }
        info!("clipsync server stopped");
        Ok(())
    }
}
