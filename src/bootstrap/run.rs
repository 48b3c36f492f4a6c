use std::sync::Arc;

use anyhow::{Context, Result};
use cs_app::{CommandDispatcher, SyncClipboardUseCase};
use cs_core::config::DEFAULT_MAX_REQUEST_BYTES;
use cs_core::{ClientConfig, ServerConfig};
use cs_infra::{InMemoryClipboardStore, SystemClock};
use cs_network::{ClipSyncListener, ConnectionHandler, TcpClipSyncTransport};
use cs_platform::{ClientRuntime, LocalClipboard};
use tracing::{error, info};

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let store = Arc::new(InMemoryClipboardStore::new(
        config.max_clipboard_size.as_usize(),
    ));
    let dispatcher = Arc::new(CommandDispatcher::new(store));
    let handler = Arc::new(ConnectionHandler::new(
        dispatcher,
        config.max_request_bytes.as_usize(),
    ));

    let listener = ClipSyncListener::bind(config.bind_address(), handler)
        .await
        .with_context(|| format!("failed to listen on {}", config.bind_address()))?;
    info!(
        addr = %listener.local_addr()?,
        max_clipboard_size = %config.max_clipboard_size,
        "clipsync server listening"
    );

    listener.serve_with_shutdown(shutdown_signal()).await
}

pub async fn run_client(config: ClientConfig) -> Result<()> {
    let clipboard = LocalClipboard::new().context("failed to open the system clipboard")?;
    // Replies carry one clip; bound them like the server bounds requests.
    let transport =
        TcpClipSyncTransport::new(config.server_address(), DEFAULT_MAX_REQUEST_BYTES.as_usize());
    let use_case = Arc::new(SyncClipboardUseCase::new(
        Arc::new(transport),
        Arc::new(clipboard),
        Arc::new(SystemClock),
        config.max_clip_item_size.as_usize(),
    ));

    info!(
        server = %config.server_address(),
        max_clip_item_size = %config.max_clip_item_size,
        "clipsync client starting"
    );

    ClientRuntime::new(use_case, config.poll_interval, config.sync_interval)
        .run_until(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            error!(error = %e, "failed to listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
