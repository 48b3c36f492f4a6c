use anyhow::Result;
use async_trait::async_trait;

use crate::protocol::{Command, Response};

/// One request/response exchange with the history server.
#[async_trait]
pub trait ClipSyncTransportPort: Send + Sync {
    async fn exchange(&self, command: Command) -> Result<Response>;
}
