use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use cs_core::ports::ClipSyncTransportPort;
use cs_core::{Command, Response};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info_span, Instrument};

use crate::framing::{read_line_bounded, write_line, LineRead};

/// Talks to a clipsync server over TCP, one fresh connection per exchange.
pub struct TcpClipSyncTransport {
    server_address: String,
    max_response_bytes: usize,
}

impl TcpClipSyncTransport {
    pub fn new(server_address: impl Into<String>, max_response_bytes: usize) -> Self {
        Self {
            server_address: server_address.into(),
            max_response_bytes,
        }
    }

    async fn exchange_inner(&self, command: Command) -> Result<Response> {
        let stream = TcpStream::connect(&self.server_address)
            .await
            .with_context(|| format!("failed to connect to {}", self.server_address))?;
        let mut stream = BufReader::new(stream);

        let request = command.encode_line().context("failed to encode request")?;
        write_line(stream.get_mut(), &request).await?;
        // Half-close: the server answers once and closes its side.
        stream.get_mut().shutdown().await?;

        match read_line_bounded(&mut stream, self.max_response_bytes).await? {
            LineRead::Line(line) => {
                Response::decode_line(&line).context("server sent a malformed response")
            }
            LineRead::Eof { partial } => Err(anyhow!(
                "server closed the connection after {partial} bytes without a reply"
            )),
            LineRead::TooLarge { limit } => {
                Err(anyhow!("server response exceeds {limit} bytes"))
            }
            LineRead::InvalidUtf8 { valid_up_to } => Err(anyhow!(
                "server response is not valid utf-8 (invalid byte at offset {valid_up_to})"
            )),
        }
    }
}

#[async_trait]
impl ClipSyncTransportPort for TcpClipSyncTransport {
    async fn exchange(&self, command: Command) -> Result<Response> {
        let span = info_span!("exchange", cmd = command.name(), server = %self.server_address);
        async {
            let response = self.exchange_inner(command).await?;
            debug!(error = response.is_error(), "received response");
            Ok(response)
        }
        .instrument(span)
        .await
    }
}
