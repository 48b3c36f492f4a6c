//! One request, one reply, then close.
//!
//! ```text
//! AwaitingRequest ──decode ok──▶ Dispatching ──▶ Responding ──▶ Closed
//!        │                                          ▲
//!        └────────── framing / decode error ────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use cs_app::CommandDispatcher;
use cs_core::{Command, ProtocolError, Response};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, trace, warn};

use crate::framing::{read_line_bounded, write_line, LineRead};

/// Protocol state of a single connection.
#[derive(Debug)]
pub enum ConnectionState {
    AwaitingRequest,
    Dispatching(Command),
    Responding(Response),
    Closed,
}

impl ConnectionState {
    fn name(&self) -> &'static str {
        match self {
            ConnectionState::AwaitingRequest => "awaiting_request",
            ConnectionState::Dispatching(_) => "dispatching",
            ConnectionState::Responding(_) => "responding",
            ConnectionState::Closed => "closed",
        }
    }
}

/// Drives one client connection through a single exchange.
pub struct ConnectionHandler {
    dispatcher: Arc<CommandDispatcher>,
    max_request_bytes: usize,
}

impl ConnectionHandler {
    pub fn new(dispatcher: Arc<CommandDispatcher>, max_request_bytes: usize) -> Self {
        Self {
            dispatcher,
            max_request_bytes,
        }
    }

    /// Serve one exchange on `stream` and shut it down.
    ///
    /// Per-request failures are answered on the stream; only I/O errors on the
    /// stream itself are returned.
    pub async fn handle<S>(&self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = BufReader::new(stream);
        let mut state = ConnectionState::AwaitingRequest;

        loop {
            trace!(state = state.name(), "connection state");
            state = match state {
                ConnectionState::AwaitingRequest => {
                    match self.read_request(&mut stream).await? {
                        Ok(command) => ConnectionState::Dispatching(command),
                        Err(err) => {
                            debug!(error = %err, "rejecting request");
                            ConnectionState::Responding(Response::from(err))
                        }
                    }
                }
                ConnectionState::Dispatching(command) => {
                    ConnectionState::Responding(self.dispatcher.dispatch(command))
                }
                ConnectionState::Responding(response) => {
                    let line = response
                        .encode_line()
                        .context("failed to encode response")?;
                    write_line(stream.get_mut(), &line).await?;
                    ConnectionState::Closed
                }
                ConnectionState::Closed => break,
            };
        }

        if let Err(e) = stream.get_mut().shutdown().await {
            // The peer may already be gone; the reply was flushed.
            warn!(error = %e, "failed to shut down connection");
        }
        Ok(())
    }

    async fn read_request<R>(
        &self,
        reader: &mut BufReader<R>,
    ) -> Result<std::result::Result<Command, ProtocolError>>
    where
        R: AsyncRead + Unpin,
    {
        let read = read_line_bounded(reader, self.max_request_bytes)
            .await
            .context("failed to read request")?;

        Ok(match read {
            LineRead::Line(line) => Command::decode_line(line.trim()),
            LineRead::Eof { partial } => {
                debug!(partial, "stream ended before newline");
                Err(ProtocolError::Unterminated)
            }
            LineRead::TooLarge { limit } => Err(ProtocolError::TooLarge { limit }),
            LineRead::InvalidUtf8 { valid_up_to } => {
                Err(ProtocolError::InvalidUtf8 { offset: valid_up_to })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_core::ports::ClipboardStorePort;
    use cs_core::Clip;
    use cs_infra::InMemoryClipboardStore;
    use tokio::io::AsyncReadExt;

    fn handler(max_request_bytes: usize) -> (ConnectionHandler, Arc<InMemoryClipboardStore>) {
        let store = Arc::new(InMemoryClipboardStore::new(1000));
        let dispatcher = Arc::new(CommandDispatcher::new(store.clone()));
        (ConnectionHandler::new(dispatcher, max_request_bytes), store)
    }

    async fn exchange(handler: &ConnectionHandler, request: &[u8], close: bool) -> String {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        client.write_all(request).await.unwrap();
        if close {
            client.shutdown().await.unwrap();
        }
        handler.handle(server).await.unwrap();

        let mut reply = String::new();
        client.read_to_string(&mut reply).await.unwrap();
        reply
    }

    #[tokio::test]
    async fn answers_one_request_and_closes() {
        let (handler, _store) = handler(1024);
        let reply = exchange(
            &handler,
            b"{\"cmd\":\"PUSH\",\"data\":[{\"dt\":1,\"contents\":\"a\"}]}\n",
            false,
        )
        .await;
        assert_eq!(reply, "{\"dt\":1,\"contents\":\"a\"}\n");
    }

    #[tokio::test]
    async fn ignores_anything_after_the_first_line() {
        let (handler, store) = handler(1024);
        let reply = exchange(&handler, b"{\"cmd\":\"PULL\"}\n{\"cmd\":\"POP\"}\n", false).await;
        assert_eq!(reply, "{\"err\":\"clipboard empty\"}\n");
        assert_eq!(store.stats().len, 0);
    }

    #[tokio::test]
    async fn unterminated_request_gets_an_error_reply() {
        let (handler, store) = handler(1024);
        store.push(vec![Clip::new(1, "keep")]).unwrap();

        let reply = exchange(&handler, b"{\"cmd\":\"POP\"}", true).await;
        assert_eq!(
            reply,
            "{\"err\":\"request must be a single newline-terminated line\"}\n"
        );
        assert_eq!(store.stats().len, 1);
    }

    #[tokio::test]
    async fn empty_stream_gets_an_error_reply() {
        let (handler, _store) = handler(1024);
        let reply = exchange(&handler, b"", true).await;
        assert!(reply.starts_with("{\"err\":"), "{reply}");
    }

    #[tokio::test]
    async fn oversize_request_is_rejected() {
        let (handler, store) = handler(16);
        let reply = exchange(
            &handler,
            b"{\"cmd\":\"PUSH\",\"data\":[{\"dt\":1,\"contents\":\"aaaaaaaa\"}]}\n",
            false,
        )
        .await;
        assert_eq!(reply, "{\"err\":\"request exceeds 16 bytes\"}\n");
        assert_eq!(store.stats().len, 0);
    }

    #[tokio::test]
    async fn invalid_utf8_contents_are_rejected_and_store_is_unchanged() {
        let (handler, store) = handler(1024);
        store.push(vec![Clip::new(1, "keep")]).unwrap();

        let reply = exchange(
            &handler,
            b"{\"cmd\":\"PUSH\",\"data\":[{\"dt\":2,\"contents\":\"a\xff\xfe\"}]}\n",
            false,
        )
        .await;

        assert_eq!(
            reply,
            "{\"err\":\"request is not valid utf-8 (invalid byte at offset 43)\"}\n"
        );
        assert_eq!(store.stats().len, 1);
        assert_eq!(store.peek().unwrap(), Clip::new(1, "keep"));
    }

    #[tokio::test]
    async fn invalid_json_is_reported() {
        let (handler, _store) = handler(1024);
        let reply = exchange(&handler, b"hello there\n", false).await;
        assert_eq!(reply, "{\"err\":\"hello there is not valid json\"}\n");
    }
}
