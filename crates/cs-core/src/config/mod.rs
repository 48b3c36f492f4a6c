//! # Configuration DTOs / 配置数据结构
//!
//! Pure data: the settings each side of ClipSync needs once the binary has
//! merged command-line flags, the config file and the built-in defaults.

mod size;

pub use size::{ByteSize, SizeParseError};

use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 7071;

/// Default history budget of the server (5 MB).
pub const DEFAULT_MAX_CLIPBOARD_SIZE: ByteSize = ByteSize::bytes(5_000_000);

/// Longest request line the server will buffer. JSON escaping can inflate a
/// payload several times over, so this sits well above the history budget.
pub const DEFAULT_MAX_REQUEST_BYTES: ByteSize = ByteSize::bytes(64_000_000);

/// Clipboard items at least this large are never pushed by the client (1 MB).
pub const DEFAULT_MAX_CLIP_ITEM_SIZE: ByteSize = ByteSize::bytes(1_000_000);

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Server configuration
/// 服务端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host name or address to bind
    pub host: String,

    /// TCP port to bind
    pub port: u16,

    /// Byte budget of the clipboard history
    pub max_clipboard_size: ByteSize,

    /// Upper bound for a single request line
    pub max_request_bytes: ByteSize,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_clipboard_size: DEFAULT_MAX_CLIPBOARD_SIZE,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

/// Client configuration
/// 客户端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server host to connect to
    pub host: String,

    /// Server port to connect to
    pub port: u16,

    /// Local clipboard items of this size or larger are not pushed
    pub max_clip_item_size: ByteSize,

    /// Time between two sync cycles
    pub sync_interval: Duration,

    /// Time between two reads of the local clipboard
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_clip_item_size: DEFAULT_MAX_CLIP_ITEM_SIZE,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "localhost:7071");
        assert_eq!(config.max_clipboard_size.as_u64(), 5_000_000);
    }

    #[test]
    fn client_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_address(), "localhost:7071");
        assert_eq!(config.max_clip_item_size.as_u64(), 1_000_000);
        assert_eq!(config.sync_interval, Duration::from_secs(5));
    }
}
