//! Config file loading and precedence: command line, then file, then defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cs_core::{ByteSize, ClientConfig, ServerConfig};
use serde::Deserialize;
use tracing::{debug, info};

use crate::cli::{ClientArgs, ServerArgs};

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub client: ClientSection,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_clipboard_size: Option<ByteSize>,
    pub max_request_bytes: Option<ByteSize>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_clip_item_size: Option<ByteSize>,
    pub sync_interval_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("clipsync").join("config.toml"))
}

/// Load the config file.
///
/// An explicit path must exist. The default location is skipped when absent.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return read_file_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => read_file_config(&path),
        _ => {
            debug!("no config file found, using defaults");
            Ok(FileConfig::default())
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    info!(path = %path.display(), "loaded config file");
    Ok(config)
}

pub fn resolve_server_config(args: &ServerArgs, file: &ServerSection) -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        host: args
            .host
            .clone()
            .or_else(|| file.host.clone())
            .unwrap_or(defaults.host),
        port: args.port.or(file.port).unwrap_or(defaults.port),
        max_clipboard_size: args
            .max_clipboard_size
            .or(file.max_clipboard_size)
            .unwrap_or(defaults.max_clipboard_size),
        max_request_bytes: file
            .max_request_bytes
            .unwrap_or(defaults.max_request_bytes),
    }
}

pub fn resolve_client_config(args: &ClientArgs, file: &ClientSection) -> ClientConfig {
    let defaults = ClientConfig::default();
    ClientConfig {
        host: args
            .host
            .clone()
            .or_else(|| file.host.clone())
            .unwrap_or(defaults.host),
        port: args.port.or(file.port).unwrap_or(defaults.port),
        max_clip_item_size: args
            .max_clip_item_size
            .or(file.max_clip_item_size)
            .unwrap_or(defaults.max_clip_item_size),
        sync_interval: args
            .sync_interval
            .or(file.sync_interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.sync_interval),
        poll_interval: file
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_both_sections_from_file() {
        let file = write_config(
            r#"
[server]
host = "0.0.0.0"
port = 9000
max_clipboard_size = "10mb"

[client]
host = "clips.lan"
sync_interval_secs = 3
poll_interval_ms = 250
max_clip_item_size = 2048
"#,
        );

        let config = load_file_config(Some(file.path())).unwrap();

        assert_eq!(config.server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.server.port, Some(9000));
        assert_eq!(
            config.server.max_clipboard_size,
            Some(ByteSize::bytes(10_000_000))
        );
        assert_eq!(config.client.host.as_deref(), Some("clips.lan"));
        assert_eq!(config.client.max_clip_item_size, Some(ByteSize::bytes(2048)));
        assert_eq!(config.client.poll_interval_ms, Some(250));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = write_config("");
        let config = load_file_config(Some(file.path())).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("[server]\nmax_size = 10\n");
        let err = load_file_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn bad_size_string_is_rejected() {
        let file = write_config("[client]\nmax_clip_item_size = \"12 parsecs\"\n");
        assert!(load_file_config(Some(file.path())).is_err());
    }

    #[test]
    fn server_flags_override_file_which_overrides_defaults() {
        let args = ServerArgs {
            port: Some(8000),
            ..ServerArgs::default()
        };
        let file = ServerSection {
            host: Some("0.0.0.0".into()),
            port: Some(9000),
            ..ServerSection::default()
        };

        let config = resolve_server_config(&args, &file);

        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_clipboard_size, ByteSize::bytes(5_000_000));
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn client_defaults_apply_without_flags_or_file() {
        let config = resolve_client_config(&ClientArgs::default(), &ClientSection::default());
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn client_sync_interval_flag_wins() {
        let args = ClientArgs {
            sync_interval: Some(1),
            ..ClientArgs::default()
        };
        let file = ClientSection {
            sync_interval_secs: Some(30),
            poll_interval_ms: Some(100),
            ..ClientSection::default()
        };

        let config = resolve_client_config(&args, &file);

        assert_eq!(config.sync_interval, Duration::from_secs(1));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }
}
