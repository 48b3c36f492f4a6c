use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cs_core::ByteSize;

#[derive(Parser, Debug)]
#[command(name = "clipsync", version)]
#[command(about = "Clipboard history sync server and client", long_about = None)]
pub struct Cli {
    /// Config file, defaults to <config_dir>/clipsync/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write logs to daily rolling files in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hold the shared clipboard history
    Server(ServerArgs),
    /// Sync the local clipboard with a server
    Client(ClientArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Byte budget of the history, e.g. 5mb
    #[arg(long, value_name = "SIZE")]
    pub max_clipboard_size: Option<ByteSize>,
}

#[derive(Args, Debug, Default)]
pub struct ClientArgs {
    /// Server to connect to
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Local clips this large or larger are not pushed, e.g. 1mb
    #[arg(long, value_name = "SIZE")]
    pub max_clip_item_size: Option<ByteSize>,

    /// Seconds between two sync cycles
    #[arg(long, value_name = "SECS")]
    pub sync_interval: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_server_flags_with_size_units() {
        let cli = Cli::try_parse_from([
            "clipsync",
            "--log-dir",
            "/tmp/logs",
            "server",
            "--port",
            "9000",
            "--max-clipboard-size",
            "2mb",
        ])
        .unwrap();

        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/logs")));
        match cli.command {
            Commands::Server(args) => {
                assert_eq!(args.host, None);
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.max_clipboard_size, Some(ByteSize::bytes(2_000_000)));
            }
            other => panic!("expected server command, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "clipsync",
            "client",
            "--config",
            "clipsync.toml",
            "--sync-interval",
            "2",
            "--max-clip-item-size",
            "512kb",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("clipsync.toml")));
        match cli.command {
            Commands::Client(args) => {
                assert_eq!(args.sync_interval, Some(2));
                assert_eq!(args.max_clip_item_size, Some(ByteSize::bytes(512_000)));
            }
            other => panic!("expected client command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_size() {
        let err = Cli::try_parse_from(["clipsync", "server", "--max-clipboard-size", "5tb"])
            .unwrap_err();
        assert!(err.to_string().contains("is an invalid string"));
    }
}
