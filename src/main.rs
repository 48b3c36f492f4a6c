use anyhow::Result;
use clap::Parser;

mod bootstrap;
mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    bootstrap::init_tracing_subscriber(cli.log_dir.as_deref())?;
    let file = bootstrap::load_file_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Server(args) => {
            bootstrap::run_server(bootstrap::resolve_server_config(&args, &file.server)).await
        }
        Commands::Client(args) => {
            bootstrap::run_client(bootstrap::resolve_client_config(&args, &file.client)).await
        }
    }
}
