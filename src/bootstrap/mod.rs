//! Process bootstrap: logging, configuration and the two run modes.

mod config;
mod logging;
mod run;

pub use config::{load_file_config, resolve_client_config, resolve_server_config};
pub use logging::init_tracing_subscriber;
pub use run::{run_client, run_server};
