//! mado - list, filter and arrange macOS windows from the command line

use clap::error::ErrorKind;
use clap::Parser;
use mado::{
    cli::{self, MadoCli},
    logging::{init_logging, LogConfig},
    macos::{SystemWindowProvider, WindowProvider},
};
use std::sync::Arc;
use tracing::debug;

/// Exit status for malformed command lines
const USAGE_EXIT_CODE: i32 = 3;

#[tokio::main]
async fn main() {
    let cli = match MadoCli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => USAGE_EXIT_CODE,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let log_config = LogConfig::from_env().with_verbose(cli.verbose);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    debug!("mado v{}", env!("CARGO_PKG_VERSION"));

    let provider: Arc<dyn WindowProvider> = Arc::new(SystemWindowProvider::new());
    let code = cli::run(cli, provider).await;
    std::process::exit(code);
}
