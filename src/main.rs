//! tap-iterable CLI
//!
//! Extracts records from the Iterable API and emits them as line-delimited
//! messages on stdout.

use clap::Parser;
use tap_iterable::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    // Initialize logging on stderr; stdout carries the record messages.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
