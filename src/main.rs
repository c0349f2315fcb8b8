//! handrig entry point

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use handrig::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, origin) = cli::load_config(cli.config.as_ref())?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("handrig=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Config is read before the subscriber exists, so report where it came from now
    info!("{}", cli::describe_origin(origin.as_deref()));

    cli::execute(cli.command, config, origin).await
}
