use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brook::app::AppContext;
use brook::cli::{commands, Cli};
use brook::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("brook=info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let mut ctx = AppContext::new(config, cli.db)?;

    commands::dispatch(&mut ctx, cli.command).await?;

    Ok(())
}
