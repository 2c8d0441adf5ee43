use clap::Parser;
use tracing_subscriber::EnvFilter;

use photo_edit_lib::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    photo_edit_lib::run(Cli::parse()).await
}
