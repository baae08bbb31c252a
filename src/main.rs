use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use bookstore_queries::{Config, QueryRunner};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        "Running query catalogue against {}.{}",
        config.database,
        config.collection
    );

    QueryRunner::new(config)
        .run()
        .await
        .context("Query catalogue failed")?;

    Ok(())
}
