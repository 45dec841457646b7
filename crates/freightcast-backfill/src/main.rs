use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use freightcast_backfill::{run_backfill, DistanceResolver, NominatimGeocoder};
use freightcast_models::FreightcastConfig;
use freightcast_store::{Catalog, SqliteStore};

#[derive(Parser, Debug)]
#[command(
    name = "freightcast-backfill",
    about = "Fill in missing route distances on historical freight quotes via geocoding"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/freightcast.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config: {}", cli.config))?;
    let config: FreightcastConfig =
        toml::from_str(&config_str).with_context(|| "Failed to parse config")?;

    let store = SqliteStore::open(&config.store.sqlite_path)
        .with_context(|| format!("Failed to open quote store: {}", config.store.sqlite_path))?;
    let catalog = Catalog::new(
        Box::new(store),
        Duration::from_secs(config.cache.catalog_ttl_seconds),
    );

    let geocoder =
        NominatimGeocoder::new(&config.geocoding).with_context(|| "Failed to build geocoder")?;
    let resolver = DistanceResolver::from_config(Arc::new(geocoder), &config.geocoding);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received shutdown signal");
            cancel.cancel();
        });
    }

    let (report, _) = run_backfill(&catalog, &resolver, &cancel)
        .await
        .map_err(|e| anyhow::anyhow!("Backfill error: {e}"))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
