use std::io::Read;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use freightcast_models::config::FreightcastConfig;
use freightcast_models::{EstimationRequest, NewQuote, Session};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "freightcast",
    about = "Freight quote estimation from historical quotes"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/freightcast.toml")]
    config: String,

    /// Pretty-print the output JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate freight for a route, cargo type, modality and weight
    Estimate(EstimateArgs),
    /// Import historical quotes from a JSON array
    Import {
        /// JSON file with quotes; stdin when omitted
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List recently issued estimates
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// List the origins, destinations, cargo types and modalities on record
    Options,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// User the estimate is issued to
    #[arg(short, long, default_value = "anonymous")]
    user: String,

    #[arg(long, requires_all = ["destination", "cargo_type", "modality", "weight_kg"])]
    origin: Option<String>,

    #[arg(long)]
    destination: Option<String>,

    #[arg(long)]
    cargo_type: Option<String>,

    #[arg(long)]
    modality: Option<String>,

    #[arg(long)]
    weight_kg: Option<f64>,

    /// Read EstimationRequest JSON from a file instead of flags or stdin
    #[arg(short, long, conflicts_with = "origin")]
    input: Option<String>,
}

impl EstimateArgs {
    fn request(&self) -> Result<EstimationRequest> {
        if let (Some(origin), Some(destination), Some(cargo_type), Some(modality), Some(weight_kg)) = (
            &self.origin,
            &self.destination,
            &self.cargo_type,
            &self.modality,
            self.weight_kg,
        ) {
            return Ok(EstimationRequest {
                origin_city: origin.clone(),
                destination_city: destination.clone(),
                cargo_type: cargo_type.clone(),
                modality: modality.clone(),
                weight_kg,
            });
        }

        let json = read_input(self.input.as_deref())?;
        serde_json::from_str(&json).context("Failed to parse EstimationRequest JSON")
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read input: {path}"))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Respects RUST_LOG; stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config: {}", cli.config))?;
    let config: FreightcastConfig =
        toml::from_str(&config_str).with_context(|| "Failed to parse config")?;

    let quoter = freightcast::build_quoter(&config).context("Failed to build quoter")?;

    match &cli.command {
        Command::Estimate(args) => {
            let request = args.request()?;
            let session = Session::new(args.user.clone());
            let response = quoter
                .quote(&session, &request)
                .await
                .context("Estimation failed")?;

            if response.outcome.estimation().is_none() {
                eprintln!(
                    "No comparable quotes for {} -> {} ({}, {}).",
                    request.origin_city,
                    request.destination_city,
                    request.cargo_type,
                    request.modality
                );
                for hint in &response.suggestions {
                    eprintln!("  - {hint}");
                }
            }
            for warning in &response.warnings {
                eprintln!("warning: {warning}");
            }
            print_json(&response, cli.pretty)?;
        }
        Command::Import { input } => {
            let json = read_input(input.as_deref())?;
            let quotes: Vec<NewQuote> =
                serde_json::from_str(&json).context("Failed to parse quotes JSON")?;
            let ids = quoter.import(&quotes).await.context("Import failed")?;
            print_json(&serde_json::json!({ "imported": ids.len(), "ids": ids }), cli.pretty)?;
        }
        Command::History { limit } => {
            let issued = quoter.history(*limit).context("Failed to read history")?;
            print_json(&issued, cli.pretty)?;
        }
        Command::Options => {
            let options = quoter.options().await.context("Failed to read catalog")?;
            print_json(&options, cli.pretty)?;
        }
    }

    Ok(())
}
