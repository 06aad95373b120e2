#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the hazard document transformer.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use elk_catalog::client::HttpCatalogClient;
use elk_transform::{
    DEFAULT_CONCURRENCY, Transformer, load_documents, select_enrichment_service, write_output,
};

#[derive(Parser)]
#[command(
    name = "elk_transform",
    about = "Consolidate hazard extraction documents into one catalog payload"
)]
struct Cli {
    /// Directory holding the extraction documents (`*.json`)
    #[arg(long, default_value = "output/json")]
    input_dir: PathBuf,

    /// Directory the consolidated payload is written to
    #[arg(long, default_value = "output/transformed")]
    output_dir: PathBuf,

    /// Catalog API base URL; catalog resolution is skipped when unset
    #[arg(long, env = "ELK_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Timeout in seconds for catalog and enrichment requests
    #[arg(long, default_value_t = 5.0)]
    api_timeout: f64,

    /// Google Maps API key used by the `google_places` enrichment service
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    google_maps_key: Option<String>,

    /// Enrichment service id (e.g., "`google_places`", "`nominatim`").
    /// Defaults to the first enabled service whose requirements are met.
    #[arg(long)]
    enrichment: Option<String>,

    /// Disable location enrichment entirely
    #[arg(long, conflicts_with = "enrichment")]
    no_enrichment: bool,

    /// Maximum number of concurrent catalog searches
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .try_init()?;

    let timeout = Duration::try_from_secs_f64(cli.api_timeout)
        .map_err(|e| format!("Invalid --api-timeout {}: {e}", cli.api_timeout))?;

    let mut transformer = Transformer::new();

    match cli.api_base_url.as_deref().map(str::trim) {
        Some(base_url) if !base_url.is_empty() => {
            let client = HttpCatalogClient::new(base_url, timeout)?;
            log::info!("Resolving against catalog at {}", client.base_url());
            transformer = transformer.with_catalog(Arc::new(client), cli.concurrency);
        }
        _ => log::info!("No catalog API configured; skipping resolution"),
    }

    if cli.no_enrichment {
        log::info!("Enrichment disabled");
    } else {
        let api_key = cli.google_maps_key.as_deref();
        match select_enrichment_service(cli.enrichment.as_deref(), api_key)? {
            Some(service) => {
                let lookup = elk_geocoder::build_lookup(&service, api_key, timeout)?;
                log::info!("Enriching locations with {}", service.name);
                transformer = transformer.with_enrichment(
                    lookup,
                    cli.concurrency.min(service.concurrent_requests()),
                );
            }
            None => log::info!("No enrichment service available; skipping enrichment"),
        }
    }

    let documents = load_documents(&cli.input_dir)?;
    if documents.is_empty() {
        log::warn!("No documents found in {}", cli.input_dir.display());
    }

    let output = transformer.transform_documents(&documents).await;
    let path = write_output(&cli.output_dir, &output, chrono::Utc::now())?;

    log::info!(
        "Wrote {} location(s) and {} hazard(s) to {}",
        output.locations.len(),
        output.hazards.len(),
        path.display()
    );

    Ok(())
}
