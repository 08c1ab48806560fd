//! Groom Campaigns: campaign validation and audience preview service for
//! the grooming salon admin console.
//!
//! Main entry point that loads configuration, connects the customer
//! population and starts the server.

use std::sync::Arc;

use campaign_api::ApiServer;
use campaign_core::config::AppConfig;
use campaign_core::loyalty::VisitThresholdRule;
use campaign_segmentation::{
    CustomerSource, DisconnectedSource, InMemoryCustomerSource, RecordsCustomerSource,
};
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "groom-campaigns")]
#[command(about = "Campaign validation and audience preview service")]
#[command(version)]
struct Cli {
    /// Bind address (overrides config)
    #[arg(long, env = "GROOM_CAMPAIGNS__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "GROOM_CAMPAIGNS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// JSON file with the annotated customer population (overrides config)
    #[arg(long, env = "GROOM_CAMPAIGNS__PREVIEW__POPULATION_FILE")]
    population_file: Option<String>,

    /// JSON file with raw customer, appointment and membership rows (overrides config)
    #[arg(long, env = "GROOM_CAMPAIGNS__PREVIEW__RECORDS_FILE")]
    records_file: Option<String>,

    /// Skip the Prometheus exporter
    #[arg(long, default_value_t = false)]
    no_metrics: bool,
}

/// Raw records win over a pre-annotated population; without either,
/// previews report unavailable.
fn customer_source(config: &AppConfig) -> Arc<dyn CustomerSource> {
    let preview = &config.preview;
    let loaded = if let Some(path) = &preview.records_file {
        let rule = VisitThresholdRule::from(&config.loyalty);
        RecordsCustomerSource::from_json_file(path, rule)
            .map(|source| Arc::new(source) as Arc<dyn CustomerSource>)
            .map_err(|e| (path, e))
    } else if let Some(path) = &preview.population_file {
        InMemoryCustomerSource::from_json_file(path)
            .map(|source| Arc::new(source) as Arc<dyn CustomerSource>)
            .map_err(|e| (path, e))
    } else {
        warn!("No customer data configured, previews unavailable");
        return Arc::new(DisconnectedSource);
    };

    loaded.unwrap_or_else(|(path, e)| {
        error!(error = %e, path = %path, "Failed to load customer data, previews unavailable");
        let fallback: Arc<dyn CustomerSource> = Arc::new(DisconnectedSource);
        fallback
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "groom_campaigns=info,campaign_management=info,campaign_segmentation=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Groom Campaigns starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(path) = cli.population_file {
        config.preview.population_file = Some(path);
    }
    if let Some(path) = cli.records_file {
        config.preview.records_file = Some(path);
    }

    info!(
        host = %config.api.host,
        http_port = config.api.http_port,
        sample_size = config.preview.sample_size,
        loyalty_visits = config.loyalty.visits_required,
        "Configuration loaded"
    );

    let source = customer_source(&config);

    let api_server = ApiServer::new(config.clone(), source);

    if !cli.no_metrics {
        if let Err(e) = api_server.start_metrics() {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Groom Campaigns is ready to serve traffic");

    // Blocks until shutdown
    api_server.start_http().await?;

    Ok(())
}
