use clap::{Parser, Subcommand};
use medibot_agent::{AgentConfig, HttpAgentClient};
use medibot_gateway::GatewayServer;
use medibot_meds::{FileSearchLogStore, MedicationCatalog, MedicationService, SearchLogStore};
use medibot_metrics::{FileMetricsStore, MetricsAggregator};
use medibot_session::{FileSessionStore, FileTranscriptStore, SessionManager};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medibot", about = "MediBot — medical assistance chat backend")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "medibot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Deserialize)]
struct MediBotConfig {
    agent: AgentConfig,
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    /// Static medication reference table, a JSON array of entries.
    #[serde(default = "default_catalog_path")]
    catalog_path: PathBuf,
    #[serde(default)]
    server: ServerConfig,
}

#[derive(Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_catalog_path() -> PathBuf {
    PathBuf::from("./medicamentos.json")
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            cli.config.display(),
            e
        )
    })?;
    let mut config: MediBotConfig = toml::from_str(&config_str)?;

    // The agent key never lives in the config file; .env or the process
    // environment supplies it.
    if config.agent.api_key.is_none() {
        config.agent.api_key = std::env::var("MEDIBOT_AGENT_API_KEY").ok();
    }

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            info!("Starting MediBot backend on {}:{}", host, port);

            let sessions =
                Arc::new(FileSessionStore::new(config.data_dir.join("sesiones")).await?);
            let transcript =
                Arc::new(FileTranscriptStore::new(config.data_dir.join("conversaciones")).await?);
            let metrics_store =
                Arc::new(FileMetricsStore::new(config.data_dir.join("metricas")).await?);
            let search_log: Arc<dyn SearchLogStore> = Arc::new(
                FileSearchLogStore::new(config.data_dir.join("busquedas.jsonl")).await?,
            );

            let catalog = match MedicationCatalog::load(&config.catalog_path).await {
                Ok(catalog) => {
                    info!(
                        entries = catalog.len(),
                        path = %config.catalog_path.display(),
                        "Medication catalog loaded"
                    );
                    catalog
                }
                Err(e) => {
                    warn!(
                        path = %config.catalog_path.display(),
                        error = %e,
                        "Medication catalog unavailable, lookups will find nothing"
                    );
                    MedicationCatalog::from_entries(vec![])
                }
            };

            let agent = Arc::new(HttpAgentClient::new(config.agent)?);
            let metrics = Arc::new(MetricsAggregator::with_default_zone(metrics_store));
            let manager = Arc::new(SessionManager::new(
                sessions,
                transcript,
                agent,
                metrics.clone(),
            ));
            let meds = Arc::new(MedicationService::new(Arc::new(catalog), search_log.clone()));

            let app = GatewayServer::build(manager, metrics, meds, search_log);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("MediBot backend listening on {}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
