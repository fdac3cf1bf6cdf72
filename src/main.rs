use anyhow::Context;
use clap::{Parser, Subcommand};
use partner_events::config::{Config, DEFAULT_CONFIG_PATH};
use partner_events::constants;
use partner_events::infra::http_client::ReqwestFetcher;
use partner_events::logging;
use partner_events::observability::metrics;
use partner_events::pipeline::{Pipeline, RunReporter, SnapshotWriter, SourceTarget};
use partner_events::server;
use partner_events::storage::SqliteCatalog;
use partner_events::types::Source;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "partner_events")]
#[command(about = "Partner webinar and conference catalog")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every source once, export a snapshot and update the catalog
    Run {
        /// Specific sources to run (comma-separated). Available: uipath, nvidia, aws
        #[arg(long)]
        sources: Option<String>,
    },
    /// Serve the read-only events API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Execute a SQL script against the catalog database
    ImportSql {
        /// SQL file to import
        #[arg(long)]
        file: PathBuf,
    },
}

fn parse_sources(list: &str) -> anyhow::Result<Vec<Source>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            Source::from_api_name(name).with_context(|| {
                format!(
                    "Unknown source '{}'. Available: {}",
                    name,
                    constants::get_supported_apis().join(", ")
                )
            })
        })
        .collect()
}

fn run_pipeline(config: &Config, sources: Option<String>) -> anyhow::Result<()> {
    let only = sources.as_deref().map(parse_sources).transpose()?;
    let targets: Vec<SourceTarget> = config
        .enabled_sources(only.as_deref())
        .into_iter()
        .map(|(source, url)| SourceTarget::new(source, url))
        .collect();
    if targets.is_empty() {
        warn!("No enabled sources selected");
    }

    metrics::init();
    let timeout = Duration::from_secs(config.fetch.timeout_seconds);
    let fetcher = ReqwestFetcher::new(timeout)?;
    let pipeline = Pipeline::new(
        targets,
        Box::new(fetcher),
        Box::new(SqliteCatalog::open(&config.store.path)),
        SnapshotWriter::new(&config.output.dir, &config.output.snapshot_prefix),
        RunReporter::new(&config.output.run_log),
    );

    let report = pipeline.run();
    println!("{report}");

    match &config.metrics.pushgateway_url {
        Some(gateway) => {
            if let Err(e) = metrics::push_to_gateway(gateway, &config.metrics.job, timeout) {
                warn!("Metrics push failed: {}", e);
            }
        }
        None => debug!("Run metrics:\n{}", metrics::render()),
    }

    if !report.is_success() {
        anyhow::bail!("run finished with errors; see {}", config.output.run_log.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let _log_guard = logging::init_logging(&config.logging);
    info!("Using configuration {}", cli.config.display());

    match cli.command {
        Commands::Run { sources } => {
            if let Err(e) = run_pipeline(&config, sources) {
                error!("{:#}", e);
                return Err(e);
            }
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let catalog = SqliteCatalog::open(&config.store.path);
            // The scrape path uses blocking reqwest, so only the server gets a runtime
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start_server(catalog, port))?;
        }
        Commands::ImportSql { file } => {
            let script = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read SQL file '{}'", file.display()))?;
            SqliteCatalog::open(&config.store.path).import_sql(&script)?;
            info!("Imported {}", file.display());
        }
    }
    Ok(())
}
