use crate::constants::{
    AWS_URL, DEFAULT_DB_PATH, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_LOG_DIR, DEFAULT_LOG_FILE,
    DEFAULT_LOG_FILTER, DEFAULT_METRICS_JOB, DEFAULT_OUTPUT_DIR, DEFAULT_PORT, DEFAULT_RUN_LOG,
    DEFAULT_SNAPSHOT_PREFIX, NVIDIA_URL, UIPATH_URL,
};
use crate::error::{Result, ScraperError};
use crate::types::Source;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub output: OutputConfig,
    pub fetch: FetchConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub snapshot_prefix: String,
    pub run_log: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

/// Diagnostic logging. `RUST_LOG` wins over `default_filter` when set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
    pub default_filter: String,
}

/// Where `run` pushes its metrics. Nothing is pushed without a gateway URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub pushgateway_url: Option<String>,
    pub job: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub url: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            snapshot_prefix: DEFAULT_SNAPSHOT_PREFIX.to_string(),
            run_log: PathBuf::from(DEFAULT_RUN_LOG),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_LOG_FILE.to_string(),
            default_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            pushgateway_url: None,
            job: DEFAULT_METRICS_JOB.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let sources = [
            (Source::UiPath, UIPATH_URL),
            (Source::Nvidia, NVIDIA_URL),
            (Source::Aws, AWS_URL),
        ]
        .into_iter()
        .map(|(source, url)| SourceConfig {
            id: source.api_name().to_string(),
            url: url.to_string(),
            enabled: true,
        })
        .collect();

        Self {
            store: StoreConfig::default(),
            output: OutputConfig::default(),
            fetch: FetchConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
            sources,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to built-in defaults
    /// when the file does not exist. Environment overrides are applied last.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ScraperError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            info!("Loaded configuration from {}", path.display());
            Self::from_toml_str(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for source in &self.sources {
            if Source::from_api_name(&source.id).is_none() {
                return Err(ScraperError::Config(format!(
                    "Unknown source id '{}'",
                    source.id
                )));
            }
        }
        if self.fetch.timeout_seconds == 0 {
            return Err(ScraperError::Config(
                "fetch.timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("EVENTS_DB_PATH") {
            if !path.trim().is_empty() {
                self.store.path = PathBuf::from(path);
            }
        }
        if let Ok(dir) = std::env::var("EVENTS_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output.dir = PathBuf::from(dir);
            }
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(url) = std::env::var("EVENTS_PUSHGATEWAY_URL") {
            if !url.trim().is_empty() {
                self.metrics.pushgateway_url = Some(url);
            }
        }
    }

    /// Enabled sources in configured order, optionally restricted to `only`.
    pub fn enabled_sources(&self, only: Option<&[Source]>) -> Vec<(Source, String)> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .filter_map(|s| Source::from_api_name(&s.id).map(|source| (source, s.url.clone())))
            .filter(|(source, _)| only.map_or(true, |wanted| wanted.contains(source)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_sources() {
        let config = Config::default();
        let sources: Vec<Source> = config
            .enabled_sources(None)
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        assert_eq!(sources, vec![Source::UiPath, Source::Nvidia, Source::Aws]);
        assert_eq!(config.fetch.timeout_seconds, 20);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [store]
            path = "/tmp/events.db"

            [[sources]]
            id = "nvidia"
            url = "http://localhost:9000/nvidia.json"

            [[sources]]
            id = "aws"
            url = "http://localhost:9000/aws.json"
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.store.path, PathBuf::from("/tmp/events.db"));
        assert_eq!(config.output.snapshot_prefix, "all_partner_events");
        assert_eq!(config.logging.file_name, "partner_events.log");
        assert_eq!(config.metrics.pushgateway_url, None);
        assert_eq!(config.metrics.job, "partner_events");
        assert_eq!(
            config.enabled_sources(None),
            vec![(Source::Nvidia, "http://localhost:9000/nvidia.json".to_string())]
        );
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[sources]]
            id = "ticketmaster"
            url = "http://example.com"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ticketmaster"));
    }

    #[test]
    fn source_filter_restricts_selection() {
        let config = Config::default();
        let only = [Source::Aws];
        let selected = config.enabled_sources(Some(&only));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].0, Source::Aws);
    }
}
