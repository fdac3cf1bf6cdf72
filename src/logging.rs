use crate::config::LoggingConfig;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}

/// Console output plus a JSON file that rolls daily under `config.dir`.
///
/// The returned guard flushes the file writer when dropped, so hold it until
/// the process exits.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    if let Err(e) = fs::create_dir_all(&config.dir) {
        // No file sink; diagnostics still reach the console
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
            .init();
        tracing::warn!("Log directory {} unavailable: {}", config.dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.dir, &config.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt::layer().json().with_writer(writer))
        .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
        .init();
    Some(guard)
}
