//! Logging bootstrap.
//!
//! Human-readable output on stdout, one-line JSON in a daily-rotated file
//! when a log directory is configured. `log` crate macros from leaf modules
//! are bridged into tracing.

use log::LevelFilter;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn init_logger(log_dir: Option<PathBuf>) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_timer(fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_filter(env_filter());

    let file_layer = match &log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = rolling::daily(dir, "autoclaim.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);

            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(env_filter()),
            )
        }
        None => None,
    };

    let subscriber = Registry::default().with(stdout_layer).with(file_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = LOGGER_READY.set(());

    tracing::info!(
        target: "autoclaim::logging",
        version = env!("CARGO_PKG_VERSION"),
        log_dir = log_dir.as_ref().map(|d| d.display().to_string()),
        "Logger initialized"
    );

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,autoclaim=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
