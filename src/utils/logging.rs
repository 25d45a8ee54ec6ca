//! Tracing setup for the binary
//!
//! Console output goes to stderr so stdout stays free for JSON results. When a
//! log file is configured, a second non-blocking layer appends to it.

use crate::{Error, Result, config::LoggingSettings};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive used when `RUST_LOG` is unset
fn filter_directive(settings: &LoggingSettings) -> String {
    if settings.verbose {
        "debug".to_string()
    } else {
        settings.level.clone()
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init_logging(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(settings)))
        .map_err(|e| Error::config(format!("invalid log level '{}': {}", settings.level, e)))?;

    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match settings.file.as_deref() {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| Error::config(format!("log file {:?} has no file name", path)))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::internal(format!("logging already initialized: {}", e)))?;

    Ok(guard)
}
