//! # Profiling and logging output
//!
//! The world emits `tracing` events for entity creation, removal, bucket
//! creation and query scans (`debug`/`trace` level). With the `profiling`
//! feature, world operations are also wrapped in `info_span!`s and this
//! module can install a subscriber:
//!
//! ```toml
//! [dependencies]
//! tag_ecs = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! ```ignore
//! use tag_ecs::profiling::{init_tracing, LogFormat};
//!
//! init_tracing(LogFormat::Pretty)?;
//! // RUST_LOG=tag_ecs=trace to see every query
//! ```
//!
//! Use `RUST_LOG` to pick levels; the default is `info`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{EcsError, Result};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per event
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global subscriber writing to stdout
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| EcsError::InvalidConfig(format!("tracing subscriber: {err}")))
}

/// Install a global JSON subscriber writing to `dir/file_name` off-thread.
///
/// Keep the returned guard alive; dropping it flushes and stops the writer.
pub fn init_file_tracing(dir: impl AsRef<Path>, file_name: &str) -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .json()
        .try_init()
        .map_err(|err| EcsError::InvalidConfig(format!("tracing subscriber: {err}")))?;
    Ok(guard)
}
