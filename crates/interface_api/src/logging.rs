//! Log sinks
//!
//! Console output plus four JSON-lines files under `log_dir`:
//!
//! | file | contents | rotation |
//! |---|---|---|
//! | `combined.log` | every record | 5 MiB, 5 files |
//! | `error.log` | ERROR records | 5 MiB, 5 files |
//! | `exceptions.log` | target `exceptions` (panic hook) | none |
//! | `access.log` | target `access` (failed requests) | none |

use std::any::Any;
use std::io;
use std::path::Path;

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::ApiConfig;

/// Target of records written to `access.log`
pub const ACCESS_TARGET: &str = "access";
/// Target of records written to `exceptions.log`
pub const EXCEPTIONS_TARGET: &str = "exceptions";

const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
const MAX_FILES: usize = 5;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to prepare log directory: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Flushes the file writers when dropped; keep alive for the process lifetime
#[must_use = "dropping the guards stops the file writers"]
pub struct LogGuards(#[allow(dead_code)] Vec<WorkerGuard>);

fn rotating(dir: &Path, name: &str) -> FileRotate<AppendCount> {
    FileRotate::new(
        dir.join(name),
        AppendCount::new(MAX_FILES),
        ContentLimit::Bytes(MAX_FILE_BYTES),
        Compression::None,
        #[cfg(unix)]
        None,
    )
}

fn writer(inner: impl io::Write + Send + 'static, guards: &mut Vec<WorkerGuard>) -> NonBlocking {
    let (writer, guard) = tracing_appender::non_blocking(inner);
    guards.push(guard);
    writer
}

/// Installs the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &ApiConfig) -> Result<LogGuards, LoggingError> {
    let dir = Path::new(&config.log_dir);
    std::fs::create_dir_all(dir)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.effective_log_level())?,
    };

    let mut guards = Vec::new();
    let combined = writer(rotating(dir, "combined.log"), &mut guards);
    let errors = writer(rotating(dir, "error.log"), &mut guards);
    let exceptions = writer(tracing_appender::rolling::never(dir, "exceptions.log"), &mut guards);
    let access = writer(tracing_appender::rolling::never(dir, "access.log"), &mut guards);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().json().with_ansi(false).with_writer(combined))
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(errors)
                .with_filter(LevelFilter::ERROR),
        )
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(exceptions)
                .with_filter(filter_fn(|meta| meta.target() == EXCEPTIONS_TARGET)),
        )
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(access)
                .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET)),
        )
        .try_init()?;

    Ok(LogGuards(guards))
}

/// Logs every panic to the exceptions sink with its location and backtrace
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let backtrace = std::backtrace::Backtrace::force_capture();

        tracing::error!(
            target: EXCEPTIONS_TARGET,
            error = %message,
            location = %location,
            stack = %backtrace,
            "Uncaught exception"
        );
    }));
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
