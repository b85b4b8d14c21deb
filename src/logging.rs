//! Tracing subscriber setup shared by the binaries.
//!
//! Writing logs to the terminal would corrupt the TUI (alternate screen), so
//! the interactive binary logs to a file unless told otherwise.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::sanitize::SanitizingMakeWriter;
use crate::config::AppConfig;

/// Destination of log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    File(PathBuf),
    Stdout,
    Stderr,
}

impl LogSink {
    /// Sink for the interactive binary: a file when stdout is a terminal
    /// (or `HEARTRISK_LOG_MODE=file`), stdout otherwise.
    #[must_use]
    pub fn for_tui(config: &AppConfig) -> Self {
        if config.log_mode.use_file(std::io::stdout().is_terminal()) {
            Self::File(config.log_file.clone())
        } else {
            Self::Stdout
        }
    }
}

/// Install the global subscriber: `EnvFilter` (default `info`) and a fmt
/// layer writing through the sanitizer to a non-blocking sink.
///
/// The returned guard flushes pending lines on drop; keep it alive for the
/// life of the process.
///
/// # Errors
/// Returns error if the log file cannot be opened.
pub fn init(sink: LogSink) -> std::io::Result<WorkerGuard> {
    let ansi = !matches!(sink, LogSink::File(_));
    let (writer, guard) = match sink {
        LogSink::File(path) => {
            if let Some(parent) = path.parent() {
                // Best-effort: a missing directory surfaces as an open error below.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_appender::non_blocking(file)
        }
        LogSink::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogSink::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(ansi)
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    Ok(guard)
}
