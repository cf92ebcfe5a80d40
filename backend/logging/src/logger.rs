//! Structured Logger
//!
//! Wraps `tracing` with environment-based level control, a console layer on
//! stderr, an optional rolling NDJSON file and an optional live log stream.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::stream::LogStream;

#[derive(Clone, Default)]
pub struct LoggerConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for `dialer.log.YYYY-MM-DD`; no file logging when `None`.
    pub log_dir: Option<PathBuf>,
    /// Emit console lines as JSON instead of plain text.
    pub json: bool,
    pub stream: Option<LogStream>,
}

impl LoggerConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }
}

/// Initialize the global structured logger. Later calls are ignored.
pub fn init_logger(config: LoggerConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (console_text, console_json) = if config.json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(true),
            ),
            None,
        )
    };

    let file_layer = config.log_dir.map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, "dialer.log");
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    let stream_layer = config.stream.as_ref().map(LogStream::layer);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_text)
        .with(console_json)
        .with(file_layer)
        .with(stream_layer)
        .try_init();
}
