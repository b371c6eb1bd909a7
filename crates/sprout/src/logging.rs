//! Tracing subscriber setup.
//!
//! The toolkit itself only emits `tracing` events (at `debug` level, and only
//! when [`AppConfig::debug`](crate::AppConfig) is set). Binaries decide where
//! those events go by installing a subscriber, usually once in `main`:
//!
//! ```ignore
//! fn main() {
//!     sprout::logging::init_subscriber().ok();
//!     // build and run the app
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG=debug` - Enable debug events, including dispatch tracing
//! - `RUST_LOG=sprout=debug,myapp=info` - Per-module filtering

use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event, no timestamps.
    #[default]
    Compact,
    /// Multi-line, human-oriented output.
    Pretty,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogWriter {
    #[default]
    Stderr,
    Stdout,
}

/// Subscriber configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Level filter. `None` defers to `RUST_LOG`, falling back to `info`.
    pub level: Option<Level>,
    pub format: LogFormat,
    /// Include the event target (module path).
    pub target: bool,
    pub writer: LogWriter,
}

impl LogConfig {
    /// Debug level, compact, to stderr. Used by [`App::run`](crate::App::run)
    /// when the app is in debug mode.
    pub fn debug() -> Self {
        Self {
            level: Some(Level::DEBUG),
            ..Default::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        match self.level {
            Some(level) => EnvFilter::new(level.to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        }
    }
}

/// Builds a subscriber for `config` writing through `make_writer`, without
/// installing it.
///
/// Pair it with `tracing::subscriber::with_default` to capture events in
/// tests:
///
/// ```rust
/// use sprout::logging::{build_subscriber, LogConfig};
/// use sprout::Buffer;
///
/// let buffer = Buffer::new();
/// let sink = buffer.clone();
/// let subscriber = build_subscriber(&LogConfig::debug(), move || sink.clone());
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::debug!(app = "tool", "hello");
/// });
/// assert!(buffer.contents().contains("hello"));
/// ```
pub fn build_subscriber<W>(config: &LogConfig, make_writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(config.target);
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Compact => Box::new(fmt.compact().without_time()),
        LogFormat::Pretty => Box::new(fmt.pretty()),
    };
    tracing_subscriber::registry()
        .with(layer)
        .with(config.filter())
}

/// Installs the global subscriber from `RUST_LOG` (default `info`), writing
/// compact lines to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init_subscriber() -> Result<(), TryInitError> {
    init_subscriber_with_config(LogConfig::default())
}

/// Installs the global subscriber described by `config`.
pub fn init_subscriber_with_config(config: LogConfig) -> Result<(), TryInitError> {
    let writer = match config.writer {
        LogWriter::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogWriter::Stdout => BoxMakeWriter::new(std::io::stdout),
    };
    build_subscriber(&config, writer).try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Buffer;

    fn capture(config: &LogConfig, f: impl FnOnce()) -> String {
        let buffer = Buffer::new();
        let sink = buffer.clone();
        let subscriber = build_subscriber(config, move || sink.clone());
        tracing::subscriber::with_default(subscriber, f);
        buffer.contents()
    }

    #[test]
    fn test_debug_config_keeps_debug_events() {
        let output = capture(&LogConfig::debug(), || {
            tracing::debug!(app = "tool", "dispatch started");
        });
        assert!(output.contains("dispatch started"));
        assert!(output.contains("app=\"tool\"") || output.contains("app=tool"));
    }

    #[test]
    fn test_level_filters_events() {
        let config = LogConfig {
            level: Some(Level::WARN),
            ..Default::default()
        };
        let output = capture(&config, || {
            tracing::info!("quiet");
            tracing::warn!("loud");
        });
        assert!(!output.contains("quiet"));
        assert!(output.contains("loud"));
    }

    #[test]
    fn test_pretty_format() {
        let config = LogConfig {
            level: Some(Level::INFO),
            format: LogFormat::Pretty,
            ..Default::default()
        };
        let output = capture(&config, || tracing::info!("pretty line"));
        assert!(output.contains("pretty line"));
    }
}
