//! Logging infrastructure for diagram generation
//!
//! Structured logging goes through the `tracing` crate. The library only
//! emits spans and events; installing a subscriber is left to the host, and
//! [`init_logging`] is the convenience used by the CLI.
//!
//! # Usage
//!
//! ```rust
//! use classgraph::core::logging::init_logging;
//!
//! // Defaults (info level, compact format), ignoring a second initialization
//! let _ = init_logging(None, None);
//! ```
//!
//! # Spans
//!
//! Each pipeline stage runs inside its own span:
//!
//! - `build_model`: declaration traversal and shell creation
//! - `resolve_relations`: inheritance, aggregation and return edges
//! - `render_diagram`: PlantUML serialization
//! - `write_output`: replacing the output artifact
//!
//! # Environment Variables
//!
//! - `CLASSGRAPH_LOG_LEVEL`: log level (trace|debug|info|warn|error|off)
//! - `CLASSGRAPH_LOG_FORMAT`: log format (compact|pretty|json)
//! - `RUST_LOG`: full `EnvFilter` directives, e.g.
//!   `RUST_LOG="info,classgraph::diagram::relations=trace"`

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Environment variable consulted for the log level
pub const LOG_LEVEL_ENV: &str = "CLASSGRAPH_LOG_LEVEL";

/// Environment variable consulted for the log format
pub const LOG_FORMAT_ENV: &str = "CLASSGRAPH_LOG_FORMAT";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Filter directive: explicit level, `CLASSGRAPH_LOG_LEVEL`, `RUST_LOG`, then `info`
fn filter_directive(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .unwrap_or_else(|| "info".to_string())
}

fn build_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_new(filter_directive(level)).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing subscriber with the given log level and format
///
/// `level` falls back to `CLASSGRAPH_LOG_LEVEL`, then `RUST_LOG`, then `info`.
/// `format` falls back to `CLASSGRAPH_LOG_FORMAT`, then `compact`.
///
/// Returns an error for an unknown format or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(level);

    let format = match format
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_FORMAT_ENV).ok())
    {
        Some(name) => {
            LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e))?
        }
        None => LogFormat::default(),
    };

    // Logs go to stderr so that diagram text on stdout stays clean
    match format {
        LogFormat::Compact => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_level(true)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .json(),
                )
                .try_init()?;
        }
    }

    Ok(())
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
