//! Log setup for the relver binary.
//!
//! Everything is written to stderr; stdout carries only the JSON result
//! envelope.

use std::io;
use std::sync::OnceLock;
pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Crates whose events pass the default filter.
const OWN_CRATES: [&str; 3] = ["relver", "relver_release", "relver_github"];

/// `--format` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TracingFormat {
    /// Multi-line output for reading a single run locally
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event; also switches results to JSON envelopes
    Json,
}

/// `--level` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[allow(missing_docs)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Settings for [`init_tracing`].
#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    /// Event layout
    pub format: TracingFormat,
    /// Minimum level for relver's own crates when `RUST_LOG` is unset
    pub level: Level,
}

static CORRELATION_ID: OnceLock<Uuid> = OnceLock::new();

/// Identifier attached to this run's logs, created on first use.
pub fn correlation_id() -> Uuid {
    *CORRELATION_ID.get_or_init(Uuid::new_v4)
}

/// `crate=level` for each of relver's crates. Dependencies stay silent.
#[must_use]
pub fn default_directive(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    OWN_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// default directive entirely.
///
/// # Errors
///
/// Fails when the filter does not parse or a subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> miette::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(config.level))
            .map_err(|e| miette::miette!("Invalid log filter: {e}"))?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    let installed = match config.format {
        TracingFormat::Pretty => registry.with(layer.pretty()).try_init(),
        TracingFormat::Compact => registry.with(layer.compact().with_target(false)).try_init(),
        TracingFormat::Json => registry.with(layer.json().with_current_span(true)).try_init(),
    };
    installed.map_err(|e| miette::miette!("Could not install log subscriber: {e}"))?;

    tracing::debug!(
        correlation_id = %correlation_id(),
        version = env!("CARGO_PKG_VERSION"),
        format = ?config.format,
        "Logging ready"
    );
    Ok(())
}
