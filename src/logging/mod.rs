//! Tracing subscriber setup.
//!
//! Production deployments ship JSON lines to the log collector; everywhere
//! else a colored, human-readable format is used. `LOG_FORMAT` forces either.

use crate::config::get_environment;
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Explicit `override_format` wins; otherwise JSON for `production|prod`.
    pub fn resolve(environment: &str, override_format: Option<&str>) -> Self {
        match override_format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | Some("text") => LogFormat::Pretty,
            _ if matches!(environment, "production" | "prod") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
/// A second call leaves the first subscriber in place.
pub fn init_logging() {
    let format = LogFormat::resolve(&get_environment(), env::var("LOG_FORMAT").ok().as_deref());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Logging already initialized");
    }
}
