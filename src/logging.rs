//! Structured logging for the image loader.
//!
//! The loader itself only emits `tracing` events and spans (one
//! `esp_app_load` span per load). Standalone tools and tests install a
//! subscriber through [`init_tracing`] or [`init_tracing_json`]; a host that
//! already owns the global subscriber keeps it, since installation here never
//! replaces an existing one.

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "espapp=info";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines with span close events
    #[default]
    Text,
    /// One JSON object per event, including the current span
    Json,
}

/// Install the global subscriber once, in `format`.
///
/// Later calls are no-ops, whatever format they ask for.
pub fn init_tracing_with(format: LogFormat) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let registry = tracing_subscriber::registry().with(filter);

        let installed = match format {
            LogFormat::Text => registry
                .with(
                    fmt::layer()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_target(true)
                        .with_line_number(true),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_target(true)
                        .with_current_span(true),
                )
                .try_init(),
        };

        match installed {
            Ok(()) => info!(?format, "espapp tracing initialized"),
            Err(_) => debug!("Global subscriber already set, keeping it"),
        }
    });
}

/// Text output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    init_tracing_with(LogFormat::Text);
}

/// JSON output for log collectors.
pub fn init_tracing_json() {
    init_tracing_with(LogFormat::Json);
}

/// Open an info-level span.
#[macro_export]
macro_rules! span_trace {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Log an error value at error level and hand it back.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let e = $err;
        tracing::error!(error = %e, "Load failed");
        e
    }};
    ($err:expr, $ctx:expr) => {{
        let e = $err;
        tracing::error!(error = %e, context = $ctx, "Load failed");
        e
    }};
}
