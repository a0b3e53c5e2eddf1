//! Logging setup for notekeeper.
//!
//! Application events go through `tracing` to stderr. Each HTTP request gets
//! a span and one completion event from [`http_trace_layer`], logged under
//! the `tower_http` target so `RUST_LOG` can tune requests separately from
//! storage and handler logs.

use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, HttpMakeClassifier, TraceLayer,
};
use tower_http::LatencyUnit;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the service logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only, request log off.
    Quiet,
    /// Service events at info, one line per request.
    #[default]
    Normal,
    /// Debug service events, including store operations.
    Verbose,
    /// Everything, including request and response headers.
    Trace,
}

impl Verbosity {
    /// Level for notekeeper's own events.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// The `EnvFilter` directive used when `RUST_LOG` is unset.
    ///
    /// The request log stays at info under `-v`; header dumps only come
    /// with `-vv`.
    #[must_use]
    pub fn default_directive(self) -> String {
        let http = match self {
            Self::Quiet => Level::ERROR,
            Self::Normal | Self::Verbose => Level::INFO,
            Self::Trace => Level::TRACE,
        };
        format!("notekeeper={},tower_http={http}", self.level())
    }
}

/// Initialize the global subscriber.
///
/// Call once at startup. `RUST_LOG` takes precedence over `verbosity`.
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(verbosity != Verbosity::Normal)
            .with_line_number(verbosity == Verbosity::Trace),
    );

    // Already set (tests, embedding) is fine
    let _ = subscriber.try_init();
}

/// Request logging for the HTTP router.
///
/// Spans carry method and URI; headers are recorded only when the filter
/// admits `tower_http` at trace. Completed responses log at info with their
/// latency in milliseconds, server errors at warn.
#[must_use]
pub fn http_trace_layer() -> TraceLayer<HttpMakeClassifier> {
    TraceLayer::new_for_http()
        .make_span_with(
            DefaultMakeSpan::new()
                .level(Level::INFO)
                .include_headers(tracing::enabled!(target: "tower_http", Level::TRACE)),
        )
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::WARN)
                .latency_unit(LatencyUnit::Millis),
        )
}
