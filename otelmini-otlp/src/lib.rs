//! OTLP exporters for the `otelmini` SDK.
//!
//! Sends spans, metrics and logs to an OTLP collector over gRPC
//! (`grpc-tonic` feature, default endpoint `http://127.0.0.1:4317`) or
//! HTTP/JSON (`http-json` feature, default endpoint
//! `http://localhost:4318/v1/<signal>`). Every exporter runs its attempts
//! through the SDK's [`Retrier`](otelmini::retry::Retrier) with the OTLP
//! retry classification, and recreates its gRPC channel after retryable
//! failures so a collector restart does not strand the pipeline.
//!
//! ```no_run
//! use otelmini::trace::SdkTracerProvider;
//! use otelmini_otlp::WithExportConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let exporter = otelmini_otlp::new_exporter()
//!     .http()
//!     .with_endpoint("http://localhost:4318")
//!     .build_span_exporter()?;
//!
//! let provider = SdkTracerProvider::builder()
//!     .with_batch_exporter(exporter)
//!     .build();
//! # drop(provider);
//! # Ok(())
//! # }
//! ```
#![warn(unreachable_pub, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod exporter;
pub mod retry_classification;

#[cfg(feature = "serialize")]
#[cfg_attr(docsrs, doc(cfg(feature = "serialize")))]
mod console;

mod selection;

pub use exporter::{ExportConfig, HasExportConfig, WithExportConfig};

#[cfg(feature = "grpc-tonic")]
#[cfg_attr(docsrs, doc(cfg(feature = "grpc-tonic")))]
pub use exporter::tonic::TonicExporterBuilder;

#[cfg(any(feature = "http-json", feature = "http-proto"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "http-json", feature = "http-proto"))))]
pub use exporter::http::HttpExporterBuilder;

#[cfg(all(
    feature = "trace",
    any(feature = "grpc-tonic", feature = "http-json", feature = "http-proto")
))]
pub use exporter::SpanExporter;

#[cfg(all(
    feature = "metrics",
    any(feature = "grpc-tonic", feature = "http-json", feature = "http-proto")
))]
pub use exporter::MetricExporter;

#[cfg(all(
    feature = "logs",
    any(feature = "grpc-tonic", feature = "http-json", feature = "http-proto")
))]
pub use exporter::LogExporter;

#[cfg(feature = "serialize")]
pub use console::*;

pub use selection::*;

use thiserror::Error;

/// Target to which the exporter sends telemetry over gRPC.
pub const OTEL_EXPORTER_OTLP_GRPC_ENDPOINT_DEFAULT: &str = "http://127.0.0.1:4317";
/// Base target to which the exporter sends telemetry over HTTP; the signal
/// path (`/v1/traces` etc.) is appended.
pub const OTEL_EXPORTER_OTLP_HTTP_ENDPOINT_DEFAULT: &str = "http://localhost:4318";
/// Endpoint configuration, shared by all signals.
pub const OTEL_EXPORTER_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Per-signal endpoint override, used verbatim when set.
pub const OTEL_EXPORTER_OTLP_TRACES_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT";
/// Per-signal endpoint override, used verbatim when set.
pub const OTEL_EXPORTER_OTLP_METRICS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT";
/// Per-signal endpoint override, used verbatim when set.
pub const OTEL_EXPORTER_OTLP_LOGS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_LOGS_ENDPOINT";
/// Max waiting time for the backend to process each batch, in seconds.
pub const OTEL_EXPORTER_OTLP_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_TIMEOUT";
/// Default per-attempt timeout in seconds.
pub const OTEL_EXPORTER_OTLP_TIMEOUT_DEFAULT: u64 = 30;

/// The wire protocol an exporter speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    /// gRPC with protobuf-encoded payloads.
    Grpc,
    /// HTTP with JSON payloads.
    HttpJson,
    /// HTTP with protobuf payloads.
    HttpBinary,
}

/// Errors raised while constructing an exporter. Configuration problems
/// surface here, never at export time.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExporterBuildError {
    /// The configured endpoint did not parse as a URI.
    #[error("invalid OTLP endpoint `{0}`: {1}")]
    InvalidUri(String, String),

    /// The gRPC exporter must be built inside a tokio runtime, which drives
    /// the channel's I/O.
    #[error("no tokio runtime found; the gRPC exporter must be built within a tokio runtime")]
    NoRuntime,

    /// No HTTP client is available; enable the `reqwest-blocking-client`
    /// feature or use the gRPC transport.
    #[error("no HTTP client available; enable the `reqwest-blocking-client` feature")]
    NoHttpClient,

    /// A configuration value was rejected.
    #[error("invalid configuration for `{name}`: {reason}")]
    InvalidConfig {
        /// The offending setting.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Anything else.
    #[error("exporter build failed: {0}")]
    InternalFailure(String),
}

/// Entry point for building OTLP exporters:
/// `new_exporter().tonic()` or `new_exporter().http()`.
pub fn new_exporter() -> ExporterBuilder {
    ExporterBuilder { _private: () }
}

/// Selects the transport for an OTLP exporter under construction.
#[derive(Debug)]
pub struct ExporterBuilder {
    _private: (),
}

impl ExporterBuilder {
    /// Build exporters speaking gRPC via tonic.
    #[cfg(feature = "grpc-tonic")]
    #[cfg_attr(docsrs, doc(cfg(feature = "grpc-tonic")))]
    pub fn tonic(self) -> TonicExporterBuilder {
        TonicExporterBuilder::default()
    }

    /// Build exporters speaking HTTP.
    #[cfg(any(feature = "http-json", feature = "http-proto"))]
    #[cfg_attr(docsrs, doc(cfg(any(feature = "http-json", feature = "http-proto"))))]
    pub fn http(self) -> HttpExporterBuilder {
        HttpExporterBuilder::default()
    }
}
