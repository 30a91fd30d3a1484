//! OTLP exporter builders and shared configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{
    Protocol, OTEL_EXPORTER_OTLP_ENDPOINT, OTEL_EXPORTER_OTLP_GRPC_ENDPOINT_DEFAULT,
    OTEL_EXPORTER_OTLP_TIMEOUT, OTEL_EXPORTER_OTLP_TIMEOUT_DEFAULT,
};

#[cfg(any(feature = "http-json", feature = "http-proto"))]
pub(crate) mod http;
#[cfg(feature = "grpc-tonic")]
pub(crate) mod tonic;

/// Configuration shared by the OTLP exporters.
#[derive(Debug)]
pub struct ExportConfig {
    /// The address of the OTLP collector. When unset, the environment and
    /// then the protocol default are consulted.
    pub endpoint: Option<String>,

    /// The protocol used to communicate with the collector.
    pub protocol: Protocol,

    /// The per-attempt timeout.
    pub timeout: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            endpoint: None,
            protocol: Protocol::Grpc,
            timeout: default_timeout(),
        }
    }
}

pub(crate) fn default_timeout() -> Duration {
    let seconds = env::var(OTEL_EXPORTER_OTLP_TIMEOUT)
        .ok()
        .and_then(|value| u64::from_str(&value).ok())
        .unwrap_or(OTEL_EXPORTER_OTLP_TIMEOUT_DEFAULT);
    Duration::from_secs(seconds)
}

/// Resolve the endpoint for a gRPC exporter: programmatic configuration
/// wins, then the per-signal variable, then the shared variable, then the
/// default. gRPC endpoints carry no signal path.
pub(crate) fn resolve_grpc_endpoint(
    signal_endpoint_var: &str,
    provided_endpoint: Option<&str>,
) -> String {
    if let Some(endpoint) = provided_endpoint.filter(|s| !s.is_empty()) {
        return endpoint.to_string();
    }
    if let Ok(endpoint) = env::var(signal_endpoint_var) {
        return endpoint;
    }
    if let Ok(endpoint) = env::var(OTEL_EXPORTER_OTLP_ENDPOINT) {
        return endpoint;
    }
    OTEL_EXPORTER_OTLP_GRPC_ENDPOINT_DEFAULT.to_string()
}

/// Resolve the endpoint for an HTTP exporter. The per-signal variable is
/// used verbatim; the shared variable and the programmatic/default base get
/// the signal path (`/v1/traces` etc.) appended.
#[cfg(any(feature = "http-json", feature = "http-proto"))]
pub(crate) fn resolve_http_endpoint(
    signal_endpoint_var: &str,
    signal_endpoint_path: &str,
    provided_endpoint: Option<&str>,
) -> Result<::http::Uri, crate::ExporterBuildError> {
    if let Some(endpoint) = env::var(signal_endpoint_var)
        .ok()
        .and_then(|s| s.parse().ok())
    {
        return Ok(endpoint);
    }

    if let Some(endpoint) = env::var(OTEL_EXPORTER_OTLP_ENDPOINT)
        .ok()
        .and_then(|s| format!("{s}{signal_endpoint_path}").parse().ok())
    {
        return Ok(endpoint);
    }

    let base = provided_endpoint
        .filter(|s| !s.is_empty())
        .unwrap_or(crate::OTEL_EXPORTER_OTLP_HTTP_ENDPOINT_DEFAULT);
    let full = format!("{base}{signal_endpoint_path}");
    full.parse()
        .map_err(|err: ::http::uri::InvalidUri| {
            crate::ExporterBuildError::InvalidUri(full.clone(), err.to_string())
        })
}

/// Access to the export config field of the exporter builders.
pub trait HasExportConfig {
    /// A mutable reference to the builder's export config.
    fn export_config(&mut self) -> &mut ExportConfig;
}

/// Configuration methods available on every exporter builder.
///
/// ```no_run
/// # #[cfg(feature = "grpc-tonic")]
/// # {
/// use otelmini_otlp::WithExportConfig;
///
/// let builder = otelmini_otlp::new_exporter()
///     .tonic()
///     .with_endpoint("http://localhost:7201");
/// # }
/// ```
pub trait WithExportConfig {
    /// Set the address of the OTLP collector.
    fn with_endpoint<T: Into<String>>(self, endpoint: T) -> Self;
    /// Set the protocol used to communicate with the collector. Protocols
    /// unsupported by the selected transport are ignored.
    fn with_protocol(self, protocol: Protocol) -> Self;
    /// Set the per-attempt timeout.
    fn with_timeout(self, timeout: Duration) -> Self;
    /// Replace the whole export config.
    fn with_export_config(self, export_config: ExportConfig) -> Self;
}

impl<B: HasExportConfig> WithExportConfig for B {
    fn with_endpoint<T: Into<String>>(mut self, endpoint: T) -> Self {
        self.export_config().endpoint = Some(endpoint.into());
        self
    }

    fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.export_config().protocol = protocol;
        self
    }

    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.export_config().timeout = timeout;
        self
    }

    fn with_export_config(mut self, export_config: ExportConfig) -> Self {
        *self.export_config() = export_config;
        self
    }
}

#[cfg(all(
    feature = "trace",
    any(feature = "grpc-tonic", feature = "http-json", feature = "http-proto")
))]
pub use signal::SpanExporter;

#[cfg(all(
    feature = "metrics",
    any(feature = "grpc-tonic", feature = "http-json", feature = "http-proto")
))]
pub use signal::MetricExporter;

#[cfg(all(
    feature = "logs",
    any(feature = "grpc-tonic", feature = "http-json", feature = "http-proto")
))]
pub use signal::LogExporter;

#[cfg(any(feature = "grpc-tonic", feature = "http-json", feature = "http-proto"))]
mod signal {
    use std::fmt;
    use std::time::Duration;

    use otelmini::error::{ExportResult, OTelSdkResult};

    /// An OTLP span exporter over one of the supported transports.
    #[cfg(feature = "trace")]
    pub struct SpanExporter {
        pub(crate) client: SpanClient,
    }

    #[cfg(feature = "trace")]
    pub(crate) enum SpanClient {
        #[cfg(feature = "grpc-tonic")]
        Tonic(super::tonic::trace::TonicTracesClient),
        #[cfg(any(feature = "http-json", feature = "http-proto"))]
        Http(super::http::trace::HttpTracesClient),
    }

    #[cfg(feature = "trace")]
    impl fmt::Debug for SpanExporter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("OtlpSpanExporter")
        }
    }

    #[cfg(feature = "trace")]
    impl otelmini::trace::SpanExporter for SpanExporter {
        fn export(&self, batch: Vec<otelmini::trace::SpanData>) -> ExportResult {
            match &self.client {
                #[cfg(feature = "grpc-tonic")]
                SpanClient::Tonic(client) => client.export(batch),
                #[cfg(any(feature = "http-json", feature = "http-proto"))]
                SpanClient::Http(client) => client.export(batch),
            }
        }

        fn shutdown(&self) -> OTelSdkResult {
            match &self.client {
                #[cfg(feature = "grpc-tonic")]
                SpanClient::Tonic(client) => client.shutdown(),
                #[cfg(any(feature = "http-json", feature = "http-proto"))]
                SpanClient::Http(client) => client.shutdown(),
            }
        }

        fn force_flush(&self, _timeout: Duration) -> bool {
            true
        }
    }

    /// An OTLP metrics exporter over one of the supported transports.
    #[cfg(feature = "metrics")]
    pub struct MetricExporter {
        pub(crate) client: MetricClient,
    }

    #[cfg(feature = "metrics")]
    pub(crate) enum MetricClient {
        #[cfg(feature = "grpc-tonic")]
        Tonic(super::tonic::metrics::TonicMetricsClient),
        #[cfg(any(feature = "http-json", feature = "http-proto"))]
        Http(super::http::metrics::HttpMetricsClient),
    }

    #[cfg(feature = "metrics")]
    impl fmt::Debug for MetricExporter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("OtlpMetricExporter")
        }
    }

    #[cfg(feature = "metrics")]
    impl otelmini::metrics::PushMetricExporter for MetricExporter {
        fn export(&self, metrics: &otelmini::metrics::data::ResourceMetrics) -> ExportResult {
            match &self.client {
                #[cfg(feature = "grpc-tonic")]
                MetricClient::Tonic(client) => client.export(metrics),
                #[cfg(any(feature = "http-json", feature = "http-proto"))]
                MetricClient::Http(client) => client.export(metrics),
            }
        }

        fn shutdown(&self) -> OTelSdkResult {
            match &self.client {
                #[cfg(feature = "grpc-tonic")]
                MetricClient::Tonic(client) => client.shutdown(),
                #[cfg(any(feature = "http-json", feature = "http-proto"))]
                MetricClient::Http(client) => client.shutdown(),
            }
        }
    }

    /// An OTLP logs exporter over one of the supported transports.
    #[cfg(feature = "logs")]
    pub struct LogExporter {
        pub(crate) client: LogClient,
    }

    #[cfg(feature = "logs")]
    pub(crate) enum LogClient {
        #[cfg(feature = "grpc-tonic")]
        Tonic(super::tonic::logs::TonicLogsClient),
        #[cfg(any(feature = "http-json", feature = "http-proto"))]
        Http(super::http::logs::HttpLogsClient),
    }

    #[cfg(feature = "logs")]
    impl fmt::Debug for LogExporter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("OtlpLogExporter")
        }
    }

    #[cfg(feature = "logs")]
    impl otelmini::logs::LogExporter for LogExporter {
        fn export(&self, batch: Vec<otelmini::logs::SdkLogRecord>) -> ExportResult {
            match &self.client {
                #[cfg(feature = "grpc-tonic")]
                LogClient::Tonic(client) => client.export(batch),
                #[cfg(any(feature = "http-json", feature = "http-proto"))]
                LogClient::Http(client) => client.export(batch),
            }
        }

        fn shutdown(&self) -> OTelSdkResult {
            match &self.client {
                #[cfg(feature = "grpc-tonic")]
                LogClient::Tonic(client) => client.shutdown(),
                #[cfg(any(feature = "http-json", feature = "http-proto"))]
                LogClient::Http(client) => client.shutdown(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grpc_endpoint_resolution_order() {
        temp_env::with_vars(
            [
                ("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT", Some("http://signal:4317")),
                (OTEL_EXPORTER_OTLP_ENDPOINT, Some("http://generic:4317")),
            ],
            || {
                // programmatic beats env
                assert_eq!(
                    resolve_grpc_endpoint(
                        "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT",
                        Some("http://provided:4317")
                    ),
                    "http://provided:4317"
                );
                // signal env beats generic env
                assert_eq!(
                    resolve_grpc_endpoint("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT", None),
                    "http://signal:4317"
                );
            },
        );

        temp_env::with_vars_unset(
            ["OTEL_EXPORTER_OTLP_TRACES_ENDPOINT", OTEL_EXPORTER_OTLP_ENDPOINT],
            || {
                assert_eq!(
                    resolve_grpc_endpoint("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT", None),
                    OTEL_EXPORTER_OTLP_GRPC_ENDPOINT_DEFAULT
                );
            },
        );
    }

    #[cfg(any(feature = "http-json", feature = "http-proto"))]
    #[test]
    fn http_endpoint_resolution() {
        temp_env::with_vars(
            [(OTEL_EXPORTER_OTLP_ENDPOINT, Some("http://example.com"))],
            || {
                let endpoint = resolve_http_endpoint(
                    "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT",
                    "/v1/traces",
                    None,
                )
                .unwrap();
                assert_eq!(endpoint, "http://example.com/v1/traces");
            },
        );

        // per-signal override is used verbatim, no path appended
        temp_env::with_vars(
            [(
                "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT",
                Some("http://example.com/custom"),
            )],
            || {
                let endpoint = resolve_http_endpoint(
                    "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT",
                    "/v1/traces",
                    None,
                )
                .unwrap();
                assert_eq!(endpoint, "http://example.com/custom");
            },
        );

        temp_env::with_vars_unset(
            ["OTEL_EXPORTER_OTLP_TRACES_ENDPOINT", OTEL_EXPORTER_OTLP_ENDPOINT],
            || {
                let endpoint = resolve_http_endpoint(
                    "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT",
                    "/v1/traces",
                    None,
                )
                .unwrap();
                assert_eq!(endpoint, "http://localhost:4318/v1/traces");
            },
        );
    }

    #[test]
    fn timeout_defaults_to_thirty_seconds() {
        temp_env::with_vars_unset([OTEL_EXPORTER_OTLP_TIMEOUT], || {
            assert_eq!(default_timeout(), Duration::from_secs(30));
        });
        temp_env::with_var(OTEL_EXPORTER_OTLP_TIMEOUT, Some("5"), || {
            assert_eq!(default_timeout(), Duration::from_secs(5));
        });
    }
}
