//! OTLP over gRPC via tonic.
//!
//! Each exporter owns a lazily connected channel and a typed service
//! client. The channel must be built inside a tokio runtime; the runtime
//! handle captured at build time drives the unary `Export` calls, which the
//! batch worker thread blocks on. On a retryable status the channel is
//! dropped and rebuilt before the next attempt, so the exporter recovers
//! after a collector restart.

use tonic::transport::{Channel, Endpoint};

use crate::exporter::{resolve_grpc_endpoint, ExportConfig, HasExportConfig};
use crate::{ExporterBuildError, Protocol};

#[cfg(feature = "logs")]
pub(crate) mod logs;
#[cfg(feature = "metrics")]
pub(crate) mod metrics;
#[cfg(feature = "trace")]
pub(crate) mod trace;

/// Builder for OTLP exporters speaking gRPC.
#[derive(Debug)]
pub struct TonicExporterBuilder {
    pub(crate) exporter_config: ExportConfig,
}

impl Default for TonicExporterBuilder {
    fn default() -> Self {
        TonicExporterBuilder {
            exporter_config: ExportConfig {
                protocol: Protocol::Grpc,
                ..ExportConfig::default()
            },
        }
    }
}

impl HasExportConfig for TonicExporterBuilder {
    fn export_config(&mut self) -> &mut ExportConfig {
        &mut self.exporter_config
    }
}

impl TonicExporterBuilder {
    fn build_channel(
        &self,
        signal_endpoint_var: &str,
    ) -> Result<(Endpoint, tokio::runtime::Handle), ExporterBuildError> {
        let endpoint_str =
            resolve_grpc_endpoint(signal_endpoint_var, self.exporter_config.endpoint.as_deref());
        let endpoint = Channel::from_shared(endpoint_str.clone())
            .map_err(|err| ExporterBuildError::InvalidUri(endpoint_str, err.to_string()))?
            .timeout(self.exporter_config.timeout);
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| ExporterBuildError::NoRuntime)?;
        Ok((endpoint, runtime))
    }

    /// Build a span exporter for the trace service.
    #[cfg(feature = "trace")]
    pub fn build_span_exporter(self) -> Result<crate::SpanExporter, ExporterBuildError> {
        let (endpoint, runtime) = self.build_channel(crate::OTEL_EXPORTER_OTLP_TRACES_ENDPOINT)?;
        Ok(crate::SpanExporter {
            client: super::signal::SpanClient::Tonic(trace::TonicTracesClient::new(
                endpoint, runtime,
            )),
        })
    }

    /// Build a metrics exporter for the metrics service.
    #[cfg(feature = "metrics")]
    pub fn build_metrics_exporter(self) -> Result<crate::MetricExporter, ExporterBuildError> {
        let (endpoint, runtime) =
            self.build_channel(crate::OTEL_EXPORTER_OTLP_METRICS_ENDPOINT)?;
        Ok(crate::MetricExporter {
            client: super::signal::MetricClient::Tonic(metrics::TonicMetricsClient::new(
                endpoint, runtime,
            )),
        })
    }

    /// Build a log exporter for the logs service.
    #[cfg(feature = "logs")]
    pub fn build_log_exporter(self) -> Result<crate::LogExporter, ExporterBuildError> {
        let (endpoint, runtime) = self.build_channel(crate::OTEL_EXPORTER_OTLP_LOGS_ENDPOINT)?;
        Ok(crate::LogExporter {
            client: super::signal::LogClient::Tonic(logs::TonicLogsClient::new(
                endpoint, runtime,
            )),
        })
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use crate::ExporterBuildError;

    #[test]
    fn building_outside_a_runtime_fails_loudly() {
        let result = crate::new_exporter().tonic().build_span_exporter();
        assert!(matches!(result, Err(ExporterBuildError::NoRuntime)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn building_inside_a_runtime_succeeds() {
        let exporter = crate::new_exporter().tonic().build_span_exporter();
        assert!(exporter.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_endpoint_is_a_build_error() {
        use crate::WithExportConfig;
        let result = crate::new_exporter()
            .tonic()
            .with_endpoint("::not a uri::")
            .build_span_exporter();
        assert!(matches!(result, Err(ExporterBuildError::InvalidUri(..))));
    }
}
