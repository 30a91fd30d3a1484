//! OTLP over HTTP.
//!
//! Each attempt POSTs the encoded payload to the signal endpoint and reads
//! the full response. The connection is not kept alive; a `Connection:
//! close` header is sent with every request. Status classification follows
//! the OTLP spec: 200 succeeds, 429/502/503/504 retry, everything else
//! fails the batch.

use std::time::Duration;

use otelmini::error::{ExportResult, OTelSdkResult};
#[cfg(feature = "reqwest-blocking-client")]
use otelmini::otel_warn;
#[cfg(feature = "reqwest-blocking-client")]
use otelmini::retry::{AttemptOutcome, Retrier, RetryResult};

use crate::exporter::{resolve_http_endpoint, ExportConfig, HasExportConfig};
#[cfg(feature = "reqwest-blocking-client")]
use crate::retry_classification::classify_http_status;
use crate::{ExporterBuildError, Protocol};

#[cfg(feature = "logs")]
pub(crate) mod logs;
#[cfg(feature = "metrics")]
pub(crate) mod metrics;
#[cfg(feature = "trace")]
pub(crate) mod trace;

pub(crate) const CONTENT_TYPE_JSON: &str = "application/json";
#[cfg(feature = "http-proto")]
pub(crate) const CONTENT_TYPE_PROTOBUF: &str = "application/x-protobuf";

/// Builder for OTLP exporters speaking HTTP.
///
/// The endpoint URL is parsed once at build time; a malformed endpoint is a
/// build error, never a runtime one.
#[derive(Debug)]
pub struct HttpExporterBuilder {
    pub(crate) exporter_config: ExportConfig,
}

impl Default for HttpExporterBuilder {
    fn default() -> Self {
        HttpExporterBuilder {
            exporter_config: ExportConfig {
                protocol: default_protocol(),
                ..ExportConfig::default()
            },
        }
    }
}

#[cfg(feature = "http-json")]
fn default_protocol() -> Protocol {
    Protocol::HttpJson
}

#[cfg(not(feature = "http-json"))]
fn default_protocol() -> Protocol {
    Protocol::HttpBinary
}

impl HasExportConfig for HttpExporterBuilder {
    fn export_config(&mut self) -> &mut ExportConfig {
        &mut self.exporter_config
    }
}

impl HttpExporterBuilder {
    fn build_client(
        &self,
        signal_endpoint_var: &str,
        signal_endpoint_path: &str,
    ) -> Result<OtlpHttpClient, ExporterBuildError> {
        let endpoint = resolve_http_endpoint(
            signal_endpoint_var,
            signal_endpoint_path,
            self.exporter_config.endpoint.as_deref(),
        )?;
        OtlpHttpClient::new(endpoint, self.exporter_config.protocol, self.exporter_config.timeout)
    }

    /// Build a span exporter for `<base>/v1/traces`.
    #[cfg(feature = "trace")]
    pub fn build_span_exporter(self) -> Result<crate::SpanExporter, ExporterBuildError> {
        let client = self.build_client(crate::OTEL_EXPORTER_OTLP_TRACES_ENDPOINT, "/v1/traces")?;
        Ok(crate::SpanExporter {
            client: super::signal::SpanClient::Http(trace::HttpTracesClient::new(client)),
        })
    }

    /// Build a metrics exporter for `<base>/v1/metrics`.
    #[cfg(feature = "metrics")]
    pub fn build_metrics_exporter(self) -> Result<crate::MetricExporter, ExporterBuildError> {
        let client =
            self.build_client(crate::OTEL_EXPORTER_OTLP_METRICS_ENDPOINT, "/v1/metrics")?;
        Ok(crate::MetricExporter {
            client: super::signal::MetricClient::Http(metrics::HttpMetricsClient::new(client)),
        })
    }

    /// Build a log exporter for `<base>/v1/logs`.
    #[cfg(feature = "logs")]
    pub fn build_log_exporter(self) -> Result<crate::LogExporter, ExporterBuildError> {
        let client = self.build_client(crate::OTEL_EXPORTER_OTLP_LOGS_ENDPOINT, "/v1/logs")?;
        Ok(crate::LogExporter {
            client: super::signal::LogClient::Http(logs::HttpLogsClient::new(client)),
        })
    }
}

/// The shared HTTP transport: one endpoint, one blocking client, one
/// retrier.
pub(crate) struct OtlpHttpClient {
    #[cfg(feature = "reqwest-blocking-client")]
    client: reqwest::blocking::Client,
    endpoint: http::Uri,
    pub(crate) protocol: Protocol,
}

impl OtlpHttpClient {
    #[cfg(feature = "reqwest-blocking-client")]
    fn new(
        endpoint: http::Uri,
        protocol: Protocol,
        timeout: Duration,
    ) -> Result<Self, ExporterBuildError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ExporterBuildError::InternalFailure(err.to_string()))?;
        Ok(OtlpHttpClient {
            client,
            endpoint,
            protocol,
        })
    }

    #[cfg(not(feature = "reqwest-blocking-client"))]
    fn new(
        _endpoint: http::Uri,
        _protocol: Protocol,
        _timeout: Duration,
    ) -> Result<Self, ExporterBuildError> {
        Err(ExporterBuildError::NoHttpClient)
    }

    /// POST one encoded payload, retrying per OTLP classification. The
    /// response body is read and discarded before the next attempt.
    #[cfg(feature = "reqwest-blocking-client")]
    pub(crate) fn post(&self, body: Vec<u8>, content_type: &'static str) -> ExportResult {
        let retrier = Retrier::default();
        let outcome = retrier.retry(|| self.single_attempt(body.clone(), content_type));
        match outcome {
            RetryResult::Success => ExportResult::Success,
            RetryResult::Failure | RetryResult::MaxAttemptsReached => {
                otel_warn!(
                    name: "OtlpHttpClient.ExportFailed",
                    endpoint = self.endpoint.to_string()
                );
                ExportResult::Failure
            }
        }
    }

    /// Without an HTTP client implementation nothing can be sent.
    #[cfg(not(feature = "reqwest-blocking-client"))]
    pub(crate) fn post(&self, _body: Vec<u8>, _content_type: &'static str) -> ExportResult {
        ExportResult::Failure
    }

    #[cfg(feature = "reqwest-blocking-client")]
    fn single_attempt(&self, body: Vec<u8>, content_type: &'static str) -> AttemptOutcome {
        let response = self
            .client
            .post(self.endpoint.to_string())
            .header("Content-Type", content_type)
            .header("Connection", "close")
            .body(body)
            .send();

        match response {
            Ok(response) => {
                let status = response.status().as_u16();
                // drain the body so the connection can be torn down cleanly
                let _ = response.bytes();
                classify_http_status(status)
            }
            Err(err) => {
                otel_warn!(
                    name: "OtlpHttpClient.RequestError",
                    error = err.to_string()
                );
                AttemptOutcome::Failure
            }
        }
    }

    pub(crate) fn shutdown(&self) -> OTelSdkResult {
        Ok(())
    }
}

#[cfg(all(
    test,
    feature = "trace",
    feature = "http-json",
    feature = "reqwest-blocking-client"
))]
mod tests {
    #[test]
    fn builds_span_exporter_against_default_endpoint() {
        temp_env::with_vars_unset(
            [
                crate::OTEL_EXPORTER_OTLP_ENDPOINT,
                crate::OTEL_EXPORTER_OTLP_TRACES_ENDPOINT,
            ],
            || {
                let exporter = crate::new_exporter().http().build_span_exporter();
                assert!(exporter.is_ok());
            },
        );
    }
}
