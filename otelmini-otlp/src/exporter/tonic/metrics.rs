use std::sync::Mutex;

use otelmini::error::{ExportResult, OTelSdkResult};
use otelmini::metrics::data::ResourceMetrics;
use otelmini::otel_warn;
use otelmini::retry::{AttemptOutcome, Retrier, RetryResult};
use otelmini_proto::tonic::collector::metrics::v1::metrics_service_client::MetricsServiceClient;
use otelmini_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use tonic::transport::{Channel, Endpoint};

pub(crate) struct TonicMetricsClient {
    endpoint: Endpoint,
    runtime: tokio::runtime::Handle,
    client: Mutex<Option<MetricsServiceClient<Channel>>>,
}

impl TonicMetricsClient {
    pub(super) fn new(endpoint: Endpoint, runtime: tokio::runtime::Handle) -> Self {
        let client = MetricsServiceClient::new(endpoint.connect_lazy());
        TonicMetricsClient {
            endpoint,
            runtime,
            client: Mutex::new(Some(client)),
        }
    }

    pub(crate) fn export(&self, metrics: &ResourceMetrics) -> ExportResult {
        let resource_metrics = vec![metrics.into()];

        let mut guard = self.client.lock().expect("grpc client lock poisoned");
        let Some(client) = guard.as_mut() else {
            otel_warn!(name: "OtlpGrpcMetricsClient.ExportAfterShutdown");
            return ExportResult::Failure;
        };

        let retrier = Retrier::default();
        let outcome = retrier.retry(|| {
            let request = ExportMetricsServiceRequest {
                resource_metrics: resource_metrics.clone(),
            };
            match self.runtime.block_on(client.export(tonic::Request::new(request))) {
                Ok(_) => AttemptOutcome::Success,
                Err(status) => {
                    otel_warn!(
                        name: "OtlpGrpcMetricsClient.ExportError",
                        code = format!("{:?}", status.code()),
                        message = status.message().to_string()
                    );
                    let outcome = crate::retry_classification::classify_tonic_code(status.code());
                    if outcome == AttemptOutcome::Retry {
                        *client = MetricsServiceClient::new(self.endpoint.connect_lazy());
                    }
                    outcome
                }
            }
        });

        match outcome {
            RetryResult::Success => ExportResult::Success,
            RetryResult::Failure | RetryResult::MaxAttemptsReached => ExportResult::Failure,
        }
    }

    pub(crate) fn shutdown(&self) -> OTelSdkResult {
        self.client.lock().expect("grpc client lock poisoned").take();
        Ok(())
    }
}
