use std::sync::Mutex;

use otelmini::error::{ExportResult, OTelSdkResult};
use otelmini::otel_warn;
use otelmini::retry::{AttemptOutcome, Retrier, RetryResult};
use otelmini::trace::SpanData;
use otelmini_proto::tonic::collector::trace::v1::trace_service_client::TraceServiceClient;
use otelmini_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use otelmini_proto::transform::trace::tonic::group_spans_by_resource_and_scope;
use tonic::transport::{Channel, Endpoint};

pub(crate) struct TonicTracesClient {
    endpoint: Endpoint,
    runtime: tokio::runtime::Handle,
    client: Mutex<Option<TraceServiceClient<Channel>>>,
}

impl TonicTracesClient {
    pub(super) fn new(endpoint: Endpoint, runtime: tokio::runtime::Handle) -> Self {
        let client = TraceServiceClient::new(endpoint.connect_lazy());
        TonicTracesClient {
            endpoint,
            runtime,
            client: Mutex::new(Some(client)),
        }
    }

    pub(crate) fn export(&self, batch: Vec<SpanData>) -> ExportResult {
        let resource_spans = group_spans_by_resource_and_scope(batch);

        let mut guard = self.client.lock().expect("grpc client lock poisoned");
        let Some(client) = guard.as_mut() else {
            otel_warn!(name: "OtlpGrpcTracesClient.ExportAfterShutdown");
            return ExportResult::Failure;
        };

        let retrier = Retrier::default();
        let outcome = retrier.retry(|| {
            let request = ExportTraceServiceRequest {
                resource_spans: resource_spans.clone(),
            };
            match self.runtime.block_on(client.export(tonic::Request::new(request))) {
                Ok(_) => AttemptOutcome::Success,
                Err(status) => {
                    otel_warn!(
                        name: "OtlpGrpcTracesClient.ExportError",
                        code = format!("{:?}", status.code()),
                        message = status.message().to_string()
                    );
                    let outcome = crate::retry_classification::classify_tonic_code(status.code());
                    if outcome == AttemptOutcome::Retry {
                        // rebuild the channel so the next attempt reconnects
                        // instead of reusing a connection the collector dropped
                        *client = TraceServiceClient::new(self.endpoint.connect_lazy());
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
        // dropping the client closes the channel; no network traffic occurs
        self.client.lock().expect("grpc client lock poisoned").take();
        Ok(())
    }
}
