use std::sync::Mutex;

use otelmini::error::{ExportResult, OTelSdkResult};
use otelmini::logs::SdkLogRecord;
use otelmini::otel_warn;
use otelmini::retry::{AttemptOutcome, Retrier, RetryResult};
use otelmini_proto::tonic::collector::logs::v1::logs_service_client::LogsServiceClient;
use otelmini_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use otelmini_proto::transform::logs::tonic::group_logs_by_resource_and_scope;
use tonic::transport::{Channel, Endpoint};

pub(crate) struct TonicLogsClient {
    endpoint: Endpoint,
    runtime: tokio::runtime::Handle,
    client: Mutex<Option<LogsServiceClient<Channel>>>,
}

impl TonicLogsClient {
    pub(super) fn new(endpoint: Endpoint, runtime: tokio::runtime::Handle) -> Self {
        let client = LogsServiceClient::new(endpoint.connect_lazy());
        TonicLogsClient {
            endpoint,
            runtime,
            client: Mutex::new(Some(client)),
        }
    }

    pub(crate) fn export(&self, batch: Vec<SdkLogRecord>) -> ExportResult {
        let resource_logs = group_logs_by_resource_and_scope(batch);

        let mut guard = self.client.lock().expect("grpc client lock poisoned");
        let Some(client) = guard.as_mut() else {
            otel_warn!(name: "OtlpGrpcLogsClient.ExportAfterShutdown");
            return ExportResult::Failure;
        };

        let retrier = Retrier::default();
        let outcome = retrier.retry(|| {
            let request = ExportLogsServiceRequest {
                resource_logs: resource_logs.clone(),
            };
            match self.runtime.block_on(client.export(tonic::Request::new(request))) {
                Ok(_) => AttemptOutcome::Success,
                Err(status) => {
                    otel_warn!(
                        name: "OtlpGrpcLogsClient.ExportError",
                        code = format!("{:?}", status.code()),
                        message = status.message().to_string()
                    );
                    let outcome = crate::retry_classification::classify_tonic_code(status.code());
                    if outcome == AttemptOutcome::Retry {
                        *client = LogsServiceClient::new(self.endpoint.connect_lazy());
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
