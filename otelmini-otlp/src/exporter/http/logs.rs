use otelmini::error::{ExportResult, OTelSdkResult};
use otelmini::logs::SdkLogRecord;
use otelmini_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use otelmini_proto::transform::logs::tonic::group_logs_by_resource_and_scope;

use super::OtlpHttpClient;
use crate::Protocol;

pub(crate) struct HttpLogsClient {
    inner: OtlpHttpClient,
}

impl HttpLogsClient {
    pub(super) fn new(inner: OtlpHttpClient) -> Self {
        HttpLogsClient { inner }
    }

    pub(crate) fn export(&self, batch: Vec<SdkLogRecord>) -> ExportResult {
        let request = ExportLogsServiceRequest {
            resource_logs: group_logs_by_resource_and_scope(batch),
        };
        match encode_body(&request, self.inner.protocol) {
            Some((body, content_type)) => self.inner.post(body, content_type),
            None => ExportResult::Failure,
        }
    }

    pub(crate) fn shutdown(&self) -> OTelSdkResult {
        self.inner.shutdown()
    }
}

fn encode_body(
    request: &ExportLogsServiceRequest,
    protocol: Protocol,
) -> Option<(Vec<u8>, &'static str)> {
    match protocol {
        #[cfg(feature = "http-json")]
        Protocol::HttpJson | Protocol::Grpc => Some((
            serde_json::to_vec(request).ok()?,
            super::CONTENT_TYPE_JSON,
        )),
        #[cfg(feature = "http-proto")]
        Protocol::HttpBinary => {
            use prost::Message;
            Some((request.encode_to_vec(), super::CONTENT_TYPE_PROTOBUF))
        }
        #[allow(unreachable_patterns)]
        _ => None,
    }
}
