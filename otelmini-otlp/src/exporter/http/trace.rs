use otelmini::error::{ExportResult, OTelSdkResult};
use otelmini::trace::SpanData;
use otelmini_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use otelmini_proto::transform::trace::tonic::group_spans_by_resource_and_scope;

use super::OtlpHttpClient;
use crate::Protocol;

pub(crate) struct HttpTracesClient {
    inner: OtlpHttpClient,
}

impl HttpTracesClient {
    pub(super) fn new(inner: OtlpHttpClient) -> Self {
        HttpTracesClient { inner }
    }

    pub(crate) fn export(&self, batch: Vec<SpanData>) -> ExportResult {
        let request = ExportTraceServiceRequest {
            resource_spans: group_spans_by_resource_and_scope(batch),
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
    request: &ExportTraceServiceRequest,
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
