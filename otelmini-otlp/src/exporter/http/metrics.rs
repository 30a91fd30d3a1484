use otelmini::error::{ExportResult, OTelSdkResult};
use otelmini::metrics::data::ResourceMetrics;
use otelmini_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;

use super::OtlpHttpClient;
use crate::Protocol;

pub(crate) struct HttpMetricsClient {
    inner: OtlpHttpClient,
}

impl HttpMetricsClient {
    pub(super) fn new(inner: OtlpHttpClient) -> Self {
        HttpMetricsClient { inner }
    }

    pub(crate) fn export(&self, metrics: &ResourceMetrics) -> ExportResult {
        let request = ExportMetricsServiceRequest {
            resource_metrics: vec![metrics.into()],
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
    request: &ExportMetricsServiceRequest,
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
