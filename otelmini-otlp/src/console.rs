//! Console exporters: the OTLP/JSON encoding written to stdout.
//!
//! Useful for local development and the `console` exporter selection tag.
//! Export always succeeds.

use std::fmt;

use otelmini::error::ExportResult;

/// Writes spans to stdout as OTLP/JSON. Always succeeds.
#[cfg(feature = "trace")]
#[derive(Default)]
pub struct ConsoleSpanExporter {
    _private: (),
}

#[cfg(feature = "trace")]
impl fmt::Debug for ConsoleSpanExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConsoleSpanExporter")
    }
}

#[cfg(feature = "trace")]
impl otelmini::trace::SpanExporter for ConsoleSpanExporter {
    fn export(&self, batch: Vec<otelmini::trace::SpanData>) -> ExportResult {
        use otelmini_proto::tonic::trace::v1::TracesData;
        use otelmini_proto::transform::trace::tonic::group_spans_by_resource_and_scope;

        let data = TracesData {
            resource_spans: group_spans_by_resource_and_scope(batch),
        };
        match serde_json::to_string_pretty(&data) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("failed to encode spans: {err}"),
        }
        ExportResult::Success
    }
}

/// Writes metric snapshots to stdout as OTLP/JSON. Always succeeds.
#[cfg(feature = "metrics")]
#[derive(Default)]
pub struct ConsoleMetricExporter {
    _private: (),
}

#[cfg(feature = "metrics")]
impl fmt::Debug for ConsoleMetricExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConsoleMetricExporter")
    }
}

#[cfg(feature = "metrics")]
impl otelmini::metrics::PushMetricExporter for ConsoleMetricExporter {
    fn export(&self, metrics: &otelmini::metrics::data::ResourceMetrics) -> ExportResult {
        let data: otelmini_proto::tonic::metrics::v1::MetricsData = metrics.into();
        match serde_json::to_string_pretty(&data) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("failed to encode metrics: {err}"),
        }
        ExportResult::Success
    }
}

/// Writes log records to stdout as OTLP/JSON. Always succeeds.
#[cfg(feature = "logs")]
#[derive(Default)]
pub struct ConsoleLogExporter {
    _private: (),
}

#[cfg(feature = "logs")]
impl fmt::Debug for ConsoleLogExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConsoleLogExporter")
    }
}

#[cfg(feature = "logs")]
impl otelmini::logs::LogExporter for ConsoleLogExporter {
    fn export(&self, batch: Vec<otelmini::logs::SdkLogRecord>) -> ExportResult {
        use otelmini_proto::tonic::logs::v1::LogsData;
        use otelmini_proto::transform::logs::tonic::group_logs_by_resource_and_scope;

        let data = LogsData {
            resource_logs: group_logs_by_resource_and_scope(batch),
        };
        match serde_json::to_string_pretty(&data) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("failed to encode logs: {err}"),
        }
        ExportResult::Success
    }
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "trace")]
    #[test]
    fn console_export_always_succeeds() {
        use super::ConsoleSpanExporter;
        use otelmini::error::ExportResult;
        use otelmini::trace::SpanExporter;

        let exporter = ConsoleSpanExporter::default();
        assert_eq!(exporter.export(Vec::new()), ExportResult::Success);
    }
}
