//! End-to-end pipeline tests: providers, batch processors and in-memory
//! exporters working together.

use std::thread;
use std::time::{Duration, Instant};

use otelmini::logs::{InMemoryLogExporter, SdkLoggerProvider, Severity};
use otelmini::metrics::{InMemoryMetricExporter, ManualReader, SdkMeterProvider};
use otelmini::processor::BatchConfigBuilder;
use otelmini::trace::{
    BatchSpanProcessor, InMemorySpanExporter, SdkTracerProvider, SpanKind, Status,
};
use otelmini::KeyValue;

fn wait_until(deadline: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if predicate() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    predicate()
}

#[test]
fn periodic_trigger_preserves_span_order() {
    let exporter = InMemorySpanExporter::default();
    let processor = BatchSpanProcessor::builder(exporter.clone())
        .with_batch_config(
            BatchConfigBuilder::default()
                .with_max_export_batch_size(1000)
                .with_scheduled_delay(Duration::from_millis(40))
                .build(),
        )
        .build();
    let provider = SdkTracerProvider::builder()
        .with_span_processor(processor)
        .build();
    let tracer = provider.tracer("periodic");

    for i in 0..12 {
        tracer.start(format!("span-{i}")).end();
        thread::sleep(Duration::from_millis(15));
    }
    assert!(wait_until(Duration::from_secs(5), || exporter
        .exported_batches()
        .len()
        >= 2));
    provider.shutdown().unwrap();

    let batches = exporter.exported_batches();
    assert!(batches.len() >= 2, "expected >= 2 exports, got {}", batches.len());
    let names: Vec<String> = batches
        .into_iter()
        .flatten()
        .map(|span| span.name.to_string())
        .collect();
    let expected: Vec<String> = (0..12).map(|i| format!("span-{i}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn span_fields_survive_the_pipeline() {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter.clone())
        .build();
    let tracer = provider.tracer("fields");

    let mut span = tracer
        .span_builder("checkout")
        .with_kind(SpanKind::Server)
        .with_attributes([KeyValue::new("customer.tier", "gold")])
        .start(&tracer);
    span.add_event("payment-authorized", vec![]);
    span.set_status(Status::Ok);
    span.end();
    provider.shutdown().unwrap();

    let spans = exporter.finished_spans();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name, "checkout");
    assert_eq!(span.span_kind, SpanKind::Server);
    assert_eq!(span.status, Status::Ok);
    assert_eq!(span.events.len(), 1);
    assert_eq!(span.scope.name(), "fields");
    assert!(span.end_time >= span.start_time);
    assert!(span.span_context.is_sampled());
}

#[test]
fn logs_flow_through_batch_processor_in_order() {
    let exporter = InMemoryLogExporter::default();
    let provider = SdkLoggerProvider::builder()
        .with_batch_exporter(exporter.clone())
        .build();
    let logger = provider.logger("app");

    for i in 0..5 {
        let mut record = logger.create_log_record();
        record.set_severity_number(Severity::Info);
        record.set_body(format!("message {i}"));
        logger.emit(record);
    }
    provider.shutdown().unwrap();

    let logs = exporter.emitted_logs();
    assert_eq!(logs.len(), 5);
    for (i, log) in logs.iter().enumerate() {
        assert_eq!(
            log.body,
            Some(otelmini::logs::AnyValue::from(format!("message {i}")))
        );
    }
}

#[test]
fn metrics_and_traces_share_one_process() {
    let span_exporter = InMemorySpanExporter::default();
    let metric_exporter = InMemoryMetricExporter::default();

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter.clone())
        .build();
    let meter_provider = SdkMeterProvider::builder()
        .with_reader(ManualReader::new(metric_exporter.clone()))
        .build();

    let tracer = tracer_provider.tracer("svc");
    let counter = meter_provider.meter("svc").u64_counter("requests").build();

    tracer.in_span("handle-request", |_span| {
        counter.add(1, &[KeyValue::new("route", "/")]);
    });

    tracer_provider.shutdown().unwrap();
    meter_provider.shutdown().unwrap();

    assert_eq!(span_exporter.finished_spans().len(), 1);
    let snapshots = metric_exporter.exported_metrics();
    assert!(!snapshots.is_empty());
}
