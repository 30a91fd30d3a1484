//! Span processors bridge ended spans and exporters.
//!
//! `on_start`/`on_end` are called synchronously inside the instrumented
//! application's threads and must not block on I/O; the
//! [`BatchSpanProcessor`] hands spans to a background worker for that
//! reason.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ExportResult, OTelSdkResult};
use crate::processor::{self, BatchConfig, BatchProcessor};
use crate::trace::export::SpanExporter;
use crate::trace::span::{Span, SpanData};

/// Hooks into the span lifecycle: called on start, and with the frozen
/// [`SpanData`] on end.
pub trait SpanProcessor: Send + Sync + fmt::Debug {
    /// Called when a span starts, on the thread that started it.
    fn on_start(&self, span: &Span);
    /// Called with the finished span, on the thread that ended it.
    fn on_end(&self, span: SpanData);
    /// Export all spans lying in the cache.
    fn force_flush(&self) -> OTelSdkResult;
    /// Drain and release resources. Called once at provider shutdown.
    fn shutdown(&self) -> OTelSdkResult;
}

/// A [`SpanProcessor`] exporting every span inline as it ends.
///
/// Simple and predictable, at the price of a (serialized) exporter call on
/// the application thread. Meant for tests and short-lived tools.
pub struct SimpleSpanProcessor {
    exporter: Box<dyn SpanExporter>,
    export_lock: Mutex<()>,
}

impl fmt::Debug for SimpleSpanProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SimpleSpanProcessor")
    }
}

impl SimpleSpanProcessor {
    /// Wrap the given exporter.
    pub fn new<E: SpanExporter>(exporter: E) -> Self {
        SimpleSpanProcessor {
            exporter: Box::new(exporter),
            export_lock: Mutex::new(()),
        }
    }
}

impl SpanProcessor for SimpleSpanProcessor {
    fn on_start(&self, _span: &Span) {}

    fn on_end(&self, span: SpanData) {
        if !span.span_context.is_sampled() {
            return;
        }
        let _guard = self.export_lock.lock().expect("export lock poisoned");
        if self.exporter.export(vec![span]) == ExportResult::Failure {
            crate::otel_warn!(name: "SimpleSpanProcessor.ExportFailed");
        }
    }

    fn force_flush(&self) -> OTelSdkResult {
        Ok(())
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.exporter.shutdown()
    }
}

// Adapts a signal-level SpanExporter to the generic batch pipeline.
struct SpanExporterBridge<E> {
    exporter: E,
}

impl<E: SpanExporter> processor::Exporter<SpanData> for SpanExporterBridge<E> {
    fn export(&self, batch: Vec<SpanData>) -> ExportResult {
        self.exporter.export(batch)
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.exporter.shutdown()
    }
}

/// A [`SpanProcessor`] buffering finished spans and exporting them in
/// batches from a dedicated background thread.
///
/// An export is triggered when the batch size is reached
/// (`OTEL_BSP_MAX_EXPORT_BATCH_SIZE`, default 512) or on the schedule
/// interval (`OTEL_BSP_SCHEDULE_DELAY`, default 5 s). Shutdown drains every
/// buffered span.
#[derive(Debug)]
pub struct BatchSpanProcessor {
    inner: BatchProcessor<SpanData>,
}

impl BatchSpanProcessor {
    /// Create a builder for the given exporter.
    pub fn builder<E: SpanExporter>(exporter: E) -> BatchSpanProcessorBuilder<E> {
        BatchSpanProcessorBuilder {
            exporter,
            config: BatchConfig::default(),
        }
    }

    pub(crate) fn new<E: SpanExporter>(exporter: E, config: BatchConfig) -> Self {
        BatchSpanProcessor {
            inner: BatchProcessor::new(
                "OtelMini.Traces.BatchProcessor",
                Arc::new(SpanExporterBridge { exporter }),
                config,
            ),
        }
    }
}

impl SpanProcessor for BatchSpanProcessor {
    fn on_start(&self, _span: &Span) {}

    fn on_end(&self, span: SpanData) {
        if !span.span_context.is_sampled() {
            return;
        }
        self.inner.on_end(span);
    }

    fn force_flush(&self) -> OTelSdkResult {
        self.inner.force_flush(Duration::from_secs(30));
        Ok(())
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.inner.shutdown()
    }
}

/// Builder for [`BatchSpanProcessor`].
#[derive(Debug)]
pub struct BatchSpanProcessorBuilder<E> {
    exporter: E,
    config: BatchConfig,
}

impl<E: SpanExporter> BatchSpanProcessorBuilder<E> {
    /// Use the given batch configuration.
    pub fn with_batch_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the processor and start its worker thread.
    pub fn build(self) -> BatchSpanProcessor {
        BatchSpanProcessor::new(self.exporter, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::BatchConfigBuilder;
    use crate::trace::{InMemorySpanExporter, SdkTracerProvider};

    #[test]
    fn batch_size_trigger_with_spans() {
        let exporter = InMemorySpanExporter::default();
        let processor = BatchSpanProcessor::builder(exporter.clone())
            .with_batch_config(
                BatchConfigBuilder::default()
                    .with_max_export_batch_size(4)
                    .with_scheduled_delay(Duration::from_secs(600))
                    .build(),
            )
            .build();
        let provider = SdkTracerProvider::builder()
            .with_span_processor(processor)
            .build();
        let tracer = provider.tracer("test");

        for i in 0..6 {
            tracer.start(format!("span-{i}")).end();
        }
        provider.shutdown().unwrap();

        let spans = exporter.finished_spans();
        assert_eq!(spans.len(), 6);
        // export order equals end order
        let names: Vec<String> = spans.iter().map(|s| s.name.to_string()).collect();
        let expected: Vec<String> = (0..6).map(|i| format!("span-{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn unsampled_spans_are_not_buffered() {
        let exporter = InMemorySpanExporter::default();
        let processor = BatchSpanProcessor::builder(exporter.clone()).build();
        let provider = SdkTracerProvider::builder()
            .with_sampler(crate::trace::Sampler::AlwaysOff)
            .with_span_processor(processor)
            .build();

        provider.tracer("test").start("nope").end();
        provider.shutdown().unwrap();
        assert!(exporter.finished_spans().is_empty());
    }
}
