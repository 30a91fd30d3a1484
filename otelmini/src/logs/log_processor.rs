//! Log processors bridge emitted records and exporters.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ExportResult, OTelSdkResult};
use crate::logs::export::LogExporter;
use crate::logs::record::SdkLogRecord;
use crate::processor::{self, BatchConfig, BatchProcessor};

/// Hook receiving every emitted log record.
pub trait LogProcessor: Send + Sync + fmt::Debug {
    /// Called with the frozen record, on the thread that emitted it.
    fn emit(&self, record: SdkLogRecord);
    /// Export all records lying in the cache.
    fn force_flush(&self) -> OTelSdkResult;
    /// Drain and release resources. Called once at provider shutdown.
    fn shutdown(&self) -> OTelSdkResult;
}

/// A [`LogProcessor`] exporting every record inline as it is emitted.
pub struct SimpleLogProcessor {
    exporter: Box<dyn LogExporter>,
    export_lock: Mutex<()>,
}

impl fmt::Debug for SimpleLogProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SimpleLogProcessor")
    }
}

impl SimpleLogProcessor {
    /// Wrap the given exporter.
    pub fn new<E: LogExporter>(exporter: E) -> Self {
        SimpleLogProcessor {
            exporter: Box::new(exporter),
            export_lock: Mutex::new(()),
        }
    }
}

impl LogProcessor for SimpleLogProcessor {
    fn emit(&self, record: SdkLogRecord) {
        let _guard = self.export_lock.lock().expect("export lock poisoned");
        if self.exporter.export(vec![record]) == ExportResult::Failure {
            crate::otel_warn!(name: "SimpleLogProcessor.ExportFailed");
        }
    }

    fn force_flush(&self) -> OTelSdkResult {
        Ok(())
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.exporter.shutdown()
    }
}

struct LogExporterBridge<E> {
    exporter: E,
}

impl<E: LogExporter> processor::Exporter<SdkLogRecord> for LogExporterBridge<E> {
    fn export(&self, batch: Vec<SdkLogRecord>) -> ExportResult {
        self.exporter.export(batch)
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.exporter.shutdown()
    }
}

/// A [`LogProcessor`] buffering emitted records and exporting them in
/// batches from a dedicated background thread.
#[derive(Debug)]
pub struct BatchLogProcessor {
    inner: BatchProcessor<SdkLogRecord>,
}

impl BatchLogProcessor {
    /// Create a builder for the given exporter.
    pub fn builder<E: LogExporter>(exporter: E) -> BatchLogProcessorBuilder<E> {
        BatchLogProcessorBuilder {
            exporter,
            config: BatchConfig::default(),
        }
    }

    pub(crate) fn new<E: LogExporter>(exporter: E, config: BatchConfig) -> Self {
        BatchLogProcessor {
            inner: BatchProcessor::new(
                "OtelMini.Logs.BatchProcessor",
                Arc::new(LogExporterBridge { exporter }),
                config,
            ),
        }
    }
}

impl LogProcessor for BatchLogProcessor {
    fn emit(&self, record: SdkLogRecord) {
        self.inner.on_end(record);
    }

    fn force_flush(&self) -> OTelSdkResult {
        self.inner.force_flush(Duration::from_secs(30));
        Ok(())
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.inner.shutdown()
    }
}

/// Builder for [`BatchLogProcessor`].
#[derive(Debug)]
pub struct BatchLogProcessorBuilder<E> {
    exporter: E,
    config: BatchConfig,
}

impl<E: LogExporter> BatchLogProcessorBuilder<E> {
    /// Use the given batch configuration.
    pub fn with_batch_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the processor and start its worker thread.
    pub fn build(self) -> BatchLogProcessor {
        BatchLogProcessor::new(self.exporter, self.config)
    }
}
