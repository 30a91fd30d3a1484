use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Weak};

use crate::error::{ExportResult, OTelSdkError, OTelSdkResult};
use crate::metrics::data::ResourceMetrics;
use crate::metrics::exporter::PushMetricExporter;
use crate::metrics::reader::{MetricReader, SdkProducer};

/// A [`MetricReader`] that collects and exports only when asked.
///
/// `force_flush` runs one collection and feeds the snapshot to the exporter
/// synchronously on the calling thread; there is no background worker.
pub struct ManualReader {
    exporter: Box<dyn PushMetricExporter>,
    producer: Mutex<Option<Weak<dyn SdkProducer>>>,
    is_shutdown: AtomicBool,
}

impl fmt::Debug for ManualReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ManualReader")
    }
}

impl ManualReader {
    /// Create a reader feeding the given exporter.
    pub fn new<E: PushMetricExporter>(exporter: E) -> Self {
        ManualReader {
            exporter: Box::new(exporter),
            producer: Mutex::new(None),
            is_shutdown: AtomicBool::new(false),
        }
    }

    fn collect_and_export(&self) -> OTelSdkResult {
        let mut rm = ResourceMetrics::default();
        self.collect(&mut rm)?;
        match self.exporter.export(&rm) {
            ExportResult::Success => Ok(()),
            ExportResult::Failure => Err(OTelSdkError::InternalFailure(
                "metrics export failed".into(),
            )),
        }
    }
}

impl MetricReader for ManualReader {
    fn register_pipeline(&self, producer: Weak<dyn SdkProducer>) {
        let mut guard = self.producer.lock().expect("producer lock poisoned");
        *guard = Some(producer);
    }

    fn collect(&self, rm: &mut ResourceMetrics) -> OTelSdkResult {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let producer = self.producer.lock().expect("producer lock poisoned");
        match producer.as_ref().and_then(Weak::upgrade) {
            Some(producer) => producer.produce(rm),
            None => Err(OTelSdkError::InternalFailure(
                "reader is not registered with a meter provider".into(),
            )),
        }
    }

    fn force_flush(&self) -> OTelSdkResult {
        self.collect_and_export()?;
        self.exporter.force_flush()
    }

    fn shutdown(&self) -> OTelSdkResult {
        let result = self.collect_and_export();
        self.is_shutdown.store(true, Ordering::SeqCst);
        self.exporter.shutdown()?;
        result
    }
}
