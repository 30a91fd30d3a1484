use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ExportResult, OTelSdkResult};
use crate::trace::span::SpanData;

/// Terminal sink for batches of finished spans.
///
/// Exporters own their retry loop; a [`ExportResult::Failure`] is terminal
/// and the batch is dropped by the caller. Concurrent `export` calls only
/// occur if documented; the batch processors serialize access.
pub trait SpanExporter: Send + Sync + fmt::Debug + 'static {
    /// Deliver a batch of spans.
    fn export(&self, batch: Vec<SpanData>) -> ExportResult;

    /// Release held resources. Called once after the final drain.
    fn shutdown(&self) -> OTelSdkResult {
        Ok(())
    }

    /// Push any buffered state to the backend. Best-effort.
    fn force_flush(&self, _timeout: Duration) -> bool {
        true
    }
}

/// A [`SpanExporter`] retaining every exported batch in memory, for tests.
///
/// Clones share the same storage, so a test can keep one handle while the
/// pipeline owns another.
#[derive(Clone, Default)]
pub struct InMemorySpanExporter {
    batches: Arc<Mutex<Vec<Vec<SpanData>>>>,
    shutdown_called: Arc<AtomicBool>,
}

impl fmt::Debug for InMemorySpanExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InMemorySpanExporter")
    }
}

impl InMemorySpanExporter {
    /// All finished spans, in export order.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.batches
            .lock()
            .expect("in-memory exporter lock poisoned")
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// The batches as they were exported.
    pub fn exported_batches(&self) -> Vec<Vec<SpanData>> {
        self.batches
            .lock()
            .expect("in-memory exporter lock poisoned")
            .clone()
    }

    /// Clear the stored spans.
    pub fn reset(&self) {
        self.batches
            .lock()
            .expect("in-memory exporter lock poisoned")
            .clear();
    }

    /// True once `shutdown` was invoked.
    pub fn is_shutdown_called(&self) -> bool {
        self.shutdown_called.load(Ordering::SeqCst)
    }
}

impl SpanExporter for InMemorySpanExporter {
    fn export(&self, batch: Vec<SpanData>) -> ExportResult {
        self.batches
            .lock()
            .expect("in-memory exporter lock poisoned")
            .push(batch);
        ExportResult::Success
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.shutdown_called.store(true, Ordering::SeqCst);
        Ok(())
    }
}
