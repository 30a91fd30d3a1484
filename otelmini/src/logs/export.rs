use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ExportResult, OTelSdkResult};
use crate::logs::record::SdkLogRecord;

/// Terminal sink for batches of emitted log records.
pub trait LogExporter: Send + Sync + fmt::Debug + 'static {
    /// Deliver a batch of records.
    fn export(&self, batch: Vec<SdkLogRecord>) -> ExportResult;

    /// Release held resources. Called once after the final drain.
    fn shutdown(&self) -> OTelSdkResult {
        Ok(())
    }

    /// Push any buffered state to the backend. Best-effort.
    fn force_flush(&self, _timeout: Duration) -> bool {
        true
    }
}

/// A [`LogExporter`] retaining exported records in memory, for tests.
#[derive(Clone, Default)]
pub struct InMemoryLogExporter {
    batches: Arc<Mutex<Vec<Vec<SdkLogRecord>>>>,
    shutdown_called: Arc<AtomicBool>,
}

impl fmt::Debug for InMemoryLogExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InMemoryLogExporter")
    }
}

impl InMemoryLogExporter {
    /// All emitted records, in export order.
    pub fn emitted_logs(&self) -> Vec<SdkLogRecord> {
        self.batches
            .lock()
            .expect("in-memory exporter lock poisoned")
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// The batches as they were exported.
    pub fn exported_batches(&self) -> Vec<Vec<SdkLogRecord>> {
        self.batches
            .lock()
            .expect("in-memory exporter lock poisoned")
            .clone()
    }

    /// True once `shutdown` was invoked.
    pub fn is_shutdown_called(&self) -> bool {
        self.shutdown_called.load(Ordering::SeqCst)
    }
}

impl LogExporter for InMemoryLogExporter {
    fn export(&self, batch: Vec<SdkLogRecord>) -> ExportResult {
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
