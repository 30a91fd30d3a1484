use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ExportResult, OTelSdkResult};
use crate::metrics::data::ResourceMetrics;
use crate::metrics::Temporality;

/// Terminal sink for metric snapshots pushed by a reader.
pub trait PushMetricExporter: Send + Sync + fmt::Debug + 'static {
    /// Deliver one snapshot.
    fn export(&self, metrics: &ResourceMetrics) -> ExportResult;

    /// Push any buffered state to the backend. Best-effort.
    fn force_flush(&self) -> OTelSdkResult {
        Ok(())
    }

    /// Release held resources. Called once after the reader's final export.
    fn shutdown(&self) -> OTelSdkResult {
        Ok(())
    }

    /// The temporality this exporter expects. This SDK aggregates
    /// cumulatively.
    fn temporality(&self) -> Temporality {
        Temporality::Cumulative
    }
}

/// A [`PushMetricExporter`] retaining every exported snapshot, for tests.
#[derive(Clone, Default)]
pub struct InMemoryMetricExporter {
    snapshots: Arc<Mutex<Vec<ResourceMetrics>>>,
    shutdown_called: Arc<AtomicBool>,
}

impl fmt::Debug for InMemoryMetricExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InMemoryMetricExporter")
    }
}

impl InMemoryMetricExporter {
    /// The exported snapshots, oldest first.
    pub fn exported_metrics(&self) -> Vec<ResourceMetrics> {
        self.snapshots
            .lock()
            .expect("in-memory exporter lock poisoned")
            .clone()
    }

    /// True once `shutdown` was invoked.
    pub fn is_shutdown_called(&self) -> bool {
        self.shutdown_called.load(Ordering::SeqCst)
    }
}

impl PushMetricExporter for InMemoryMetricExporter {
    fn export(&self, metrics: &ResourceMetrics) -> ExportResult {
        self.snapshots
            .lock()
            .expect("in-memory exporter lock poisoned")
            .push(metrics.clone());
        ExportResult::Success
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.shutdown_called.store(true, Ordering::SeqCst);
        Ok(())
    }
}
