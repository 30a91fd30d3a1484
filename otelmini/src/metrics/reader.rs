use std::fmt;
use std::sync::Weak;

use crate::error::OTelSdkResult;
use crate::metrics::data::ResourceMetrics;

/// Produces aggregated metrics on demand: the provider side of the
/// reader/provider relationship.
///
/// Readers hold a `Weak` reference to a producer; the provider owns the
/// readers, never the other way around.
pub trait SdkProducer: Send + Sync {
    /// Walk every registered instrument, run observable callbacks once, and
    /// write the snapshot into `rm`.
    fn produce(&self, rm: &mut ResourceMetrics) -> OTelSdkResult;
}

/// Collects metrics from a provider's pipeline on its own schedule.
pub trait MetricReader: Send + Sync + fmt::Debug {
    /// Called by the provider at build time to hand the reader its producer.
    fn register_pipeline(&self, producer: Weak<dyn SdkProducer>);

    /// Gather a snapshot of current aggregates into `rm`.
    fn collect(&self, rm: &mut ResourceMetrics) -> OTelSdkResult;

    /// Collect and export immediately.
    fn force_flush(&self) -> OTelSdkResult;

    /// Perform a final collect/export and release resources.
    fn shutdown(&self) -> OTelSdkResult;
}
