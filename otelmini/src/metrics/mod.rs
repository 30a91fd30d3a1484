//! The metrics signal: instruments, per-attribute-set aggregation, readers.
//!
//! Synchronous instruments ([`Counter`], [`UpDownCounter`], [`Histogram`],
//! [`Gauge`]) update aggregator cells keyed by attribute set. Observable
//! instruments register callbacks that are pulled exactly once per
//! collection. Readers attached to the [`SdkMeterProvider`] walk the
//! instrument registry at collection time and feed snapshots to a metric
//! exporter, either on demand ([`ManualReader`]) or on a schedule
//! ([`PeriodicReader`]).

pub mod data;
mod exporter;
mod instrument;
pub(crate) mod internal;
mod manual_reader;
mod meter;
mod meter_provider;
mod periodic_reader;
mod reader;

pub use exporter::{InMemoryMetricExporter, PushMetricExporter};
pub use instrument::{
    AsyncInstrument, Counter, Gauge, Histogram, ObservableCounter, ObservableGauge,
    ObservableUpDownCounter, UpDownCounter,
};
pub use internal::Number;
pub use manual_reader::ManualReader;
pub use meter::{
    CounterBuilder, GaugeBuilder, HistogramBuilder, Meter, ObservableCounterBuilder,
    ObservableGaugeBuilder, ObservableUpDownCounterBuilder, UpDownCounterBuilder,
};
pub use meter_provider::{MeterProviderBuilder, SdkMeterProvider};
pub use periodic_reader::{PeriodicReader, PeriodicReaderBuilder};
pub use reader::{MetricReader, SdkProducer};

/// Defines the window that an aggregation was calculated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporality {
    /// Measurements are aggregated over successive, non-overlapping windows.
    Delta,
    /// Measurements are aggregated since a fixed start time. This SDK
    /// aggregates cumulatively.
    Cumulative,
}
