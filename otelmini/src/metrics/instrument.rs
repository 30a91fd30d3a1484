//! Instrument handles and their aggregator-backed internals.

use std::borrow::Cow;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::metrics::data::Metric;
use crate::metrics::internal::{HistogramAggregate, LastValueAggregate, Number, SumAggregate};
use crate::{otel_warn, KeyValue};

/// An instrument observed through callbacks at collection time.
///
/// Implemented by the observable instruments; callbacks receive the
/// instrument and report observations against it.
pub trait AsyncInstrument<T>: Send + Sync {
    /// Record one observation. For observable counters the value is the
    /// absolute cumulative total, not a delta.
    fn observe(&self, value: T, attributes: &[KeyValue]);
}

pub(crate) type Callback<T> = Box<dyn Fn(&dyn AsyncInstrument<T>) + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct InstrumentDescriptor {
    pub(crate) name: Cow<'static, str>,
    pub(crate) description: Cow<'static, str>,
    pub(crate) unit: Cow<'static, str>,
}

/// A snapshot source walked by the readers at collection time.
pub(crate) trait Collect: Send + Sync {
    fn collect(&self) -> Metric;
}

pub(crate) struct SumInstrument<T: Number> {
    descriptor: InstrumentDescriptor,
    pub(crate) aggregate: SumAggregate<T>,
}

impl<T: Number> SumInstrument<T> {
    pub(crate) fn new(descriptor: InstrumentDescriptor, monotonic: bool) -> Self {
        SumInstrument {
            descriptor,
            aggregate: SumAggregate::new(monotonic),
        }
    }
}

impl<T: Number> Collect for SumInstrument<T> {
    fn collect(&self) -> Metric {
        Metric {
            name: self.descriptor.name.clone(),
            description: self.descriptor.description.clone(),
            unit: self.descriptor.unit.clone(),
            data: T::make_aggregated(self.aggregate.collect()),
        }
    }
}

pub(crate) struct HistogramInstrument<T: Number> {
    descriptor: InstrumentDescriptor,
    pub(crate) aggregate: HistogramAggregate<T>,
}

impl<T: Number> HistogramInstrument<T> {
    pub(crate) fn new(descriptor: InstrumentDescriptor, bounds: Vec<f64>) -> Self {
        HistogramInstrument {
            descriptor,
            aggregate: HistogramAggregate::new(bounds),
        }
    }
}

impl<T: Number> Collect for HistogramInstrument<T> {
    fn collect(&self) -> Metric {
        Metric {
            name: self.descriptor.name.clone(),
            description: self.descriptor.description.clone(),
            unit: self.descriptor.unit.clone(),
            data: T::make_aggregated(self.aggregate.collect()),
        }
    }
}

pub(crate) struct GaugeInstrument<T: Number> {
    descriptor: InstrumentDescriptor,
    pub(crate) aggregate: LastValueAggregate<T>,
}

impl<T: Number> GaugeInstrument<T> {
    pub(crate) fn new(descriptor: InstrumentDescriptor) -> Self {
        GaugeInstrument {
            descriptor,
            aggregate: LastValueAggregate::new(),
        }
    }
}

impl<T: Number> Collect for GaugeInstrument<T> {
    fn collect(&self) -> Metric {
        Metric {
            name: self.descriptor.name.clone(),
            description: self.descriptor.description.clone(),
            unit: self.descriptor.unit.clone(),
            data: T::make_aggregated(self.aggregate.collect()),
        }
    }
}

// Runs the registered callbacks, isolating failures: a panicking callback is
// logged and skipped, the cells keep their previous values, and collection
// continues for the remaining callbacks and instruments.
fn run_callbacks<T: Number>(
    name: &str,
    callbacks: &Mutex<Vec<Callback<T>>>,
    instrument: &dyn AsyncInstrument<T>,
) {
    let callbacks = callbacks.lock().expect("callback list lock poisoned");
    for callback in callbacks.iter() {
        if catch_unwind(AssertUnwindSafe(|| callback(instrument))).is_err() {
            otel_warn!(
                name: "ObservableInstrument.CallbackPanicked",
                instrument = name.to_string()
            );
        }
    }
}

pub(crate) struct ObservableSumInstrument<T: Number> {
    descriptor: InstrumentDescriptor,
    aggregate: SumAggregate<T>,
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T: Number> ObservableSumInstrument<T> {
    pub(crate) fn new(
        descriptor: InstrumentDescriptor,
        monotonic: bool,
        callbacks: Vec<Callback<T>>,
    ) -> Self {
        ObservableSumInstrument {
            descriptor,
            aggregate: SumAggregate::new(monotonic),
            callbacks: Mutex::new(callbacks),
        }
    }
}

impl<T: Number> AsyncInstrument<T> for ObservableSumInstrument<T> {
    fn observe(&self, value: T, attributes: &[KeyValue]) {
        self.aggregate.set_absolute(value, attributes);
    }
}

impl<T: Number> Collect for ObservableSumInstrument<T> {
    fn collect(&self) -> Metric {
        run_callbacks(&self.descriptor.name, &self.callbacks, self);
        Metric {
            name: self.descriptor.name.clone(),
            description: self.descriptor.description.clone(),
            unit: self.descriptor.unit.clone(),
            data: T::make_aggregated(self.aggregate.collect()),
        }
    }
}

pub(crate) struct ObservableGaugeInstrument<T: Number> {
    descriptor: InstrumentDescriptor,
    aggregate: LastValueAggregate<T>,
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T: Number> ObservableGaugeInstrument<T> {
    pub(crate) fn new(descriptor: InstrumentDescriptor, callbacks: Vec<Callback<T>>) -> Self {
        ObservableGaugeInstrument {
            descriptor,
            aggregate: LastValueAggregate::new(),
            callbacks: Mutex::new(callbacks),
        }
    }
}

impl<T: Number> AsyncInstrument<T> for ObservableGaugeInstrument<T> {
    fn observe(&self, value: T, attributes: &[KeyValue]) {
        self.aggregate.measure(value, attributes);
    }
}

impl<T: Number> Collect for ObservableGaugeInstrument<T> {
    fn collect(&self) -> Metric {
        run_callbacks(&self.descriptor.name, &self.callbacks, self);
        Metric {
            name: self.descriptor.name.clone(),
            description: self.descriptor.description.clone(),
            unit: self.descriptor.unit.clone(),
            data: T::make_aggregated(self.aggregate.collect()),
        }
    }
}

macro_rules! instrument_debug {
    ($name:ident) => {
        impl<T: Number> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(stringify!($name))
            }
        }
    };
}

/// A monotonically increasing sum instrument.
#[derive(Clone)]
pub struct Counter<T: Number> {
    pub(crate) inner: Arc<SumInstrument<T>>,
}
instrument_debug!(Counter);

impl<T: Number> Counter<T> {
    /// Add `value` to the cell identified by `attributes`. Negative values
    /// are rejected.
    pub fn add(&self, value: T, attributes: &[KeyValue]) {
        self.inner.aggregate.measure(value, attributes);
    }
}

/// A sum instrument that can decrease.
#[derive(Clone)]
pub struct UpDownCounter<T: Number> {
    pub(crate) inner: Arc<SumInstrument<T>>,
}
instrument_debug!(UpDownCounter);

impl<T: Number> UpDownCounter<T> {
    /// Add `value` (possibly negative) to the cell identified by
    /// `attributes`.
    pub fn add(&self, value: T, attributes: &[KeyValue]) {
        self.inner.aggregate.measure(value, attributes);
    }
}

/// A distribution instrument with explicit bucket boundaries.
#[derive(Clone)]
pub struct Histogram<T: Number> {
    pub(crate) inner: Arc<HistogramInstrument<T>>,
}
instrument_debug!(Histogram);

impl<T: Number> Histogram<T> {
    /// Record one value into the distribution for `attributes`.
    pub fn record(&self, value: T, attributes: &[KeyValue]) {
        self.inner.aggregate.measure(value, attributes);
    }
}

/// A last-value instrument.
#[derive(Clone)]
pub struct Gauge<T: Number> {
    pub(crate) inner: Arc<GaugeInstrument<T>>,
}
instrument_debug!(Gauge);

impl<T: Number> Gauge<T> {
    /// Set the current value for `attributes`; the last write wins.
    pub fn set(&self, value: T, attributes: &[KeyValue]) {
        self.inner.aggregate.measure(value, attributes);
    }
}

/// A counter whose cumulative total is pulled from callbacks at collection.
#[derive(Clone)]
pub struct ObservableCounter<T: Number> {
    pub(crate) inner: Arc<ObservableSumInstrument<T>>,
}
instrument_debug!(ObservableCounter);

impl<T: Number> AsyncInstrument<T> for ObservableCounter<T> {
    fn observe(&self, value: T, attributes: &[KeyValue]) {
        self.inner.observe(value, attributes);
    }
}

/// An up-down counter whose total is pulled from callbacks at collection.
#[derive(Clone)]
pub struct ObservableUpDownCounter<T: Number> {
    pub(crate) inner: Arc<ObservableSumInstrument<T>>,
}
instrument_debug!(ObservableUpDownCounter);

impl<T: Number> AsyncInstrument<T> for ObservableUpDownCounter<T> {
    fn observe(&self, value: T, attributes: &[KeyValue]) {
        self.inner.observe(value, attributes);
    }
}

/// A gauge whose value is pulled from callbacks at collection.
#[derive(Clone)]
pub struct ObservableGauge<T: Number> {
    pub(crate) inner: Arc<ObservableGaugeInstrument<T>>,
}
instrument_debug!(ObservableGauge);

impl<T: Number> AsyncInstrument<T> for ObservableGauge<T> {
    fn observe(&self, value: T, attributes: &[KeyValue]) {
        self.inner.observe(value, attributes);
    }
}
