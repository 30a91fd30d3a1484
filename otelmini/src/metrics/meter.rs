use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::metrics::data::{Metric, ScopeMetrics};
use crate::metrics::instrument::{
    AsyncInstrument, Callback, Collect, Counter, Gauge, GaugeInstrument, Histogram,
    HistogramInstrument, InstrumentDescriptor, ObservableCounter, ObservableGauge,
    ObservableGaugeInstrument, ObservableSumInstrument, ObservableUpDownCounter, SumInstrument,
    UpDownCounter,
};
use crate::metrics::internal::{Number, DEFAULT_BOUNDS};
use crate::InstrumentationScope;

pub(crate) struct MeterInner {
    pub(crate) scope: InstrumentationScope,
    instruments: Mutex<Vec<Arc<dyn Collect>>>,
}

impl MeterInner {
    pub(crate) fn collect(&self) -> ScopeMetrics {
        let instruments = self.instruments.lock().expect("instrument list poisoned");
        ScopeMetrics {
            scope: self.scope.clone(),
            metrics: instruments
                .iter()
                .map(|instrument| instrument.collect())
                .collect::<Vec<Metric>>(),
        }
    }
}

/// Creates instruments scoped to one instrumentation library.
///
/// Cheap to clone; clones record into the same aggregator state.
#[derive(Clone)]
pub struct Meter {
    pub(crate) inner: Arc<MeterInner>,
}

impl fmt::Debug for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meter")
            .field("name", &self.inner.scope.name())
            .finish()
    }
}

impl Meter {
    pub(crate) fn new(scope: InstrumentationScope) -> Self {
        Meter {
            inner: Arc::new(MeterInner {
                scope,
                instruments: Mutex::new(Vec::new()),
            }),
        }
    }

    fn register(&self, instrument: Arc<dyn Collect>) {
        self.inner
            .instruments
            .lock()
            .expect("instrument list poisoned")
            .push(instrument);
    }

    /// A `Counter<u64>` builder.
    pub fn u64_counter(&self, name: impl Into<Cow<'static, str>>) -> CounterBuilder<'_, u64> {
        CounterBuilder::new(self, name.into())
    }

    /// A `Counter<f64>` builder.
    pub fn f64_counter(&self, name: impl Into<Cow<'static, str>>) -> CounterBuilder<'_, f64> {
        CounterBuilder::new(self, name.into())
    }

    /// An `UpDownCounter<i64>` builder.
    pub fn i64_up_down_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> UpDownCounterBuilder<'_, i64> {
        UpDownCounterBuilder::new(self, name.into())
    }

    /// An `UpDownCounter<f64>` builder.
    pub fn f64_up_down_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> UpDownCounterBuilder<'_, f64> {
        UpDownCounterBuilder::new(self, name.into())
    }

    /// A `Histogram<u64>` builder.
    pub fn u64_histogram(&self, name: impl Into<Cow<'static, str>>) -> HistogramBuilder<'_, u64> {
        HistogramBuilder::new(self, name.into())
    }

    /// A `Histogram<f64>` builder.
    pub fn f64_histogram(&self, name: impl Into<Cow<'static, str>>) -> HistogramBuilder<'_, f64> {
        HistogramBuilder::new(self, name.into())
    }

    /// A `Gauge<u64>` builder.
    pub fn u64_gauge(&self, name: impl Into<Cow<'static, str>>) -> GaugeBuilder<'_, u64> {
        GaugeBuilder::new(self, name.into())
    }

    /// A `Gauge<i64>` builder.
    pub fn i64_gauge(&self, name: impl Into<Cow<'static, str>>) -> GaugeBuilder<'_, i64> {
        GaugeBuilder::new(self, name.into())
    }

    /// A `Gauge<f64>` builder.
    pub fn f64_gauge(&self, name: impl Into<Cow<'static, str>>) -> GaugeBuilder<'_, f64> {
        GaugeBuilder::new(self, name.into())
    }

    /// An `ObservableCounter<u64>` builder.
    pub fn u64_observable_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> ObservableCounterBuilder<'_, u64> {
        ObservableCounterBuilder::new(self, name.into())
    }

    /// An `ObservableCounter<f64>` builder.
    pub fn f64_observable_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> ObservableCounterBuilder<'_, f64> {
        ObservableCounterBuilder::new(self, name.into())
    }

    /// An `ObservableUpDownCounter<i64>` builder.
    pub fn i64_observable_up_down_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> ObservableUpDownCounterBuilder<'_, i64> {
        ObservableUpDownCounterBuilder::new(self, name.into())
    }

    /// An `ObservableUpDownCounter<f64>` builder.
    pub fn f64_observable_up_down_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> ObservableUpDownCounterBuilder<'_, f64> {
        ObservableUpDownCounterBuilder::new(self, name.into())
    }

    /// An `ObservableGauge<u64>` builder.
    pub fn u64_observable_gauge(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> ObservableGaugeBuilder<'_, u64> {
        ObservableGaugeBuilder::new(self, name.into())
    }

    /// An `ObservableGauge<i64>` builder.
    pub fn i64_observable_gauge(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> ObservableGaugeBuilder<'_, i64> {
        ObservableGaugeBuilder::new(self, name.into())
    }

    /// An `ObservableGauge<f64>` builder.
    pub fn f64_observable_gauge(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> ObservableGaugeBuilder<'_, f64> {
        ObservableGaugeBuilder::new(self, name.into())
    }
}

struct BuilderCore<'a, T: Number> {
    meter: &'a Meter,
    descriptor: InstrumentDescriptor,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, T: Number> BuilderCore<'a, T> {
    fn new(meter: &'a Meter, name: Cow<'static, str>) -> Self {
        BuilderCore {
            meter,
            descriptor: InstrumentDescriptor {
                name,
                description: Cow::Borrowed(""),
                unit: Cow::Borrowed(""),
            },
            _marker: std::marker::PhantomData,
        }
    }
}

macro_rules! builder_common {
    ($builder:ident) => {
        impl<'a, T: Number> $builder<'a, T> {
            /// Describe the instrument.
            pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
                self.core.descriptor.description = description.into();
                self
            }

            /// Set the unit of measure.
            pub fn with_unit(mut self, unit: impl Into<Cow<'static, str>>) -> Self {
                self.core.descriptor.unit = unit.into();
                self
            }
        }

        impl<'a, T: Number> fmt::Debug for $builder<'a, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($builder))
                    .field("name", &self.core.descriptor.name)
                    .finish()
            }
        }
    };
}

/// Builder for [`Counter`].
pub struct CounterBuilder<'a, T: Number> {
    core: BuilderCore<'a, T>,
}
builder_common!(CounterBuilder);

impl<'a, T: Number> CounterBuilder<'a, T> {
    fn new(meter: &'a Meter, name: Cow<'static, str>) -> Self {
        CounterBuilder {
            core: BuilderCore::new(meter, name),
        }
    }

    /// Register and return the counter.
    pub fn build(self) -> Counter<T> {
        let inner = Arc::new(SumInstrument::new(self.core.descriptor, true));
        self.core.meter.register(inner.clone());
        Counter { inner }
    }
}

/// Builder for [`UpDownCounter`].
pub struct UpDownCounterBuilder<'a, T: Number> {
    core: BuilderCore<'a, T>,
}
builder_common!(UpDownCounterBuilder);

impl<'a, T: Number> UpDownCounterBuilder<'a, T> {
    fn new(meter: &'a Meter, name: Cow<'static, str>) -> Self {
        UpDownCounterBuilder {
            core: BuilderCore::new(meter, name),
        }
    }

    /// Register and return the up-down counter.
    pub fn build(self) -> UpDownCounter<T> {
        let inner = Arc::new(SumInstrument::new(self.core.descriptor, false));
        self.core.meter.register(inner.clone());
        UpDownCounter { inner }
    }
}

/// Builder for [`Histogram`].
pub struct HistogramBuilder<'a, T: Number> {
    core: BuilderCore<'a, T>,
    boundaries: Option<Vec<f64>>,
}
builder_common!(HistogramBuilder);

impl<'a, T: Number> HistogramBuilder<'a, T> {
    fn new(meter: &'a Meter, name: Cow<'static, str>) -> Self {
        HistogramBuilder {
            core: BuilderCore::new(meter, name),
            boundaries: None,
        }
    }

    /// Use explicit bucket boundaries instead of the OTel spec defaults.
    ///
    /// # Panics
    ///
    /// Panics when the boundaries are not strictly ascending; that is a
    /// configuration error and surfaces here rather than at runtime.
    pub fn with_boundaries(mut self, boundaries: Vec<f64>) -> Self {
        assert!(
            boundaries.windows(2).all(|w| w[0] < w[1]),
            "histogram boundaries must be strictly ascending"
        );
        self.boundaries = Some(boundaries);
        self
    }

    /// Register and return the histogram.
    pub fn build(self) -> Histogram<T> {
        let bounds = self.boundaries.unwrap_or_else(|| DEFAULT_BOUNDS.to_vec());
        let inner = Arc::new(HistogramInstrument::new(self.core.descriptor, bounds));
        self.core.meter.register(inner.clone());
        Histogram { inner }
    }
}

/// Builder for [`Gauge`].
pub struct GaugeBuilder<'a, T: Number> {
    core: BuilderCore<'a, T>,
}
builder_common!(GaugeBuilder);

impl<'a, T: Number> GaugeBuilder<'a, T> {
    fn new(meter: &'a Meter, name: Cow<'static, str>) -> Self {
        GaugeBuilder {
            core: BuilderCore::new(meter, name),
        }
    }

    /// Register and return the gauge.
    pub fn build(self) -> Gauge<T> {
        let inner = Arc::new(GaugeInstrument::new(self.core.descriptor));
        self.core.meter.register(inner.clone());
        Gauge { inner }
    }
}

/// Builder for [`ObservableCounter`].
pub struct ObservableCounterBuilder<'a, T: Number> {
    core: BuilderCore<'a, T>,
    callbacks: Vec<Callback<T>>,
}
builder_common!(ObservableCounterBuilder);

impl<'a, T: Number> ObservableCounterBuilder<'a, T> {
    fn new(meter: &'a Meter, name: Cow<'static, str>) -> Self {
        ObservableCounterBuilder {
            core: BuilderCore::new(meter, name),
            callbacks: Vec::new(),
        }
    }

    /// Register a callback run once per collection. The callback reports the
    /// absolute cumulative total.
    pub fn with_callback(
        mut self,
        callback: impl Fn(&dyn AsyncInstrument<T>) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Register and return the observable counter.
    pub fn build(self) -> ObservableCounter<T> {
        let inner = Arc::new(ObservableSumInstrument::new(
            self.core.descriptor,
            true,
            self.callbacks,
        ));
        self.core.meter.register(inner.clone());
        ObservableCounter { inner }
    }
}

/// Builder for [`ObservableUpDownCounter`].
pub struct ObservableUpDownCounterBuilder<'a, T: Number> {
    core: BuilderCore<'a, T>,
    callbacks: Vec<Callback<T>>,
}
builder_common!(ObservableUpDownCounterBuilder);

impl<'a, T: Number> ObservableUpDownCounterBuilder<'a, T> {
    fn new(meter: &'a Meter, name: Cow<'static, str>) -> Self {
        ObservableUpDownCounterBuilder {
            core: BuilderCore::new(meter, name),
            callbacks: Vec::new(),
        }
    }

    /// Register a callback run once per collection.
    pub fn with_callback(
        mut self,
        callback: impl Fn(&dyn AsyncInstrument<T>) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Register and return the observable up-down counter.
    pub fn build(self) -> ObservableUpDownCounter<T> {
        let inner = Arc::new(ObservableSumInstrument::new(
            self.core.descriptor,
            false,
            self.callbacks,
        ));
        self.core.meter.register(inner.clone());
        ObservableUpDownCounter { inner }
    }
}

/// Builder for [`ObservableGauge`].
pub struct ObservableGaugeBuilder<'a, T: Number> {
    core: BuilderCore<'a, T>,
    callbacks: Vec<Callback<T>>,
}
builder_common!(ObservableGaugeBuilder);

impl<'a, T: Number> ObservableGaugeBuilder<'a, T> {
    fn new(meter: &'a Meter, name: Cow<'static, str>) -> Self {
        ObservableGaugeBuilder {
            core: BuilderCore::new(meter, name),
            callbacks: Vec::new(),
        }
    }

    /// Register a callback run once per collection.
    pub fn with_callback(
        mut self,
        callback: impl Fn(&dyn AsyncInstrument<T>) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Register and return the observable gauge.
    pub fn build(self) -> ObservableGauge<T> {
        let inner = Arc::new(ObservableGaugeInstrument::new(
            self.core.descriptor,
            self.callbacks,
        ));
        self.core.meter.register(inner.clone());
        ObservableGauge { inner }
    }
}
