use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{OTelSdkError, OTelSdkResult};
use crate::metrics::data::ResourceMetrics;
use crate::metrics::meter::{Meter, MeterInner};
use crate::metrics::reader::{MetricReader, SdkProducer};
use crate::{InstrumentationScope, Resource};

pub(crate) struct MeterProviderInner {
    resource: Resource,
    meters: Mutex<Vec<Meter>>,
    readers: Vec<Arc<dyn MetricReader>>,
    stopped: AtomicBool,
}

impl SdkProducer for MeterProviderInner {
    fn produce(&self, rm: &mut ResourceMetrics) -> OTelSdkResult {
        rm.resource = self.resource.clone();
        let meters = self.meters.lock().expect("meter list poisoned");
        rm.scope_metrics = meters.iter().map(|meter| meter.inner.collect()).collect();
        Ok(())
    }
}

impl MeterProviderInner {
    fn shutdown(&self) -> OTelSdkResult {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let mut result = Ok(());
        for reader in &self.readers {
            if let Err(err) = reader.shutdown() {
                result = Err(err);
            }
        }
        result
    }
}

impl Drop for MeterProviderInner {
    fn drop(&mut self) {
        if !self.stopped.load(Ordering::SeqCst) {
            let _ = self.shutdown();
        }
    }
}

/// Creator and registry of [`Meter`] instances, and owner of the attached
/// metric readers.
#[derive(Clone)]
pub struct SdkMeterProvider {
    inner: Arc<MeterProviderInner>,
}

impl fmt::Debug for SdkMeterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkMeterProvider")
            .field("readers", &self.inner.readers.len())
            .finish()
    }
}

impl Default for SdkMeterProvider {
    fn default() -> Self {
        SdkMeterProvider::builder().build()
    }
}

impl SdkMeterProvider {
    /// Create a new builder.
    pub fn builder() -> MeterProviderBuilder {
        MeterProviderBuilder::default()
    }

    /// The resource attached to metrics from this provider.
    pub fn resource(&self) -> &Resource {
        &self.inner.resource
    }

    /// Create (or return the existing) meter for the named scope.
    pub fn meter(&self, name: impl Into<Cow<'static, str>>) -> Meter {
        self.meter_with_scope(InstrumentationScope::builder(name).build())
    }

    /// Create (or return the existing) meter for a fully specified scope.
    pub fn meter_with_scope(&self, scope: InstrumentationScope) -> Meter {
        let mut meters = self.inner.meters.lock().expect("meter list poisoned");
        if let Some(existing) = meters.iter().find(|meter| meter.inner.scope == scope) {
            return existing.clone();
        }
        let meter = Meter::new(scope);
        meters.push(meter.clone());
        meter
    }

    /// Collect and export through every reader now.
    pub fn force_flush(&self) -> OTelSdkResult {
        let mut result = Ok(());
        for reader in &self.inner.readers {
            if let Err(err) = reader.force_flush() {
                result = Err(err);
            }
        }
        result
    }

    /// Shut every reader down; each performs one final collect/export.
    pub fn shutdown(&self) -> OTelSdkResult {
        self.inner.shutdown()
    }
}

/// Builder for [`SdkMeterProvider`].
#[derive(Default)]
pub struct MeterProviderBuilder {
    resource: Option<Resource>,
    readers: Vec<Arc<dyn MetricReader>>,
}

impl fmt::Debug for MeterProviderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeterProviderBuilder")
            .field("readers", &self.readers.len())
            .finish()
    }
}

impl MeterProviderBuilder {
    /// Attach a reader. Each reader collects independently.
    pub fn with_reader<R: MetricReader + 'static>(mut self, reader: R) -> Self {
        self.readers.push(Arc::new(reader));
        self
    }

    /// Set the resource describing this entity.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Build the provider and register the pipeline with every reader.
    pub fn build(self) -> SdkMeterProvider {
        let inner = Arc::new(MeterProviderInner {
            resource: self.resource.unwrap_or_default(),
            meters: Mutex::new(Vec::new()),
            readers: self.readers,
            stopped: AtomicBool::new(false),
        });

        let producer: Arc<dyn SdkProducer> = inner.clone();
        for reader in &inner.readers {
            reader.register_pipeline(Arc::downgrade(&producer));
        }

        SdkMeterProvider { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::data::{AggregatedMetrics, MetricData};
    use crate::metrics::{InMemoryMetricExporter, ManualReader, PeriodicReader, Temporality};
    use crate::KeyValue;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;

    fn find_metric<'a>(
        rm: &'a crate::metrics::data::ResourceMetrics,
        name: &str,
    ) -> &'a crate::metrics::data::Metric {
        rm.scope_metrics
            .iter()
            .flat_map(|sm| sm.metrics.iter())
            .find(|m| m.name == name)
            .unwrap_or_else(|| panic!("metric {name} not exported"))
    }

    #[test]
    fn counter_aggregates_by_attribute_set() {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(ManualReader::new(exporter.clone()))
            .build();
        let meter = provider.meter("test");
        let counter = meter.u64_counter("http.requests").build();

        counter.add(1, &[KeyValue::new("method", "GET")]);
        counter.add(2, &[KeyValue::new("method", "POST")]);
        counter.add(3, &[KeyValue::new("method", "GET")]);
        provider.force_flush().unwrap();

        let snapshots = exporter.exported_metrics();
        let metric = find_metric(snapshots.last().unwrap(), "http.requests");
        let AggregatedMetrics::U64(MetricData::Sum(sum)) = &metric.data else {
            panic!("expected u64 sum");
        };
        assert!(sum.is_monotonic);
        assert_eq!(sum.temporality, Temporality::Cumulative);
        assert_eq!(sum.data_points.len(), 2);

        let get = sum
            .data_points
            .iter()
            .find(|p| p.attributes == vec![KeyValue::new("method", "GET")])
            .unwrap();
        assert_eq!(get.value, 4);
        let post = sum
            .data_points
            .iter()
            .find(|p| p.attributes == vec![KeyValue::new("method", "POST")])
            .unwrap();
        assert_eq!(post.value, 2);
    }

    #[test]
    fn attribute_order_does_not_split_cells() {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(ManualReader::new(exporter.clone()))
            .build();
        let counter = provider.meter("test").u64_counter("c").build();

        counter.add(1, &[KeyValue::new("a", "1"), KeyValue::new("b", "2")]);
        counter.add(1, &[KeyValue::new("b", "2"), KeyValue::new("a", "1")]);
        provider.force_flush().unwrap();

        let snapshots = exporter.exported_metrics();
        let metric = find_metric(snapshots.last().unwrap(), "c");
        let AggregatedMetrics::U64(MetricData::Sum(sum)) = &metric.data else {
            panic!("expected u64 sum");
        };
        assert_eq!(sum.data_points.len(), 1);
        assert_eq!(sum.data_points[0].value, 2);
    }

    #[test]
    fn up_down_counter_is_not_monotonic() {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(ManualReader::new(exporter.clone()))
            .build();
        let updown = provider.meter("test").i64_up_down_counter("queue.size").build();

        updown.add(10, &[]);
        updown.add(-3, &[]);
        provider.force_flush().unwrap();

        let snapshots = exporter.exported_metrics();
        let metric = find_metric(snapshots.last().unwrap(), "queue.size");
        let AggregatedMetrics::I64(MetricData::Sum(sum)) = &metric.data else {
            panic!("expected i64 sum");
        };
        assert!(!sum.is_monotonic);
        assert_eq!(sum.data_points[0].value, 7);
    }

    #[test]
    fn histogram_distribution() {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(ManualReader::new(exporter.clone()))
            .build();
        let histogram = provider
            .meter("test")
            .f64_histogram("latency")
            .with_boundaries(vec![10.0, 50.0, 100.0])
            .build();

        for value in [5.0, 15.0, 25.0, 75.0, 150.0] {
            histogram.record(value, &[]);
        }
        provider.force_flush().unwrap();

        let snapshots = exporter.exported_metrics();
        let metric = find_metric(snapshots.last().unwrap(), "latency");
        let AggregatedMetrics::F64(MetricData::Histogram(histogram)) = &metric.data else {
            panic!("expected f64 histogram");
        };
        let point = &histogram.data_points[0];
        assert_eq!(point.count, 5);
        assert_eq!(point.sum, 270.0);
        assert_eq!(point.min, Some(5.0));
        assert_eq!(point.max, Some(150.0));
        assert_eq!(point.bucket_counts, vec![1, 2, 1, 1]);
    }

    #[test]
    fn observable_gauge_refreshes_per_collection() {
        let value = Arc::new(Mutex::new(45.5f64));
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(ManualReader::new(exporter.clone()))
            .build();
        let cb_value = value.clone();
        let _gauge = provider
            .meter("test")
            .f64_observable_gauge("cpu_percent")
            .with_callback(move |observer| {
                observer.observe(*cb_value.lock().unwrap(), &[]);
            })
            .build();

        provider.force_flush().unwrap();
        *value.lock().unwrap() = 78.2;
        provider.force_flush().unwrap();

        let snapshots = exporter.exported_metrics();
        assert_eq!(snapshots.len(), 2);
        let values: Vec<f64> = snapshots
            .iter()
            .map(|rm| {
                let metric = find_metric(rm, "cpu_percent");
                let AggregatedMetrics::F64(MetricData::Gauge(gauge)) = &metric.data else {
                    panic!("expected f64 gauge");
                };
                gauge.data_points[0].value
            })
            .collect();
        assert_eq!(values, vec![45.5, 78.2]);
    }

    #[test]
    fn observable_counter_reports_absolute_totals() {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(ManualReader::new(exporter.clone()))
            .build();
        let total = Arc::new(AtomicU64::new(100));
        let cb_total = total.clone();
        let _counter = provider
            .meter("test")
            .u64_observable_counter("bytes.sent")
            .with_callback(move |observer| {
                observer.observe(cb_total.load(Ordering::SeqCst), &[]);
            })
            .build();

        provider.force_flush().unwrap();
        total.store(250, Ordering::SeqCst);
        provider.force_flush().unwrap();

        let snapshots = exporter.exported_metrics();
        let last = find_metric(snapshots.last().unwrap(), "bytes.sent");
        let AggregatedMetrics::U64(MetricData::Sum(sum)) = &last.data else {
            panic!("expected u64 sum");
        };
        assert!(sum.is_monotonic);
        assert_eq!(sum.data_points[0].value, 250);
    }

    #[test]
    fn panicking_callback_does_not_poison_collection() {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(ManualReader::new(exporter.clone()))
            .build();
        let meter = provider.meter("test");
        let _bad = meter
            .f64_observable_gauge("bad")
            .with_callback(|_observer| panic!("callback bug"))
            .build();
        let _good = meter
            .f64_observable_gauge("good")
            .with_callback(|observer| observer.observe(1.0, &[]))
            .build();

        provider.force_flush().unwrap();

        let snapshots = exporter.exported_metrics();
        let metric = find_metric(snapshots.last().unwrap(), "good");
        let AggregatedMetrics::F64(MetricData::Gauge(gauge)) = &metric.data else {
            panic!("expected f64 gauge");
        };
        assert_eq!(gauge.data_points[0].value, 1.0);
    }

    #[test]
    fn periodic_reader_final_export_on_shutdown() {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(
                PeriodicReader::builder(exporter.clone())
                    .with_interval(Duration::from_secs(600))
                    .build(),
            )
            .build();
        let counter = provider.meter("test").u64_counter("events").build();
        counter.add(5, &[]);

        provider.shutdown().unwrap();

        let snapshots = exporter.exported_metrics();
        assert_eq!(snapshots.len(), 1);
        let metric = find_metric(&snapshots[0], "events");
        let AggregatedMetrics::U64(MetricData::Sum(sum)) = &metric.data else {
            panic!("expected u64 sum");
        };
        assert_eq!(sum.data_points[0].value, 5);
        assert!(exporter.is_shutdown_called());
    }

    #[test]
    fn meter_with_same_scope_is_shared() {
        let provider = SdkMeterProvider::builder().build();
        let a = provider.meter("shared");
        let b = provider.meter("shared");
        assert!(Arc::ptr_eq(&a.inner, &b.inner));
    }
}
