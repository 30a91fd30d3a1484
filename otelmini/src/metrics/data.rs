//! Types for delivery of pre-aggregated metric time series data.

use std::borrow::Cow;
use std::time::SystemTime;

use crate::metrics::Temporality;
use crate::{InstrumentationScope, KeyValue, Resource};

/// A collection of [ScopeMetrics] and the [Resource] that produced them.
/// One snapshot of every live aggregator cell, taken at collection time.
#[derive(Debug, Clone)]
pub struct ResourceMetrics {
    /// The entity that collected the metrics.
    pub resource: Resource,
    /// The collection of metrics with unique scopes.
    pub scope_metrics: Vec<ScopeMetrics>,
}

impl Default for ResourceMetrics {
    fn default() -> Self {
        ResourceMetrics {
            resource: Resource::empty(),
            scope_metrics: Vec::new(),
        }
    }
}

/// The metrics produced by a single meter.
#[derive(Debug, Clone, Default)]
pub struct ScopeMetrics {
    /// The scope the meter was created with.
    pub scope: InstrumentationScope,
    /// The aggregated streams created by the meter's instruments.
    pub metrics: Vec<Metric>,
}

/// One or more aggregated time series from an instrument.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The name of the instrument.
    pub name: Cow<'static, str>,
    /// The instrument description.
    pub description: Cow<'static, str>,
    /// The unit the instrument reports in.
    pub unit: Cow<'static, str>,
    /// The aggregated data.
    pub data: AggregatedMetrics,
}

/// Aggregated metric data, tagged by value type.
#[derive(Debug, Clone)]
pub enum AggregatedMetrics {
    /// Data with `f64` values.
    F64(MetricData<f64>),
    /// Data with `u64` values.
    U64(MetricData<u64>),
    /// Data with `i64` values.
    I64(MetricData<i64>),
}

/// Aggregated data for one value type.
#[derive(Debug, Clone)]
pub enum MetricData<T> {
    /// Last-value aggregation.
    Gauge(Gauge<T>),
    /// Arithmetic sum aggregation.
    Sum(Sum<T>),
    /// Bucketed histogram aggregation.
    Histogram(Histogram<T>),
}

impl From<MetricData<f64>> for AggregatedMetrics {
    fn from(value: MetricData<f64>) -> Self {
        AggregatedMetrics::F64(value)
    }
}

impl From<MetricData<u64>> for AggregatedMetrics {
    fn from(value: MetricData<u64>) -> Self {
        AggregatedMetrics::U64(value)
    }
}

impl From<MetricData<i64>> for AggregatedMetrics {
    fn from(value: MetricData<i64>) -> Self {
        AggregatedMetrics::I64(value)
    }
}

/// A measurement of the current value of an instrument.
#[derive(Debug, Clone)]
pub struct Gauge<T> {
    /// One point per live attribute set.
    pub data_points: Vec<GaugeDataPoint<T>>,
}

/// A single last-value point.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeDataPoint<T> {
    /// The attribute set identifying this time series.
    pub attributes: Vec<KeyValue>,
    /// When this cell first observed a value.
    pub start_time: SystemTime,
    /// When this snapshot was taken.
    pub time: SystemTime,
    /// The last value written.
    pub value: T,
}

/// The arithmetic sum of measurements.
#[derive(Debug, Clone)]
pub struct Sum<T> {
    /// One point per live attribute set.
    pub data_points: Vec<SumDataPoint<T>>,
    /// The aggregation window type.
    pub temporality: Temporality,
    /// True when the sum only increases.
    pub is_monotonic: bool,
}

/// A single sum point.
#[derive(Debug, Clone, PartialEq)]
pub struct SumDataPoint<T> {
    /// The attribute set identifying this time series.
    pub attributes: Vec<KeyValue>,
    /// When this cell started accumulating.
    pub start_time: SystemTime,
    /// When this snapshot was taken.
    pub time: SystemTime,
    /// The accumulated value.
    pub value: T,
}

/// The bucketed distribution of measurements.
#[derive(Debug, Clone)]
pub struct Histogram<T> {
    /// One point per live attribute set.
    pub data_points: Vec<HistogramDataPoint<T>>,
    /// The aggregation window type.
    pub temporality: Temporality,
}

/// A single histogram point.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramDataPoint<T> {
    /// The attribute set identifying this time series.
    pub attributes: Vec<KeyValue>,
    /// When this cell started accumulating.
    pub start_time: SystemTime,
    /// When this snapshot was taken.
    pub time: SystemTime,
    /// Total number of recorded values.
    pub count: u64,
    /// The upper bounds of the buckets, ascending. The final +infinity
    /// boundary is implied, so `bucket_counts.len() == bounds.len() + 1`.
    pub bounds: Vec<f64>,
    /// The count in each bucket.
    pub bucket_counts: Vec<u64>,
    /// The smallest recorded value.
    pub min: Option<T>,
    /// The largest recorded value.
    pub max: Option<T>,
    /// The sum of recorded values.
    pub sum: T,
}
