#[cfg(feature = "gen-tonic-messages")]
pub mod tonic {
    use crate::proto::tonic::metrics::v1::{
        metric, number_data_point, AggregationTemporality, Gauge, Histogram,
        HistogramDataPoint, Metric, MetricsData, NumberDataPoint, ResourceMetrics,
        ScopeMetrics, Sum,
    };
    use crate::proto::tonic::resource::v1::Resource;
    use crate::transform::common::{to_nanos, tonic::Attributes};
    use otelmini::metrics::data as sdk;
    use otelmini::metrics::{Number, Temporality};

    impl From<Temporality> for AggregationTemporality {
        fn from(temporality: Temporality) -> Self {
            match temporality {
                Temporality::Cumulative => AggregationTemporality::Cumulative,
                Temporality::Delta => AggregationTemporality::Delta,
            }
        }
    }

    // A metric point's numeric value encodes as `asInt` when the value is an
    // integer (including an integral-valued f64) and `asDouble` otherwise.
    pub(crate) trait IntoNumberValue: Number {
        fn into_number_value(self) -> number_data_point::Value;
    }

    impl IntoNumberValue for u64 {
        fn into_number_value(self) -> number_data_point::Value {
            number_data_point::Value::AsInt(self as i64)
        }
    }

    impl IntoNumberValue for i64 {
        fn into_number_value(self) -> number_data_point::Value {
            number_data_point::Value::AsInt(self)
        }
    }

    impl IntoNumberValue for f64 {
        fn into_number_value(self) -> number_data_point::Value {
            if self.fract() == 0.0 && self.abs() < i64::MAX as f64 {
                number_data_point::Value::AsInt(self as i64)
            } else {
                number_data_point::Value::AsDouble(self)
            }
        }
    }

    fn number_points<T: IntoNumberValue>(points: &[sdk::SumDataPoint<T>]) -> Vec<NumberDataPoint> {
        points
            .iter()
            .map(|point| NumberDataPoint {
                attributes: Attributes::from(point.attributes.clone()).0,
                start_time_unix_nano: to_nanos(point.start_time),
                time_unix_nano: to_nanos(point.time),
                flags: 0,
                value: Some(point.value.into_number_value()),
            })
            .collect()
    }

    fn gauge_points<T: IntoNumberValue>(
        points: &[sdk::GaugeDataPoint<T>],
    ) -> Vec<NumberDataPoint> {
        points
            .iter()
            .map(|point| NumberDataPoint {
                attributes: Attributes::from(point.attributes.clone()).0,
                start_time_unix_nano: to_nanos(point.start_time),
                time_unix_nano: to_nanos(point.time),
                flags: 0,
                value: Some(point.value.into_number_value()),
            })
            .collect()
    }

    fn histogram_points<T: IntoNumberValue>(
        points: &[sdk::HistogramDataPoint<T>],
    ) -> Vec<HistogramDataPoint> {
        points
            .iter()
            .map(|point| HistogramDataPoint {
                attributes: Attributes::from(point.attributes.clone()).0,
                start_time_unix_nano: to_nanos(point.start_time),
                time_unix_nano: to_nanos(point.time),
                count: point.count,
                sum: Some(point.sum.as_f64()),
                bucket_counts: point.bucket_counts.clone(),
                explicit_bounds: point.bounds.clone(),
                flags: 0,
                min: point.min.map(Number::as_f64),
                max: point.max.map(Number::as_f64),
            })
            .collect()
    }

    fn metric_data<T: IntoNumberValue>(data: &sdk::MetricData<T>) -> metric::Data {
        match data {
            sdk::MetricData::Gauge(gauge) => metric::Data::Gauge(Gauge {
                data_points: gauge_points(&gauge.data_points),
            }),
            sdk::MetricData::Sum(sum) => metric::Data::Sum(Sum {
                data_points: number_points(&sum.data_points),
                aggregation_temporality: AggregationTemporality::from(sum.temporality) as i32,
                is_monotonic: sum.is_monotonic,
            }),
            sdk::MetricData::Histogram(histogram) => metric::Data::Histogram(Histogram {
                data_points: histogram_points(&histogram.data_points),
                aggregation_temporality: AggregationTemporality::from(histogram.temporality)
                    as i32,
            }),
        }
    }

    impl From<&sdk::Metric> for Metric {
        fn from(metric: &sdk::Metric) -> Self {
            Metric {
                name: metric.name.to_string(),
                description: metric.description.to_string(),
                unit: metric.unit.to_string(),
                data: Some(match &metric.data {
                    sdk::AggregatedMetrics::F64(data) => metric_data(data),
                    sdk::AggregatedMetrics::U64(data) => metric_data(data),
                    sdk::AggregatedMetrics::I64(data) => metric_data(data),
                }),
            }
        }
    }

    impl From<&sdk::ScopeMetrics> for ScopeMetrics {
        fn from(scope_metrics: &sdk::ScopeMetrics) -> Self {
            ScopeMetrics {
                scope: Some((&scope_metrics.scope).into()),
                schema_url: scope_metrics
                    .scope
                    .schema_url()
                    .unwrap_or_default()
                    .to_string(),
                metrics: scope_metrics.metrics.iter().map(Into::into).collect(),
            }
        }
    }

    impl From<&sdk::ResourceMetrics> for ResourceMetrics {
        fn from(rm: &sdk::ResourceMetrics) -> Self {
            ResourceMetrics {
                resource: Some(Resource::from(&rm.resource)),
                schema_url: rm.resource.schema_url().unwrap_or_default().to_string(),
                scope_metrics: rm.scope_metrics.iter().map(Into::into).collect(),
            }
        }
    }

    impl From<&sdk::ResourceMetrics> for MetricsData {
        fn from(rm: &sdk::ResourceMetrics) -> Self {
            MetricsData {
                resource_metrics: vec![rm.into()],
            }
        }
    }
}
