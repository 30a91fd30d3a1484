use crate::metrics::data::{Histogram, HistogramDataPoint, MetricData};
use crate::metrics::internal::{Number, ValueMap};
use crate::metrics::Temporality;
use crate::KeyValue;

/// The default explicit bucket boundaries from the OTel specification.
pub(crate) const DEFAULT_BOUNDS: [f64; 15] = [
    0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0, 5000.0, 7500.0,
    10000.0,
];

struct Buckets<T> {
    counts: Vec<u64>,
    count: u64,
    sum: T,
    min: Option<T>,
    max: Option<T>,
}

impl<T: Number> Buckets<T> {
    fn new(n: usize) -> Self {
        Buckets {
            counts: vec![0; n],
            count: 0,
            sum: T::zero(),
            min: None,
            max: None,
        }
    }

    fn record(&mut self, index: usize, value: T) {
        self.counts[index] += 1;
        self.count += 1;
        self.sum = self.sum.add(value);
        self.min = Some(match self.min {
            Some(min) if min < value => min,
            _ => value,
        });
        self.max = Some(match self.max {
            Some(max) if max > value => max,
            _ => value,
        });
    }
}

/// Summarizes measurements as a bucketed distribution per attribute set.
pub(crate) struct HistogramAggregate<T: Number> {
    bounds: Vec<f64>,
    value_map: ValueMap<Buckets<T>>,
}

impl<T: Number> HistogramAggregate<T> {
    /// `bounds` must be ascending; the +infinity bucket is implied.
    pub(crate) fn new(bounds: Vec<f64>) -> Self {
        HistogramAggregate {
            value_map: ValueMap::default(),
            bounds,
        }
    }

    pub(crate) fn measure(&self, value: T, attrs: &[KeyValue]) {
        // values equal to a boundary fall into the lower bucket
        let index = self.bounds.partition_point(|&bound| bound < value.as_f64());
        let bucket_count = self.bounds.len() + 1;
        self.value_map.update(
            attrs,
            || Buckets::new(bucket_count),
            |buckets| buckets.record(index, value),
        );
    }

    pub(crate) fn collect(&self) -> MetricData<T> {
        let time = crate::time::now();
        let data_points = self
            .value_map
            .collect(|attrs, start_time, buckets| HistogramDataPoint {
                attributes: attrs.clone().into_vec(),
                start_time,
                time,
                count: buckets.count,
                bounds: self.bounds.clone(),
                bucket_counts: buckets.counts.clone(),
                min: buckets.min,
                max: buckets.max,
                sum: buckets.sum,
            });
        MetricData::Histogram(Histogram {
            data_points,
            temporality: Temporality::Cumulative,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points<T: Number>(data: MetricData<T>) -> Vec<HistogramDataPoint<T>> {
        match data {
            MetricData::Histogram(histogram) => histogram.data_points,
            other => panic!("expected histogram, got {other:?}"),
        }
    }

    #[test]
    fn records_distribution() {
        let aggregate = HistogramAggregate::<f64>::new(vec![10.0, 50.0, 100.0]);
        for value in [5.0, 15.0, 25.0, 75.0, 150.0] {
            aggregate.measure(value, &[]);
        }

        let points = points(aggregate.collect());
        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(point.count, 5);
        assert_eq!(point.sum, 270.0);
        assert_eq!(point.min, Some(5.0));
        assert_eq!(point.max, Some(150.0));
        assert_eq!(point.bucket_counts, vec![1, 2, 1, 1]);
        assert_eq!(point.bucket_counts.len(), point.bounds.len() + 1);
        assert_eq!(point.bucket_counts.iter().sum::<u64>(), point.count);
    }

    #[test]
    fn boundary_values_fall_into_lower_bucket() {
        let aggregate = HistogramAggregate::<u64>::new(vec![10.0, 50.0]);
        aggregate.measure(10, &[]);
        aggregate.measure(11, &[]);
        let points = points(aggregate.collect());
        assert_eq!(points[0].bucket_counts, vec![1, 1, 0]);
    }

    #[test]
    fn default_bounds_are_ascending() {
        assert!(DEFAULT_BOUNDS.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(DEFAULT_BOUNDS.len(), 15);
    }
}
