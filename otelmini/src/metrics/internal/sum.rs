use crate::metrics::data::{MetricData, Sum, SumDataPoint};
use crate::metrics::internal::{Number, ValueMap};
use crate::metrics::Temporality;
use crate::{otel_warn, KeyValue};

struct Increment<T> {
    value: T,
}

/// Summarizes measurements as their arithmetic sum, scoped by attribute set.
pub(crate) struct SumAggregate<T: Number> {
    value_map: ValueMap<Increment<T>>,
    monotonic: bool,
}

impl<T: Number> SumAggregate<T> {
    pub(crate) fn new(monotonic: bool) -> Self {
        SumAggregate {
            value_map: ValueMap::default(),
            monotonic,
        }
    }

    /// Add a delta to the cell for `attrs`.
    pub(crate) fn measure(&self, value: T, attrs: &[KeyValue]) {
        if self.monotonic && value.is_negative() {
            otel_warn!(
                name: "Counter.NegativeValue",
                value = format!("{value:?}")
            );
            return;
        }
        self.value_map.update(
            attrs,
            || Increment { value: T::zero() },
            |cell| cell.value = cell.value.add(value),
        );
    }

    /// Overwrite the cell for `attrs` with an absolute cumulative total, as
    /// reported by observable callbacks.
    pub(crate) fn set_absolute(&self, value: T, attrs: &[KeyValue]) {
        self.value_map.update(
            attrs,
            || Increment { value: T::zero() },
            |cell| cell.value = value,
        );
    }

    /// Snapshot the cumulative sums.
    pub(crate) fn collect(&self) -> MetricData<T> {
        let time = crate::time::now();
        let data_points = self.value_map.collect(|attrs, start_time, cell| SumDataPoint {
            attributes: attrs.clone().into_vec(),
            start_time,
            time,
            value: cell.value,
        });
        MetricData::Sum(Sum {
            data_points,
            temporality: Temporality::Cumulative,
            is_monotonic: self.monotonic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points<T: Number>(data: MetricData<T>) -> Vec<SumDataPoint<T>> {
        match data {
            MetricData::Sum(sum) => sum.data_points,
            other => panic!("expected sum, got {other:?}"),
        }
    }

    #[test]
    fn sums_group_by_attribute_set() {
        let aggregate = SumAggregate::<u64>::new(true);
        aggregate.measure(1, &[KeyValue::new("method", "GET")]);
        aggregate.measure(2, &[KeyValue::new("method", "POST")]);
        aggregate.measure(3, &[KeyValue::new("method", "GET")]);

        let mut points = points(aggregate.collect());
        points.sort_by(|a, b| format!("{:?}", a.attributes).cmp(&format!("{:?}", b.attributes)));
        assert_eq!(points.len(), 2);
        let get = points
            .iter()
            .find(|p| p.attributes == vec![KeyValue::new("method", "GET")])
            .unwrap();
        assert_eq!(get.value, 4);
        let post = points
            .iter()
            .find(|p| p.attributes == vec![KeyValue::new("method", "POST")])
            .unwrap();
        assert_eq!(post.value, 2);
    }

    #[test]
    fn monotonic_sum_rejects_negative_values() {
        let aggregate = SumAggregate::<i64>::new(true);
        aggregate.measure(5, &[]);
        aggregate.measure(-3, &[]);
        let points = points(aggregate.collect());
        assert_eq!(points[0].value, 5);
    }

    #[test]
    fn non_monotonic_sum_accepts_negative_values() {
        let aggregate = SumAggregate::<i64>::new(false);
        aggregate.measure(5, &[]);
        aggregate.measure(-3, &[]);
        let points = points(aggregate.collect());
        assert_eq!(points[0].value, 2);
    }

    #[test]
    fn set_absolute_overwrites() {
        let aggregate = SumAggregate::<f64>::new(true);
        aggregate.set_absolute(10.0, &[]);
        aggregate.set_absolute(12.5, &[]);
        let points = points(aggregate.collect());
        assert_eq!(points[0].value, 12.5);
    }

    #[test]
    fn collection_is_cumulative() {
        let aggregate = SumAggregate::<u64>::new(true);
        aggregate.measure(1, &[]);
        assert_eq!(points(aggregate.collect())[0].value, 1);
        aggregate.measure(1, &[]);
        assert_eq!(points(aggregate.collect())[0].value, 2);
    }
}
