use crate::metrics::data::{Gauge, GaugeDataPoint, MetricData};
use crate::metrics::internal::{Number, ValueMap};
use crate::KeyValue;

struct LastValue<T> {
    value: T,
}

/// Keeps the last written value per attribute set.
pub(crate) struct LastValueAggregate<T: Number> {
    value_map: ValueMap<LastValue<T>>,
}

impl<T: Number> LastValueAggregate<T> {
    pub(crate) fn new() -> Self {
        LastValueAggregate {
            value_map: ValueMap::default(),
        }
    }

    pub(crate) fn measure(&self, value: T, attrs: &[KeyValue]) {
        self.value_map.update(
            attrs,
            || LastValue { value },
            |cell| cell.value = value,
        );
    }

    pub(crate) fn collect(&self) -> MetricData<T> {
        let time = crate::time::now();
        let data_points = self
            .value_map
            .collect(|attrs, start_time, cell| GaugeDataPoint {
                attributes: attrs.clone().into_vec(),
                start_time,
                time,
                value: cell.value,
            });
        MetricData::Gauge(Gauge { data_points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let aggregate = LastValueAggregate::<f64>::new();
        aggregate.measure(45.5, &[]);
        aggregate.measure(78.2, &[]);
        match aggregate.collect() {
            MetricData::Gauge(gauge) => {
                assert_eq!(gauge.data_points.len(), 1);
                assert_eq!(gauge.data_points[0].value, 78.2);
            }
            other => panic!("expected gauge, got {other:?}"),
        }
    }
}
