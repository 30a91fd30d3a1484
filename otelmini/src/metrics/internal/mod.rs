//! Aggregator cells and the per-attribute-set cell map.

mod histogram;
mod last_value;
mod sum;

pub(crate) use histogram::{HistogramAggregate, DEFAULT_BOUNDS};
pub(crate) use last_value::LastValueAggregate;
pub(crate) use sum::SumAggregate;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::SystemTime;

use crate::metrics::data::{AggregatedMetrics, MetricData};
use crate::{Key, KeyValue, Value};

mod private {
    pub trait Sealed {}
    impl Sealed for u64 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

/// Marker trait for the value types instruments can record: `u64`, `i64`
/// and `f64`.
pub trait Number:
    Copy + PartialOrd + PartialEq + Send + Sync + fmt::Debug + 'static + private::Sealed
{
    /// The additive identity.
    fn zero() -> Self;
    /// Saturating addition.
    fn add(self, rhs: Self) -> Self;
    /// Lossy conversion for bucket lookup.
    fn as_f64(self) -> f64;
    /// True for values a monotonic sum must reject.
    fn is_negative(self) -> bool;
    /// Tag typed metric data with its value type.
    fn make_aggregated(data: MetricData<Self>) -> AggregatedMetrics;
}

impl Number for u64 {
    fn zero() -> Self {
        0
    }
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
    fn as_f64(self) -> f64 {
        self as f64
    }
    fn is_negative(self) -> bool {
        false
    }
    fn make_aggregated(data: MetricData<Self>) -> AggregatedMetrics {
        AggregatedMetrics::U64(data)
    }
}

impl Number for i64 {
    fn zero() -> Self {
        0
    }
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
    fn as_f64(self) -> f64 {
        self as f64
    }
    fn is_negative(self) -> bool {
        self < 0
    }
    fn make_aggregated(data: MetricData<Self>) -> AggregatedMetrics {
        AggregatedMetrics::I64(data)
    }
}

impl Number for f64 {
    fn zero() -> Self {
        0.0
    }
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    fn as_f64(self) -> f64 {
        self
    }
    fn is_negative(self) -> bool {
        self < 0.0
    }
    fn make_aggregated(data: MetricData<Self>) -> AggregatedMetrics {
        AggregatedMetrics::F64(data)
    }
}

/// The identity of a data point: its attribute set with unordered-map
/// equality. The canonical form sorts by key and keeps the last write per
/// key, so `[a=1, b=2]` and `[b=2, a=1]` land in the same cell.
#[derive(Clone, Debug)]
pub(crate) struct AttributeSet(Vec<KeyValue>);

impl AttributeSet {
    pub(crate) fn from(attributes: &[KeyValue]) -> Self {
        let mut sorted = attributes.to_vec();
        // stable sort keeps the later duplicate after dedup-by-key below
        sorted.sort_by(|a, b| a.key.cmp(&b.key));
        let mut deduped: Vec<KeyValue> = Vec::with_capacity(sorted.len());
        for kv in sorted {
            match deduped.last_mut() {
                Some(last) if last.key == kv.key => *last = kv,
                _ => deduped.push(kv),
            }
        }
        AttributeSet(deduped)
    }

    pub(crate) fn into_vec(self) -> Vec<KeyValue> {
        self.0
    }

    pub(crate) fn as_slice(&self) -> &[KeyValue] {
        &self.0
    }
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // f64 by bit pattern so the Eq impl stays lawful
        (Value::F64(x), Value::F64(y)) => x.to_bits() == y.to_bits(),
        (Value::Array(crate::Array::F64(x)), Value::Array(crate::Array::F64(y))) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|(x, y)| x.to_bits() == y.to_bits())
        }
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map(|other| value_eq(v, other)).unwrap_or(false))
        }
        _ => a == b,
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Bool(v) => {
            state.write_u8(1);
            v.hash(state);
        }
        Value::I64(v) => {
            state.write_u8(2);
            v.hash(state);
        }
        Value::F64(v) => {
            state.write_u8(3);
            v.to_bits().hash(state);
        }
        Value::String(v) => {
            state.write_u8(4);
            v.as_str().hash(state);
        }
        Value::Bytes(v) => {
            state.write_u8(5);
            v.hash(state);
        }
        Value::Array(array) => {
            state.write_u8(6);
            match array {
                crate::Array::Bool(vs) => vs.hash(state),
                crate::Array::I64(vs) => vs.hash(state),
                crate::Array::F64(vs) => {
                    for v in vs {
                        v.to_bits().hash(state);
                    }
                }
                crate::Array::String(vs) => {
                    for v in vs {
                        v.as_str().hash(state);
                    }
                }
            }
        }
        Value::Map(map) => {
            state.write_u8(7);
            let mut keys: Vec<&Key> = map.keys().collect();
            keys.sort();
            for key in keys {
                key.hash(state);
                hash_value(&map[key], state);
            }
        }
    }
}

impl PartialEq for AttributeSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.key == b.key && value_eq(&a.value, &b.value))
    }
}

impl Eq for AttributeSet {}

impl Hash for AttributeSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for kv in &self.0 {
            kv.key.hash(state);
            hash_value(&kv.value, state);
        }
    }
}

/// One live aggregator cell plus the time the cell was created, which is
/// the cumulative start time of its series.
pub(crate) struct Cell<A> {
    pub(crate) aggregator: A,
    pub(crate) start_time: SystemTime,
}

/// The per-instrument map of aggregator cells keyed by attribute set.
///
/// Updates take a short critical section; network I/O never happens under
/// this lock.
pub(crate) struct ValueMap<A> {
    cells: Mutex<HashMap<AttributeSet, Cell<A>>>,
}

impl<A> Default for ValueMap<A> {
    fn default() -> Self {
        ValueMap {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<A> ValueMap<A> {
    /// Apply `update` to the cell for `attributes`, creating it on first use.
    pub(crate) fn update<F>(&self, attributes: &[KeyValue], create: impl FnOnce() -> A, update: F)
    where
        F: FnOnce(&mut A),
    {
        let mut cells = self.cells.lock().expect("aggregator map lock poisoned");
        let cell = cells
            .entry(AttributeSet::from(attributes))
            .or_insert_with(|| Cell {
                aggregator: create(),
                start_time: crate::time::now(),
            });
        update(&mut cell.aggregator);
    }

    /// Snapshot every cell, without resetting (cumulative collection).
    pub(crate) fn collect<P>(
        &self,
        mut point: impl FnMut(&AttributeSet, SystemTime, &A) -> P,
    ) -> Vec<P> {
        let cells = self.cells.lock().expect("aggregator map lock poisoned");
        cells
            .iter()
            .map(|(attrs, cell)| point(attrs, cell.start_time, &cell.aggregator))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_set_is_order_insensitive() {
        let a = AttributeSet::from(&[KeyValue::new("a", 1), KeyValue::new("b", 2)]);
        let b = AttributeSet::from(&[KeyValue::new("b", 2), KeyValue::new("a", 1)]);
        assert_eq!(a, b);

        let mut hasher_a = std::collections::hash_map::DefaultHasher::new();
        let mut hasher_b = std::collections::hash_map::DefaultHasher::new();
        a.hash(&mut hasher_a);
        b.hash(&mut hasher_b);
        assert_eq!(hasher_a.finish(), hasher_b.finish());
    }

    #[test]
    fn attribute_set_last_duplicate_wins() {
        let set = AttributeSet::from(&[KeyValue::new("a", 1), KeyValue::new("a", 2)]);
        assert_eq!(set.as_slice(), &[KeyValue::new("a", 2)]);
    }

    #[test]
    fn distinct_values_are_distinct_identities() {
        let a = AttributeSet::from(&[KeyValue::new("a", 1)]);
        let b = AttributeSet::from(&[KeyValue::new("a", 2)]);
        assert_ne!(a, b);
    }
}
