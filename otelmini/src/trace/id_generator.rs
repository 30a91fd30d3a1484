use std::cell::RefCell;
use std::fmt;

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::trace::span_context::{SpanId, TraceId};

/// Interface for generating new trace and span identifiers.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Generate a new `TraceId`.
    fn new_trace_id(&self) -> TraceId;

    /// Generate a new `SpanId`.
    fn new_span_id(&self) -> SpanId;
}

/// Default [`IdGenerator`] using a per-thread fast RNG.
#[derive(Clone, Debug, Default)]
pub struct RandomIdGenerator {
    _private: (),
}

impl IdGenerator for RandomIdGenerator {
    fn new_trace_id(&self) -> TraceId {
        CURRENT_RNG.with(|rng| TraceId::from_bytes(rng.borrow_mut().random()))
    }

    fn new_span_id(&self) -> SpanId {
        CURRENT_RNG.with(|rng| SpanId::from_bytes(rng.borrow_mut().random()))
    }
}

thread_local! {
    static CURRENT_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_rng(&mut rand::rng()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_differ() {
        let generator = RandomIdGenerator::default();
        let a = generator.new_trace_id();
        let b = generator.new_trace_id();
        assert_ne!(a, b);
        assert_ne!(generator.new_span_id(), generator.new_span_id());
    }
}
