//! Head sampling: the per-span keep/drop decision made at creation time.

use std::fmt;

use crate::trace::span_context::{SpanContext, TraceId};

/// The decision produced by a sampler for one new span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplingDecision {
    /// The span is not recorded and not exported. It still carries its
    /// context so children parent correctly.
    Drop,
    /// The span is recorded and exported.
    RecordAndSample,
}

/// The interface for sampling spans at creation.
pub trait ShouldSample: Send + Sync + fmt::Debug {
    /// Decide whether the span described by the arguments is sampled.
    fn should_sample(
        &self,
        parent_context: Option<&SpanContext>,
        trace_id: TraceId,
        name: &str,
    ) -> SamplingDecision;
}

/// The built-in samplers.
#[derive(Clone, Debug)]
pub enum Sampler {
    /// Always sample.
    AlwaysOn,
    /// Never sample.
    AlwaysOff,
    /// Sample the given fraction of traces, deterministically by trace id:
    /// the low 64 bits of the trace id are compared against
    /// `ratio * 2^64`.
    TraceIdRatioBased(f64),
    /// Delegate to the parent span's sampling decision.
    ParentBased(Box<ParentBased>),
}

impl Sampler {
    /// A ratio sampler, validated at construction.
    ///
    /// # Panics
    ///
    /// Panics if `ratio` is not within `[0, 1]`. An invalid ratio is a
    /// configuration error and surfaces here rather than at runtime.
    pub fn trace_id_ratio_based(ratio: f64) -> Sampler {
        assert!(
            (0.0..=1.0).contains(&ratio),
            "sampling ratio must be within [0, 1], got {ratio}"
        );
        Sampler::TraceIdRatioBased(ratio)
    }

    /// A parent-based sampler using `root` for root spans and the
    /// conventional defaults for the parent cases.
    pub fn parent_based(root: Sampler) -> Sampler {
        Sampler::ParentBased(Box::new(ParentBased::new(root)))
    }
}

impl ShouldSample for Sampler {
    fn should_sample(
        &self,
        parent_context: Option<&SpanContext>,
        trace_id: TraceId,
        name: &str,
    ) -> SamplingDecision {
        match self {
            Sampler::AlwaysOn => SamplingDecision::RecordAndSample,
            Sampler::AlwaysOff => SamplingDecision::Drop,
            Sampler::TraceIdRatioBased(ratio) => {
                if *ratio >= 1.0 {
                    SamplingDecision::RecordAndSample
                } else if *ratio <= 0.0 {
                    SamplingDecision::Drop
                } else {
                    let bound = (ratio * 2f64.powi(64)) as u64;
                    if trace_id.low_u64() < bound {
                        SamplingDecision::RecordAndSample
                    } else {
                        SamplingDecision::Drop
                    }
                }
            }
            Sampler::ParentBased(parent_based) => {
                parent_based.should_sample(parent_context, trace_id, name)
            }
        }
    }
}

/// Sampler delegating to the parent span's decision.
///
/// Root spans use `root`; spans with a parent use the delegate matching the
/// parent's remoteness and sampled flag. Defaults: sampled parents are
/// followed (`AlwaysOn`), unsampled parents are followed (`AlwaysOff`).
#[derive(Clone, Debug)]
pub struct ParentBased {
    root: Sampler,
    remote_parent_sampled: Sampler,
    remote_parent_not_sampled: Sampler,
    local_parent_sampled: Sampler,
    local_parent_not_sampled: Sampler,
}

impl ParentBased {
    /// Create a parent-based sampler with conventional defaults.
    pub fn new(root: Sampler) -> Self {
        ParentBased {
            root,
            remote_parent_sampled: Sampler::AlwaysOn,
            remote_parent_not_sampled: Sampler::AlwaysOff,
            local_parent_sampled: Sampler::AlwaysOn,
            local_parent_not_sampled: Sampler::AlwaysOff,
        }
    }

    /// Override the delegate for sampled remote parents.
    pub fn with_remote_parent_sampled(mut self, sampler: Sampler) -> Self {
        self.remote_parent_sampled = sampler;
        self
    }

    /// Override the delegate for unsampled remote parents.
    pub fn with_remote_parent_not_sampled(mut self, sampler: Sampler) -> Self {
        self.remote_parent_not_sampled = sampler;
        self
    }

    /// Override the delegate for sampled local parents.
    pub fn with_local_parent_sampled(mut self, sampler: Sampler) -> Self {
        self.local_parent_sampled = sampler;
        self
    }

    /// Override the delegate for unsampled local parents.
    pub fn with_local_parent_not_sampled(mut self, sampler: Sampler) -> Self {
        self.local_parent_not_sampled = sampler;
        self
    }
}

impl ShouldSample for ParentBased {
    fn should_sample(
        &self,
        parent_context: Option<&SpanContext>,
        trace_id: TraceId,
        name: &str,
    ) -> SamplingDecision {
        match parent_context.filter(|ctx| ctx.is_valid()) {
            None => self.root.should_sample(parent_context, trace_id, name),
            Some(parent) => {
                let delegate = match (parent.is_remote(), parent.is_sampled()) {
                    (true, true) => &self.remote_parent_sampled,
                    (true, false) => &self.remote_parent_not_sampled,
                    (false, true) => &self.local_parent_sampled,
                    (false, false) => &self.local_parent_not_sampled,
                };
                delegate.should_sample(parent_context, trace_id, name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::span_context::{SpanId, TraceFlags, TraceState};

    fn parent(remote: bool, sampled: bool) -> SpanContext {
        SpanContext::new(
            TraceId::from_u128(1),
            SpanId::from_u64(1),
            TraceFlags::default().with_sampled(sampled),
            remote,
            TraceState::default(),
        )
    }

    #[test]
    fn always_on_and_off() {
        let id = TraceId::from_u128(7);
        assert_eq!(
            Sampler::AlwaysOn.should_sample(None, id, "a"),
            SamplingDecision::RecordAndSample
        );
        assert_eq!(
            Sampler::AlwaysOff.should_sample(None, id, "a"),
            SamplingDecision::Drop
        );
    }

    #[test]
    fn ratio_sampler_is_deterministic_per_trace_id() {
        let sampler = Sampler::trace_id_ratio_based(0.5);
        let low = TraceId::from_u128(1); // low 64 bits far below the bound
        let high = TraceId::from_u128(u64::MAX as u128); // low 64 bits at the top
        assert_eq!(
            sampler.should_sample(None, low, "a"),
            SamplingDecision::RecordAndSample
        );
        assert_eq!(sampler.should_sample(None, high, "a"), SamplingDecision::Drop);
        // repeated calls agree
        assert_eq!(
            sampler.should_sample(None, low, "a"),
            sampler.should_sample(None, low, "a")
        );
    }

    #[test]
    fn ratio_bounds_are_inclusive() {
        let id = TraceId::from_u128(u128::MAX);
        assert_eq!(
            Sampler::trace_id_ratio_based(1.0).should_sample(None, id, "a"),
            SamplingDecision::RecordAndSample
        );
        assert_eq!(
            Sampler::trace_id_ratio_based(0.0).should_sample(None, id, "a"),
            SamplingDecision::Drop
        );
    }

    #[test]
    #[should_panic(expected = "sampling ratio")]
    fn invalid_ratio_fails_at_construction() {
        let _ = Sampler::trace_id_ratio_based(1.5);
    }

    #[test]
    fn parent_based_follows_parent_decision() {
        let sampler = Sampler::parent_based(Sampler::AlwaysOff);
        let id = TraceId::from_u128(9);

        // root: delegate to root sampler
        assert_eq!(sampler.should_sample(None, id, "a"), SamplingDecision::Drop);

        for remote in [true, false] {
            assert_eq!(
                sampler.should_sample(Some(&parent(remote, true)), id, "a"),
                SamplingDecision::RecordAndSample
            );
            assert_eq!(
                sampler.should_sample(Some(&parent(remote, false)), id, "a"),
                SamplingDecision::Drop
            );
        }
    }

    #[test]
    fn parent_based_treats_invalid_parent_as_root() {
        let sampler = Sampler::parent_based(Sampler::AlwaysOn);
        let invalid = SpanContext::empty_context();
        assert_eq!(
            sampler.should_sample(Some(&invalid), TraceId::from_u128(3), "a"),
            SamplingDecision::RecordAndSample
        );
    }
}
