//! The tracing signal: spans, tracers, samplers and span processors.
//!
//! A [`SdkTracerProvider`] binds a [`Resource`](crate::Resource), a sampler
//! and a list of span processors. [`Tracer`]s created from the provider build
//! [`Span`]s; ending a span snapshots it into a [`SpanData`] and fans it out
//! to the processors, which batch and export.

mod export;
mod id_generator;
mod provider;
mod sampler;
mod span;
mod span_context;
mod span_processor;
mod tracer;

pub use export::{InMemorySpanExporter, SpanExporter};
pub use id_generator::{IdGenerator, RandomIdGenerator};
pub use provider::{SdkTracerProvider, TracerProviderBuilder};
pub use sampler::{ParentBased, Sampler, SamplingDecision, ShouldSample};
pub use span::{Event, Link, Span, SpanData, Status};
pub use span_context::{SpanContext, SpanId, SpanKind, TraceFlags, TraceId, TraceState};
pub use span_processor::{BatchSpanProcessor, SimpleSpanProcessor, SpanProcessor};
pub use tracer::{SpanBuilder, Tracer};
