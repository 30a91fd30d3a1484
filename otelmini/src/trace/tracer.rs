use std::borrow::Cow;
use std::fmt;
use std::sync::Weak;
use std::time::SystemTime;

use crate::trace::provider::TracerProviderInner;
use crate::trace::sampler::SamplingDecision;
use crate::trace::span::{ActiveSpan, Link, Span, SpanData, Status};
use crate::trace::span_context::{SpanContext, SpanId, SpanKind, TraceFlags, TraceId, TraceState};
use crate::{InstrumentationScope, KeyValue};

/// Creates [`Span`]s for one instrumentation scope.
///
/// Tracers hold a weak reference to their provider; spans created after the
/// provider is gone are non-recording.
#[derive(Clone)]
pub struct Tracer {
    scope: InstrumentationScope,
    provider: Weak<TracerProviderInner>,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("name", &self.scope.name())
            .finish()
    }
}

impl Tracer {
    pub(crate) fn new(scope: InstrumentationScope, provider: Weak<TracerProviderInner>) -> Self {
        Tracer { scope, provider }
    }

    /// The scope this tracer was created with.
    pub fn scope(&self) -> &InstrumentationScope {
        &self.scope
    }

    /// Start building a span with the given name.
    pub fn span_builder(&self, name: impl Into<Cow<'static, str>>) -> SpanBuilder {
        SpanBuilder::from_name(name)
    }

    /// Start a root span with default options.
    pub fn start(&self, name: impl Into<Cow<'static, str>>) -> Span {
        self.span_builder(name).start(self)
    }

    /// Run `f` inside a span that is guaranteed to end on every exit path,
    /// including panics.
    pub fn in_span<F, R>(&self, name: impl Into<Cow<'static, str>>, f: F) -> R
    where
        F: FnOnce(&mut Span) -> R,
    {
        struct EndOnDrop(Option<Span>);
        impl Drop for EndOnDrop {
            fn drop(&mut self) {
                if let Some(mut span) = self.0.take() {
                    span.end();
                }
            }
        }

        let mut guard = EndOnDrop(Some(self.start(name)));
        let result = f(guard.0.as_mut().expect("span just stored"));
        drop(guard);
        result
    }

    pub(crate) fn build_span(&self, builder: SpanBuilder) -> Span {
        let Some(provider) = self.provider.upgrade() else {
            return Span::new(SpanContext::empty_context(), None, self.clone());
        };
        let config = provider.config();

        let parent = builder.parent.filter(|ctx| ctx.is_valid());
        let trace_id = builder
            .trace_id
            .or_else(|| parent.as_ref().map(|ctx| ctx.trace_id()))
            .unwrap_or_else(|| config.id_generator.new_trace_id());
        let span_id = builder
            .span_id
            .unwrap_or_else(|| config.id_generator.new_span_id());

        let decision = config
            .sampler
            .should_sample(parent.as_ref(), trace_id, &builder.name);
        let sampled = decision == SamplingDecision::RecordAndSample;

        let trace_state = parent
            .as_ref()
            .map(|ctx| ctx.trace_state().clone())
            .unwrap_or(TraceState::NONE);
        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::default().with_sampled(sampled),
            false,
            trace_state,
        );

        if !sampled {
            // carries context, records nothing
            return Span::new(span_context, None, self.clone());
        }

        let active = ActiveSpan {
            parent_span_id: parent
                .as_ref()
                .map(|ctx| ctx.span_id())
                .unwrap_or(SpanId::INVALID),
            span_kind: builder.span_kind,
            name: builder.name,
            start_time: builder.start_time.unwrap_or_else(crate::time::now),
            attributes: builder.attributes,
            events: Vec::new(),
            links: builder.links,
            status: Status::Unset,
        };

        let span = Span::new(span_context, Some(active), self.clone());
        provider.on_span_start(&span);
        span
    }

    pub(crate) fn finish_span(
        &self,
        span_context: &SpanContext,
        active: ActiveSpan,
        end_time: SystemTime,
    ) {
        let Some(provider) = self.provider.upgrade() else {
            return;
        };
        let data = SpanData {
            span_context: span_context.clone(),
            parent_span_id: active.parent_span_id,
            span_kind: active.span_kind,
            name: active.name,
            start_time: active.start_time,
            end_time,
            attributes: active.attributes,
            events: active.events,
            links: active.links,
            status: active.status,
            resource: provider.config().resource.clone(),
            scope: self.scope.clone(),
        };
        provider.on_span_end(data);
    }
}

/// Options for a span under construction.
#[derive(Debug)]
pub struct SpanBuilder {
    pub(crate) name: Cow<'static, str>,
    pub(crate) span_kind: SpanKind,
    pub(crate) parent: Option<SpanContext>,
    pub(crate) attributes: Vec<KeyValue>,
    pub(crate) links: Vec<Link>,
    pub(crate) start_time: Option<SystemTime>,
    pub(crate) trace_id: Option<TraceId>,
    pub(crate) span_id: Option<SpanId>,
}

impl SpanBuilder {
    /// Create a builder for a span with the given name.
    pub fn from_name(name: impl Into<Cow<'static, str>>) -> Self {
        SpanBuilder {
            name: name.into(),
            span_kind: SpanKind::Internal,
            parent: None,
            attributes: Vec::new(),
            links: Vec::new(),
            start_time: None,
            trace_id: None,
            span_id: None,
        }
    }

    /// Set the span kind.
    pub fn with_kind(mut self, span_kind: SpanKind) -> Self {
        self.span_kind = span_kind;
        self
    }

    /// Set the parent span context. The new span joins the parent's trace.
    pub fn with_parent(mut self, parent: SpanContext) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set initial attributes.
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = KeyValue>) -> Self {
        self.attributes = attributes.into_iter().collect();
        self
    }

    /// Add links to other spans.
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }

    /// Override the start time.
    pub fn with_start_time(mut self, start_time: SystemTime) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Override the generated trace id. Intended for tests.
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Override the generated span id. Intended for tests.
    pub fn with_span_id(mut self, span_id: SpanId) -> Self {
        self.span_id = Some(span_id);
        self
    }

    /// Build the span through the given tracer.
    pub fn start(self, tracer: &Tracer) -> Span {
        tracer.build_span(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{InMemorySpanExporter, Sampler, SdkTracerProvider};

    #[test]
    fn sampled_out_span_still_carries_context() {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_sampler(Sampler::AlwaysOff)
            .with_simple_exporter(exporter.clone())
            .build();
        let tracer = provider.tracer("test");

        let mut span = tracer.start("dropped");
        assert!(!span.is_recording());
        assert!(span.span_context().is_valid());
        assert!(!span.span_context().is_sampled());
        span.end();
        assert!(exporter.finished_spans().is_empty());
    }

    #[test]
    fn child_joins_parent_trace() {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let tracer = provider.tracer("test");

        let parent = tracer.start("parent");
        let parent_ctx = parent.span_context().clone();
        let mut child = tracer
            .span_builder("child")
            .with_parent(parent_ctx.clone())
            .start(&tracer);
        child.end();
        drop(parent);

        let spans = exporter.finished_spans();
        let child_data = spans.iter().find(|s| s.name == "child").unwrap();
        assert_eq!(child_data.span_context.trace_id(), parent_ctx.trace_id());
        assert_eq!(child_data.parent_span_id, parent_ctx.span_id());
    }

    #[test]
    fn in_span_ends_span_on_panic() {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let tracer = provider.tracer("test");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tracer.in_span("exploding", |_span| panic!("boom"))
        }));
        assert!(result.is_err());
        assert_eq!(exporter.finished_spans().len(), 1);
    }

    #[test]
    fn spans_from_dropped_provider_are_non_recording() {
        let provider = SdkTracerProvider::builder().build();
        let tracer = provider.tracer("test");
        provider.shutdown().unwrap();
        drop(provider);

        let span = tracer.start("late");
        assert!(!span.is_recording());
    }
}
