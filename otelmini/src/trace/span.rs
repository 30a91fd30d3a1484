//! Spans represent a single named, timed operation within a trace.
//!
//! A span is mutable until [`Span::end`]. Ending a span freezes it into a
//! [`SpanData`] snapshot which is handed to every span processor exactly
//! once; the producer keeps only the context afterwards.

use std::borrow::Cow;
use std::time::SystemTime;

use crate::trace::span_context::{SpanContext, SpanId, SpanKind};
use crate::trace::tracer::Tracer;
use crate::{InstrumentationScope, KeyValue, Resource};

/// The status of a finished span.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Status {
    /// The default status.
    #[default]
    Unset,
    /// The operation contains an error.
    Error {
        /// A developer-facing description of the error.
        description: Cow<'static, str>,
    },
    /// The operation has been validated to have completed successfully.
    Ok,
}

impl Status {
    /// Create an error status with the given description.
    pub fn error(description: impl Into<Cow<'static, str>>) -> Self {
        Status::Error {
            description: description.into(),
        }
    }
}

/// A timed annotation on a span.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// The name of the event.
    pub name: Cow<'static, str>,
    /// The time the event occurred.
    pub timestamp: SystemTime,
    /// Attributes describing the event.
    pub attributes: Vec<KeyValue>,
}

impl Event {
    /// Create a new event.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        timestamp: SystemTime,
        attributes: Vec<KeyValue>,
    ) -> Self {
        Event {
            name: name.into(),
            timestamp,
            attributes,
        }
    }
}

/// A causal pointer from this span to a span in the same or another trace.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    /// The context of the linked span.
    pub span_context: SpanContext,
    /// Attributes describing the link.
    pub attributes: Vec<KeyValue>,
}

impl Link {
    /// Create a new link.
    pub fn new(span_context: SpanContext, attributes: Vec<KeyValue>) -> Self {
        Link {
            span_context,
            attributes,
        }
    }
}

/// The immutable snapshot of a finished span handed to processors and
/// exporters.
#[derive(Clone, Debug)]
pub struct SpanData {
    /// The span's identity.
    pub span_context: SpanContext,
    /// The parent's span id, [`SpanId::INVALID`] for root spans.
    pub parent_span_id: SpanId,
    /// The span kind.
    pub span_kind: SpanKind,
    /// The operation name.
    pub name: Cow<'static, str>,
    /// When the operation started.
    pub start_time: SystemTime,
    /// When the operation ended.
    pub end_time: SystemTime,
    /// Attributes in insertion order.
    pub attributes: Vec<KeyValue>,
    /// Events in insertion order.
    pub events: Vec<Event>,
    /// Links recorded on the span.
    pub links: Vec<Link>,
    /// The span status.
    pub status: Status,
    /// The entity that produced the span.
    pub resource: Resource,
    /// The library that produced the span.
    pub scope: InstrumentationScope,
}

// The recording state of a live span. `None` for non-recording spans and
// for spans that have ended.
#[derive(Debug)]
pub(crate) struct ActiveSpan {
    pub(crate) parent_span_id: SpanId,
    pub(crate) span_kind: SpanKind,
    pub(crate) name: Cow<'static, str>,
    pub(crate) start_time: SystemTime,
    pub(crate) attributes: Vec<KeyValue>,
    pub(crate) events: Vec<Event>,
    pub(crate) links: Vec<Link>,
    pub(crate) status: Status,
}

/// A single operation within a trace.
///
/// Sampled-out spans still carry their [`SpanContext`] but record nothing
/// and never reach a processor.
#[derive(Debug)]
pub struct Span {
    span_context: SpanContext,
    data: Option<ActiveSpan>,
    tracer: Tracer,
}

impl Span {
    pub(crate) fn new(span_context: SpanContext, data: Option<ActiveSpan>, tracer: Tracer) -> Self {
        Span {
            span_context,
            data,
            tracer,
        }
    }

    fn with_data<T, F>(&mut self, f: F) -> Option<T>
    where
        F: FnOnce(&mut ActiveSpan) -> T,
    {
        self.data.as_mut().map(f)
    }

    /// The context of this span.
    pub fn span_context(&self) -> &SpanContext {
        &self.span_context
    }

    /// True while the span records information: not ended and status unset.
    pub fn is_recording(&self) -> bool {
        self.data
            .as_ref()
            .map(|data| data.status == Status::Unset)
            .unwrap_or(false)
    }

    /// Set a single attribute. Insertion order is preserved.
    pub fn set_attribute(&mut self, attribute: KeyValue) {
        self.with_data(|data| data.attributes.push(attribute));
    }

    /// Set multiple attributes.
    pub fn set_attributes(&mut self, attributes: impl IntoIterator<Item = KeyValue>) {
        self.with_data(|data| data.attributes.extend(attributes));
    }

    /// Record an event at the current time.
    pub fn add_event(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        attributes: Vec<KeyValue>,
    ) {
        self.add_event_with_timestamp(name, crate::time::now(), attributes)
    }

    /// Record an event at a specific time.
    pub fn add_event_with_timestamp(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        timestamp: SystemTime,
        attributes: Vec<KeyValue>,
    ) {
        let event = Event::new(name, timestamp, attributes);
        self.with_data(|data| data.events.push(event));
    }

    /// Record an error as an `exception` event.
    pub fn record_error(&mut self, err: &dyn std::error::Error) {
        let attributes = vec![KeyValue::new("exception.message", err.to_string())];
        self.add_event("exception", attributes);
    }

    /// Add a link to another span.
    pub fn add_link(&mut self, span_context: SpanContext, attributes: Vec<KeyValue>) {
        let link = Link::new(span_context, attributes);
        self.with_data(|data| data.links.push(link));
    }

    /// Change the span name.
    pub fn update_name(&mut self, new_name: impl Into<Cow<'static, str>>) {
        let name = new_name.into();
        self.with_data(|data| data.name = name);
    }

    /// Set the span status.
    pub fn set_status(&mut self, status: Status) {
        self.with_data(|data| data.status = status);
    }

    /// End the span at the current time.
    ///
    /// The first call freezes the span and fans it out to the provider's
    /// processors; later calls are no-ops.
    pub fn end(&mut self) {
        self.end_with_timestamp(crate::time::now());
    }

    /// End the span at a specific time.
    pub fn end_with_timestamp(&mut self, timestamp: SystemTime) {
        let Some(active) = self.data.take() else {
            return;
        };
        self.tracer.finish_span(&self.span_context, active, timestamp);
    }
}

impl Drop for Span {
    // Ending on drop guarantees `end()` runs on every exit path.
    fn drop(&mut self) {
        if self.data.is_some() {
            self.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{InMemorySpanExporter, SdkTracerProvider};

    fn test_provider() -> (SdkTracerProvider, InMemorySpanExporter) {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        (provider, exporter)
    }

    #[test]
    fn end_fires_on_end_exactly_once() {
        let (provider, exporter) = test_provider();
        let tracer = provider.tracer("test");
        let mut span = tracer.start("op");
        span.end();
        span.end();
        drop(span);
        assert_eq!(exporter.finished_spans().len(), 1);
    }

    #[test]
    fn recording_stops_when_status_is_set() {
        let (provider, _exporter) = test_provider();
        let tracer = provider.tracer("test");
        let mut span = tracer.start("op");
        assert!(span.is_recording());
        span.set_status(Status::Ok);
        assert!(!span.is_recording());
    }

    #[test]
    fn dropped_span_is_ended() {
        let (provider, exporter) = test_provider();
        let tracer = provider.tracer("test");
        {
            let mut span = tracer.start("op");
            span.set_attribute(KeyValue::new("k", "v"));
        }
        let finished = exporter.finished_spans();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].attributes, vec![KeyValue::new("k", "v")]);
    }

    #[test]
    fn attributes_preserve_insertion_order() {
        let (provider, exporter) = test_provider();
        let tracer = provider.tracer("test");
        let mut span = tracer.start("op");
        span.set_attribute(KeyValue::new("b", 1));
        span.set_attribute(KeyValue::new("a", 2));
        span.end();

        let finished = exporter.finished_spans();
        let keys: Vec<&str> = finished[0]
            .attributes
            .iter()
            .map(|kv| kv.key.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn events_carry_timestamps_and_attributes() {
        let (provider, exporter) = test_provider();
        let tracer = provider.tracer("test");
        let mut span = tracer.start("op");
        span.add_event("cache-miss", vec![KeyValue::new("key", "user:1")]);
        span.end();

        let finished = exporter.finished_spans();
        assert_eq!(finished[0].events.len(), 1);
        assert_eq!(finished[0].events[0].name, "cache-miss");
    }
}
