//! # Tracer Provider SDK
//!
//! New [`Tracer`] instances are always created through a
//! [`SdkTracerProvider`], which owns the resource, the sampler, the id
//! generator and the registered span processors. Shutting the provider down
//! fans out to every processor; dropping the last provider handle shuts it
//! down implicitly so buffered spans are not silently lost at process exit.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{OTelSdkError, OTelSdkResult};
use crate::trace::id_generator::{IdGenerator, RandomIdGenerator};
use crate::trace::sampler::{Sampler, ShouldSample};
use crate::trace::span::{Span, SpanData};
use crate::trace::span_processor::{BatchSpanProcessor, SimpleSpanProcessor, SpanProcessor};
use crate::trace::tracer::Tracer;
use crate::trace::SpanExporter;
use crate::{InstrumentationScope, Resource};

/// Default tracer name if an empty string is provided.
const DEFAULT_COMPONENT_NAME: &str = "otelmini/sdk/tracer";

pub(crate) struct TraceConfig {
    pub(crate) sampler: Box<dyn ShouldSample>,
    pub(crate) id_generator: Box<dyn IdGenerator>,
    pub(crate) resource: Resource,
}

pub(crate) struct TracerProviderInner {
    processors: Vec<Box<dyn SpanProcessor>>,
    config: TraceConfig,
    stopped: AtomicBool,
}

impl TracerProviderInner {
    pub(crate) fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub(crate) fn on_span_start(&self, span: &Span) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        for processor in &self.processors {
            processor.on_start(span);
        }
    }

    pub(crate) fn on_span_end(&self, data: SpanData) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        // processors run in registration order; the last avoids a clone
        let mut iter = self.processors.iter().peekable();
        let mut data = Some(data);
        while let Some(processor) = iter.next() {
            if iter.peek().is_some() {
                processor.on_end(data.clone().expect("span data present"));
            } else {
                processor.on_end(data.take().expect("span data present"));
            }
        }
    }

    fn shutdown(&self) -> OTelSdkResult {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let mut result = Ok(());
        for processor in &self.processors {
            if let Err(err) = processor.shutdown() {
                result = Err(err);
            }
        }
        result
    }
}

impl Drop for TracerProviderInner {
    fn drop(&mut self) {
        if !self.stopped.load(Ordering::SeqCst) {
            let _ = self.shutdown();
        }
    }
}

/// Creator and registry of [`Tracer`] instances.
///
/// Cheap to clone; all clones share the same processors and configuration.
#[derive(Clone)]
pub struct SdkTracerProvider {
    inner: Arc<TracerProviderInner>,
}

impl fmt::Debug for SdkTracerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkTracerProvider")
            .field("processors", &self.inner.processors.len())
            .finish()
    }
}

impl Default for SdkTracerProvider {
    fn default() -> Self {
        SdkTracerProvider::builder().build()
    }
}

impl SdkTracerProvider {
    /// Create a new builder.
    pub fn builder() -> TracerProviderBuilder {
        TracerProviderBuilder::default()
    }

    /// The resource attached to spans from this provider.
    pub fn resource(&self) -> &Resource {
        &self.inner.config.resource
    }

    /// Create a tracer for the named instrumentation scope.
    pub fn tracer(&self, name: impl Into<Cow<'static, str>>) -> Tracer {
        let name = name.into();
        let component_name = if name.is_empty() {
            Cow::Borrowed(DEFAULT_COMPONENT_NAME)
        } else {
            name
        };
        self.tracer_with_scope(InstrumentationScope::builder(component_name).build())
    }

    /// Create a tracer with a fully specified scope.
    pub fn tracer_with_scope(&self, scope: InstrumentationScope) -> Tracer {
        Tracer::new(scope, Arc::downgrade(&self.inner))
    }

    /// Flush all span processors.
    pub fn force_flush(&self) -> OTelSdkResult {
        let mut result = Ok(());
        for processor in &self.inner.processors {
            if let Err(err) = processor.force_flush() {
                result = Err(err);
            }
        }
        result
    }

    /// Shut down every processor, draining buffered spans exactly once.
    pub fn shutdown(&self) -> OTelSdkResult {
        self.inner.shutdown()
    }
}

/// Builder for [`SdkTracerProvider`].
#[derive(Default)]
pub struct TracerProviderBuilder {
    processors: Vec<Box<dyn SpanProcessor>>,
    sampler: Option<Box<dyn ShouldSample>>,
    id_generator: Option<Box<dyn IdGenerator>>,
    resource: Option<Resource>,
}

impl fmt::Debug for TracerProviderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracerProviderBuilder")
            .field("processors", &self.processors.len())
            .finish()
    }
}

impl TracerProviderBuilder {
    /// Export finished spans one-by-one through a [`SimpleSpanProcessor`].
    /// Useful for tests and short-lived tools; production setups should
    /// prefer [`with_batch_exporter`](Self::with_batch_exporter).
    pub fn with_simple_exporter<E: SpanExporter>(self, exporter: E) -> Self {
        self.with_span_processor(SimpleSpanProcessor::new(exporter))
    }

    /// Batch finished spans and export through a dedicated worker thread.
    pub fn with_batch_exporter<E: SpanExporter>(self, exporter: E) -> Self {
        self.with_span_processor(BatchSpanProcessor::builder(exporter).build())
    }

    /// Register a custom span processor. Processors run in registration
    /// order.
    pub fn with_span_processor<P: SpanProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Set the sampler consulted for every new span. Defaults to
    /// parent-based always-on.
    pub fn with_sampler<S: ShouldSample + 'static>(mut self, sampler: S) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Set the id generator.
    pub fn with_id_generator<G: IdGenerator + 'static>(mut self, id_generator: G) -> Self {
        self.id_generator = Some(Box::new(id_generator));
        self
    }

    /// Set the resource describing this entity.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Build the provider.
    pub fn build(self) -> SdkTracerProvider {
        let config = TraceConfig {
            sampler: self
                .sampler
                .unwrap_or_else(|| Box::new(Sampler::parent_based(Sampler::AlwaysOn))),
            id_generator: self
                .id_generator
                .unwrap_or_else(|| Box::new(RandomIdGenerator::default())),
            resource: self.resource.unwrap_or_default(),
        };
        SdkTracerProvider {
            inner: Arc::new(TracerProviderInner {
                processors: self.processors,
                config,
                stopped: AtomicBool::new(false),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::InMemorySpanExporter;
    use crate::KeyValue;

    #[test]
    fn shutdown_drains_one_pending_span() {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_batch_exporter(exporter.clone())
            .build();
        let tracer = provider.tracer("test");

        tracer.start("only-span").end();
        provider.shutdown().unwrap();

        let batches = exporter.exported_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].name, "only-span");
        assert!(exporter.is_shutdown_called());
    }

    #[test]
    fn shutdown_twice_reports_already_shutdown() {
        let provider = SdkTracerProvider::builder().build();
        assert!(provider.shutdown().is_ok());
        assert_eq!(provider.shutdown(), Err(OTelSdkError::AlreadyShutdown));
    }

    #[test]
    fn spans_carry_provider_resource() {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_resource(
                Resource::builder_empty()
                    .with_attributes([KeyValue::new("service.name", "test-svc")])
                    .build(),
            )
            .with_simple_exporter(exporter.clone())
            .build();

        provider.tracer("test").start("op").end();

        let spans = exporter.finished_spans();
        assert_eq!(
            spans[0].resource.get(&crate::Key::new("service.name")),
            Some(crate::Value::from("test-svc"))
        );
    }

    #[test]
    fn processors_run_in_registration_order() {
        use std::sync::{Arc, Mutex};

        #[derive(Debug)]
        struct OrderProbe(&'static str, Arc<Mutex<Vec<&'static str>>>);
        impl SpanProcessor for OrderProbe {
            fn on_start(&self, _span: &Span) {}
            fn on_end(&self, _span: SpanData) {
                self.1.lock().unwrap().push(self.0);
            }
            fn force_flush(&self) -> OTelSdkResult {
                Ok(())
            }
            fn shutdown(&self) -> OTelSdkResult {
                Ok(())
            }
        }

        let order = Arc::new(Mutex::new(Vec::new()));
        let provider = SdkTracerProvider::builder()
            .with_span_processor(OrderProbe("first", order.clone()))
            .with_span_processor(OrderProbe("second", order.clone()))
            .build();

        provider.tracer("test").start("op").end();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }
}
