use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{OTelSdkError, OTelSdkResult};
use crate::logs::export::LogExporter;
use crate::logs::log_processor::{BatchLogProcessor, LogProcessor, SimpleLogProcessor};
use crate::logs::logger::Logger;
use crate::logs::record::SdkLogRecord;
use crate::{InstrumentationScope, Resource};

pub(crate) struct LoggerProviderInner {
    processors: Vec<Box<dyn LogProcessor>>,
    resource: Resource,
    stopped: AtomicBool,
}

impl LoggerProviderInner {
    pub(crate) fn resource(&self) -> &Resource {
        &self.resource
    }

    pub(crate) fn emit(&self, record: SdkLogRecord) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        let mut iter = self.processors.iter().peekable();
        let mut record = Some(record);
        while let Some(processor) = iter.next() {
            if iter.peek().is_some() {
                processor.emit(record.clone().expect("record present"));
            } else {
                processor.emit(record.take().expect("record present"));
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

impl Drop for LoggerProviderInner {
    fn drop(&mut self) {
        if !self.stopped.load(Ordering::SeqCst) {
            let _ = self.shutdown();
        }
    }
}

/// Creator and registry of [`Logger`] instances.
#[derive(Clone)]
pub struct SdkLoggerProvider {
    inner: Arc<LoggerProviderInner>,
}

impl fmt::Debug for SdkLoggerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkLoggerProvider")
            .field("processors", &self.inner.processors.len())
            .finish()
    }
}

impl Default for SdkLoggerProvider {
    fn default() -> Self {
        SdkLoggerProvider::builder().build()
    }
}

impl SdkLoggerProvider {
    /// Create a new builder.
    pub fn builder() -> LoggerProviderBuilder {
        LoggerProviderBuilder::default()
    }

    /// The resource attached to records from this provider.
    pub fn resource(&self) -> &Resource {
        &self.inner.resource
    }

    /// Create a logger for the named instrumentation scope.
    pub fn logger(&self, name: impl Into<Cow<'static, str>>) -> Logger {
        self.logger_with_scope(InstrumentationScope::builder(name).build())
    }

    /// Create a logger with a fully specified scope.
    pub fn logger_with_scope(&self, scope: InstrumentationScope) -> Logger {
        Logger::new(scope, Arc::downgrade(&self.inner))
    }

    /// Flush all log processors.
    pub fn force_flush(&self) -> OTelSdkResult {
        let mut result = Ok(());
        for processor in &self.inner.processors {
            if let Err(err) = processor.force_flush() {
                result = Err(err);
            }
        }
        result
    }

    /// Shut down every processor, draining buffered records exactly once.
    pub fn shutdown(&self) -> OTelSdkResult {
        self.inner.shutdown()
    }
}

/// Builder for [`SdkLoggerProvider`].
#[derive(Default)]
pub struct LoggerProviderBuilder {
    processors: Vec<Box<dyn LogProcessor>>,
    resource: Option<Resource>,
}

impl fmt::Debug for LoggerProviderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerProviderBuilder")
            .field("processors", &self.processors.len())
            .finish()
    }
}

impl LoggerProviderBuilder {
    /// Export emitted records one-by-one through a [`SimpleLogProcessor`].
    pub fn with_simple_exporter<E: LogExporter>(self, exporter: E) -> Self {
        self.with_log_processor(SimpleLogProcessor::new(exporter))
    }

    /// Batch emitted records and export through a dedicated worker thread.
    pub fn with_batch_exporter<E: LogExporter>(self, exporter: E) -> Self {
        self.with_log_processor(BatchLogProcessor::builder(exporter).build())
    }

    /// Register a custom log processor. Processors run in registration
    /// order.
    pub fn with_log_processor<P: LogProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Set the resource describing this entity.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Build the provider.
    pub fn build(self) -> SdkLoggerProvider {
        SdkLoggerProvider {
            inner: Arc::new(LoggerProviderInner {
                processors: self.processors,
                resource: self.resource.unwrap_or_default(),
                stopped: AtomicBool::new(false),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{InMemoryLogExporter, Severity};

    #[test]
    fn emit_stamps_observed_time_resource_and_scope() {
        let exporter = InMemoryLogExporter::default();
        let provider = SdkLoggerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .with_resource(Resource::builder_empty().with_service_name("log-svc").build())
            .build();
        let logger = provider.logger("test-logger");

        let mut record = logger.create_log_record();
        record.set_severity_number(Severity::Warn);
        record.set_body("disk nearly full");
        logger.emit(record);

        let logs = exporter.emitted_logs();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].observed_timestamp.is_some());
        assert_eq!(logs[0].scope().unwrap().name(), "test-logger");
        assert_eq!(
            logs[0].resource().unwrap().get(&crate::Key::new("service.name")),
            Some(crate::Value::from("log-svc"))
        );
    }

    #[test]
    fn emit_after_shutdown_is_dropped() {
        let exporter = InMemoryLogExporter::default();
        let provider = SdkLoggerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let logger = provider.logger("test");
        provider.shutdown().unwrap();

        let mut record = logger.create_log_record();
        record.set_body("too late");
        logger.emit(record);
        assert!(exporter.emitted_logs().is_empty());
    }

    #[test]
    fn batch_processor_drains_on_shutdown() {
        let exporter = InMemoryLogExporter::default();
        let provider = SdkLoggerProvider::builder()
            .with_batch_exporter(exporter.clone())
            .build();
        let logger = provider.logger("test");

        for i in 0..3 {
            let mut record = logger.create_log_record();
            record.set_body(format!("line {i}"));
            logger.emit(record);
        }
        provider.shutdown().unwrap();

        assert_eq!(exporter.emitted_logs().len(), 3);
        assert!(exporter.is_shutdown_called());
    }
}
