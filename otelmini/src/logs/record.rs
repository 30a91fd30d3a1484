use std::borrow::Cow;
use std::time::SystemTime;

use crate::{InstrumentationScope, Key, Resource};

#[cfg(feature = "trace")]
use crate::trace::SpanContext;

/// The body and attribute value type of log records, the full OTLP
/// `AnyValue` sum type.
pub use crate::common::Value as AnyValue;

/// Numerical log severities, aligned with the OTLP severity numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum Severity {
    /// TRACE
    Trace = 1,
    /// DEBUG
    Debug = 5,
    /// INFO
    Info = 9,
    /// WARN
    Warn = 13,
    /// ERROR
    Error = 17,
    /// FATAL
    Fatal = 21,
}

impl Severity {
    /// The conventional display name of this severity.
    pub const fn name(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

/// A log record.
///
/// Mutable while being assembled; frozen when handed to
/// [`Logger::emit`](crate::logs::Logger::emit), which stamps the observed
/// timestamp, the resource and the scope before fanning out to processors.
#[derive(Clone, Debug, Default)]
pub struct SdkLogRecord {
    /// Time the event occurred, if known.
    pub timestamp: Option<SystemTime>,
    /// Time the event was observed by the SDK. Stamped at emission when
    /// unset.
    pub observed_timestamp: Option<SystemTime>,
    /// The sampled span this record occurred inside, if any.
    #[cfg(feature = "trace")]
    pub trace_context: Option<SpanContext>,
    /// Severity as text.
    pub severity_text: Option<Cow<'static, str>>,
    /// Severity as a number.
    pub severity_number: Option<Severity>,
    /// The record body.
    pub body: Option<AnyValue>,
    /// Attributes in insertion order.
    pub attributes: Vec<(Key, AnyValue)>,
    pub(crate) resource: Option<Resource>,
    pub(crate) scope: Option<InstrumentationScope>,
}

impl SdkLogRecord {
    pub(crate) fn new() -> Self {
        SdkLogRecord::default()
    }

    /// Set the event timestamp.
    pub fn set_timestamp(&mut self, timestamp: SystemTime) {
        self.timestamp = Some(timestamp);
    }

    /// Set the observed timestamp.
    pub fn set_observed_timestamp(&mut self, timestamp: SystemTime) {
        self.observed_timestamp = Some(timestamp);
    }

    /// Correlate this record with a span.
    #[cfg(feature = "trace")]
    pub fn set_trace_context(&mut self, span_context: SpanContext) {
        self.trace_context = Some(span_context);
    }

    /// Set the severity text.
    pub fn set_severity_text(&mut self, text: impl Into<Cow<'static, str>>) {
        self.severity_text = Some(text.into());
    }

    /// Set the severity number.
    pub fn set_severity_number(&mut self, severity: Severity) {
        self.severity_number = Some(severity);
    }

    /// Set the body.
    pub fn set_body(&mut self, body: impl Into<AnyValue>) {
        self.body = Some(body.into());
    }

    /// Add an attribute. Insertion order is preserved.
    pub fn add_attribute(&mut self, key: impl Into<Key>, value: impl Into<AnyValue>) {
        self.attributes.push((key.into(), value.into()));
    }

    /// The resource stamped at emission.
    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    /// The scope stamped at emission.
    pub fn scope(&self) -> Option<&InstrumentationScope> {
        self.scope.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_numbers_match_otlp() {
        assert_eq!(Severity::Trace as i32, 1);
        assert_eq!(Severity::Debug as i32, 5);
        assert_eq!(Severity::Info as i32, 9);
        assert_eq!(Severity::Warn as i32, 13);
        assert_eq!(Severity::Error as i32, 17);
        assert_eq!(Severity::Fatal as i32, 21);
    }

    #[test]
    fn record_assembly() {
        let mut record = SdkLogRecord::new();
        record.set_severity_number(Severity::Info);
        record.set_severity_text("INFO");
        record.set_body("hello");
        record.add_attribute("k", 1);
        assert_eq!(record.body, Some(AnyValue::from("hello")));
        assert_eq!(record.attributes.len(), 1);
    }
}
