//! The logs signal: log records, loggers and log processors.
//!
//! A [`SdkLoggerProvider`] owns a [`Resource`](crate::Resource) and a list of
//! log processors. [`Logger`]s emit [`SdkLogRecord`]s, which are frozen at
//! emission and fanned out to the processors in registration order.

mod export;
mod log_processor;
mod logger;
mod logger_provider;
mod record;

pub use export::{InMemoryLogExporter, LogExporter};
pub use log_processor::{BatchLogProcessor, LogProcessor, SimpleLogProcessor};
pub use logger::Logger;
pub use logger_provider::{LoggerProviderBuilder, SdkLoggerProvider};
pub use record::{AnyValue, SdkLogRecord, Severity};
