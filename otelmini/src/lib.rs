//! A minimal OpenTelemetry SDK.
//!
//! `otelmini` implements the parts of an OpenTelemetry SDK that carry the
//! real engineering weight: the batching pipeline between instrumented code
//! and exporters, the metric aggregation engine, and the provider types that
//! bind resources and processors together.
//!
//! Telemetry flows from application code into a signal-specific processor
//! (`on_end` for spans and logs, aggregator cells for metrics), is buffered
//! and batched on a dedicated background thread, and handed to an exporter.
//! Exporters live in the companion `otelmini-otlp` crate; this crate defines
//! the exporter traits and ships in-memory implementations for testing.
//!
//! # Getting started with traces
//!
//! ```
//! use otelmini::trace::{InMemorySpanExporter, SdkTracerProvider};
//!
//! let exporter = InMemorySpanExporter::default();
//! let provider = SdkTracerProvider::builder()
//!     .with_simple_exporter(exporter.clone())
//!     .build();
//!
//! let tracer = provider.tracer("readme-example");
//! tracer.in_span("do-work", |_span| {
//!     // application logic
//! });
//!
//! provider.shutdown().unwrap();
//! assert_eq!(exporter.finished_spans().len(), 1);
//! ```
#![warn(missing_docs, unreachable_pub, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub(crate) mod internal_logging;

mod common;
pub use common::{Array, Key, KeyValue, StringValue, Value};

pub mod error;

mod instrumentation;
pub use instrumentation::InstrumentationScope;

pub mod resource;
pub use resource::Resource;

pub mod retry;

pub mod processor;

#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub mod trace;

#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub mod propagation;

#[cfg(feature = "logs")]
#[cfg_attr(docsrs, doc(cfg(feature = "logs")))]
pub mod logs;

#[cfg(feature = "metrics")]
#[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
pub mod metrics;

pub mod global;

pub(crate) mod time {
    use std::time::SystemTime;

    pub(crate) fn now() -> SystemTime {
        SystemTime::now()
    }
}
