//! Conversions from `otelmini` SDK types to the OTLP wire types.

pub mod common;

#[cfg(feature = "logs")]
pub mod logs;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "trace")]
pub mod trace;
