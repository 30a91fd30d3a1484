//! Propagation helpers for carrying span context across process boundaries.
//!
//! Only the injection (formatting) side of W3C TraceContext is provided;
//! extraction is left to the caller.

mod trace_context;

pub use trace_context::{format_traceparent, inject_traceparent, TRACEPARENT_HEADER, TRACESTATE_HEADER};
