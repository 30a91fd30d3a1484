use std::collections::HashMap;

use crate::trace::SpanContext;

/// The `traceparent` header name.
pub const TRACEPARENT_HEADER: &str = "traceparent";
/// The `tracestate` header name.
pub const TRACESTATE_HEADER: &str = "tracestate";

const SUPPORTED_VERSION: u8 = 0;

/// Format a span context as a W3C `traceparent` header value:
/// `00-<trace_id:032x>-<span_id:016x>-<flags:02x>`.
pub fn format_traceparent(span_context: &SpanContext) -> String {
    format!(
        "{:02x}-{:032x}-{:016x}-{:02x}",
        SUPPORTED_VERSION,
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags()
    )
}

/// Insert `traceparent` (and `tracestate`, when non-empty) into a header map.
pub fn inject_traceparent(span_context: &SpanContext, headers: &mut HashMap<String, String>) {
    if !span_context.is_valid() {
        return;
    }
    headers.insert(
        TRACEPARENT_HEADER.to_string(),
        format_traceparent(span_context),
    );
    let trace_state = span_context.trace_state().header();
    if !trace_state.is_empty() {
        headers.insert(TRACESTATE_HEADER.to_string(), trace_state.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{SpanId, TraceFlags, TraceId, TraceState};

    #[test]
    fn traceparent_format_is_exact() {
        let ctx = SpanContext::new(
            TraceId::from_u128(0x0af7651916cd43dd8448eb211c80319c),
            SpanId::from_u64(0x00f067aa0ba902b7),
            TraceFlags::SAMPLED,
            false,
            TraceState::default(),
        );
        assert_eq!(
            format_traceparent(&ctx),
            "00-0af7651916cd43dd8448eb211c80319c-00f067aa0ba902b7-01"
        );
    }

    #[test]
    fn small_ids_are_zero_padded() {
        let ctx = SpanContext::new(
            TraceId::from_u128(1),
            SpanId::from_u64(2),
            TraceFlags::default(),
            false,
            TraceState::default(),
        );
        assert_eq!(
            format_traceparent(&ctx),
            "00-00000000000000000000000000000001-0000000000000002-00"
        );
    }

    #[test]
    fn invalid_context_is_not_injected() {
        let mut headers = HashMap::new();
        inject_traceparent(&SpanContext::empty_context(), &mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn tracestate_is_injected_when_present() {
        let ctx = SpanContext::new(
            TraceId::from_u128(1),
            SpanId::from_u64(2),
            TraceFlags::SAMPLED,
            true,
            TraceState::from_header("vendor=opaque"),
        );
        let mut headers = HashMap::new();
        inject_traceparent(&ctx, &mut headers);
        assert_eq!(headers.get(TRACESTATE_HEADER).map(String::as_str), Some("vendor=opaque"));
    }
}
