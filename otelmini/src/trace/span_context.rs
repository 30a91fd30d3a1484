use std::fmt;

/// A 16-byte trace identifier, shared by every span in a trace.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// The invalid trace id (all zeroes).
    pub const INVALID: TraceId = TraceId(0);

    /// Construct from a u128.
    pub const fn from_u128(value: u128) -> Self {
        TraceId(value)
    }

    /// Construct from 16 big-endian bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        TraceId(u128::from_be_bytes(bytes))
    }

    /// The id as 16 big-endian bytes.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// The id as a u128.
    pub const fn to_u128(self) -> u128 {
        self.0
    }

    /// The low 64 bits, used by ratio-based sampling.
    pub const fn low_u64(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::LowerHex for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// An 8-byte span identifier, unique within a trace.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// The invalid span id (all zeroes).
    pub const INVALID: SpanId = SpanId(0);

    /// Construct from a u64.
    pub const fn from_u64(value: u64) -> Self {
        SpanId(value)
    }

    /// Construct from 8 big-endian bytes.
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        SpanId(u64::from_be_bytes(bytes))
    }

    /// The id as 8 big-endian bytes.
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// The id as a u64.
    pub const fn to_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::LowerHex for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Flags describing a span's trace, currently only the sampled bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceFlags(u8);

impl TraceFlags {
    /// Trace flags with the sampled bit set.
    pub const SAMPLED: TraceFlags = TraceFlags(0x01);

    /// Construct from the raw byte.
    pub const fn new(flags: u8) -> Self {
        TraceFlags(flags)
    }

    /// Whether the sampled bit is set.
    pub const fn is_sampled(&self) -> bool {
        self.0 & TraceFlags::SAMPLED.0 == TraceFlags::SAMPLED.0
    }

    /// This set of flags with the sampled bit set.
    pub const fn with_sampled(&self, sampled: bool) -> Self {
        if sampled {
            TraceFlags(self.0 | TraceFlags::SAMPLED.0)
        } else {
            TraceFlags(self.0 & !TraceFlags::SAMPLED.0)
        }
    }

    /// The raw byte.
    pub const fn to_u8(self) -> u8 {
        self.0
    }
}

impl fmt::LowerHex for TraceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// The W3C `tracestate` value carried alongside a span context.
///
/// Stored verbatim; this SDK forwards trace state but does not interpret it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceState(Option<String>);

impl TraceState {
    /// The empty trace state.
    pub const NONE: TraceState = TraceState(None);

    /// Wrap a raw header value.
    pub fn from_header(header: impl Into<String>) -> Self {
        let header = header.into();
        if header.is_empty() {
            TraceState(None)
        } else {
            TraceState(Some(header))
        }
    }

    /// Serialize to the `tracestate` header value.
    pub fn header(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }
}

/// The immutable identity of a [`Span`](crate::trace::Span): trace id, span
/// id, trace flags, remote origin flag and trace state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
    trace_flags: TraceFlags,
    is_remote: bool,
    trace_state: TraceState,
}

impl SpanContext {
    /// The invalid span context.
    pub fn empty_context() -> Self {
        SpanContext::new(
            TraceId::INVALID,
            SpanId::INVALID,
            TraceFlags::default(),
            false,
            TraceState::default(),
        )
    }

    /// Construct a span context.
    pub fn new(
        trace_id: TraceId,
        span_id: SpanId,
        trace_flags: TraceFlags,
        is_remote: bool,
        trace_state: TraceState,
    ) -> Self {
        SpanContext {
            trace_id,
            span_id,
            trace_flags,
            is_remote,
            trace_state,
        }
    }

    /// The trace id.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The span id.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// The trace flags.
    pub fn trace_flags(&self) -> TraceFlags {
        self.trace_flags
    }

    /// True if both ids are valid (non-zero).
    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }

    /// True if the context was received from a remote parent.
    pub fn is_remote(&self) -> bool {
        self.is_remote
    }

    /// True if the sampled flag is set.
    pub fn is_sampled(&self) -> bool {
        self.trace_flags.is_sampled()
    }

    /// The trace state.
    pub fn trace_state(&self) -> &TraceState {
        &self.trace_state
    }
}

/// The relationship this span describes between its operation and its
/// parent and children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// An internal operation within an application.
    Internal,
    /// Server-side handling of a remote request.
    Server,
    /// A request to a remote service.
    Client,
    /// A message sent to a broker.
    Producer,
    /// A message received from a broker.
    Consumer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_hex_formatting_is_zero_padded() {
        let trace_id = TraceId::from_u128(0x0af7_651916_cd43dd_8448eb_211c8031_9c);
        let span_id = SpanId::from_u64(0x00f0_67aa_0ba9_02b7);
        assert_eq!(format!("{trace_id}").len(), 32);
        assert_eq!(format!("{span_id}"), "00f067aa0ba902b7");
    }

    #[test]
    fn context_validity() {
        assert!(!SpanContext::empty_context().is_valid());
        let ctx = SpanContext::new(
            TraceId::from_u128(1),
            SpanId::from_u64(1),
            TraceFlags::SAMPLED,
            false,
            TraceState::default(),
        );
        assert!(ctx.is_valid());
        assert!(ctx.is_sampled());
    }

    #[test]
    fn trace_flags_sampled_bit() {
        assert!(TraceFlags::SAMPLED.is_sampled());
        assert!(!TraceFlags::default().is_sampled());
        assert!(!TraceFlags::SAMPLED.with_sampled(false).is_sampled());
    }
}
