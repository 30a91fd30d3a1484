//! OTLP message types and transformations for `otelmini`.
//!
//! The `tonic` module contains hand-maintained message and client files in
//! the layout `tonic-prost-build` emits for the [opentelemetry-proto]
//! schema, trimmed to the subset this SDK speaks. With the `with-serde`
//! feature the messages serialize to and from OTLP/JSON: hex-encoded ids,
//! string-encoded 64-bit integers, base64 bytes and integer enums.
//!
//! The `transform` module converts the SDK's finished telemetry into these
//! wire types, including the grouping of spans and logs by resource and
//! scope.
//!
//! [opentelemetry-proto]: https://github.com/open-telemetry/opentelemetry-proto

// proto mod contains rs files kept in the generated layout; skip format and
// lint checks there.
#[rustfmt::skip]
#[allow(warnings)]
#[doc(hidden)]
mod proto;

#[cfg(feature = "gen-tonic-messages")]
pub use proto::tonic;

pub mod transform;
