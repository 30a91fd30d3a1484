use crate::resource::{Resource, ResourceDetector};
use crate::KeyValue;

/// Detects the telemetry SDK attributes required on every resource:
/// `telemetry.sdk.name`, `telemetry.sdk.language` and `telemetry.sdk.version`.
#[derive(Debug)]
pub struct TelemetryResourceDetector;

impl ResourceDetector for TelemetryResourceDetector {
    fn detect(&self) -> Resource {
        Resource::from_parts(
            [
                KeyValue::new(super::TELEMETRY_SDK_NAME, "otelmini"),
                KeyValue::new(super::TELEMETRY_SDK_LANGUAGE, "rust"),
                KeyValue::new(super::TELEMETRY_SDK_VERSION, env!("CARGO_PKG_VERSION")),
            ],
            None,
        )
    }
}
