//! Environment variable resource detectors.

use std::env;

use crate::resource::{Resource, ResourceDetector};
use crate::{Key, KeyValue, Value};

const OTEL_RESOURCE_ATTRIBUTES: &str = "OTEL_RESOURCE_ATTRIBUTES";
const OTEL_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";

/// Extracts resource attributes from the `OTEL_RESOURCE_ATTRIBUTES`
/// environment variable, a `key=value,key=value` list.
#[derive(Debug, Default)]
pub struct EnvResourceDetector {
    _private: (),
}

impl EnvResourceDetector {
    /// Create an `EnvResourceDetector`.
    pub fn new() -> Self {
        EnvResourceDetector { _private: () }
    }
}

impl ResourceDetector for EnvResourceDetector {
    fn detect(&self) -> Resource {
        match env::var(OTEL_RESOURCE_ATTRIBUTES) {
            Ok(s) if !s.is_empty() => construct_otel_resources(s),
            Ok(_) | Err(_) => Resource::empty(),
        }
    }
}

/// Extract key value pairs and construct a resource from a string like
/// `key1=value1,key2=value2,...`
fn construct_otel_resources(s: String) -> Resource {
    Resource::from_parts(
        s.split_terminator(',').filter_map(|entry| {
            let (key, value) = entry.split_once('=')?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some(KeyValue::new(key.to_owned(), value.to_owned()))
        }),
        None,
    )
}

/// Detects the attributes the SDK is required to provide: `service.name`
/// from `OTEL_SERVICE_NAME`, falling back to `OTEL_RESOURCE_ATTRIBUTES`, and
/// finally to `unknown_service`.
#[derive(Debug)]
pub struct SdkProvidedResourceDetector;

impl ResourceDetector for SdkProvidedResourceDetector {
    fn detect(&self) -> Resource {
        Resource::from_parts(
            [KeyValue::new(
                super::SERVICE_NAME,
                env::var(OTEL_SERVICE_NAME)
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(Value::from)
                    .or_else(|| {
                        EnvResourceDetector::new()
                            .detect()
                            .get(&Key::from_static_str(super::SERVICE_NAME))
                    })
                    .unwrap_or_else(|| "unknown_service".into()),
            )],
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_detector_parses_pairs() {
        temp_env::with_var(
            OTEL_RESOURCE_ATTRIBUTES,
            Some("key=value, k = v , a= x, a=z,malformed"),
            || {
                let resource = EnvResourceDetector::new().detect();
                assert_eq!(resource.get(&Key::new("key")), Some(Value::from("value")));
                assert_eq!(resource.get(&Key::new("k")), Some(Value::from("v")));
                // last assignment wins
                assert_eq!(resource.get(&Key::new("a")), Some(Value::from("z")));
                assert_eq!(resource.get(&Key::new("malformed")), None);
            },
        );
    }

    #[test]
    fn service_name_priority() {
        temp_env::with_vars(
            [
                (OTEL_SERVICE_NAME, Some("from-service-name")),
                (OTEL_RESOURCE_ATTRIBUTES, Some("service.name=from-attrs")),
            ],
            || {
                let resource = SdkProvidedResourceDetector.detect();
                assert_eq!(
                    resource.get(&Key::new("service.name")),
                    Some(Value::from("from-service-name"))
                );
            },
        );

        temp_env::with_vars(
            [
                (OTEL_SERVICE_NAME, None),
                (OTEL_RESOURCE_ATTRIBUTES, Some("service.name=from-attrs")),
            ],
            || {
                let resource = SdkProvidedResourceDetector.detect();
                assert_eq!(
                    resource.get(&Key::new("service.name")),
                    Some(Value::from("from-attrs"))
                );
            },
        );

        temp_env::with_vars_unset([OTEL_SERVICE_NAME, OTEL_RESOURCE_ATTRIBUTES], || {
            let resource = SdkProvidedResourceDetector.detect();
            assert_eq!(
                resource.get(&Key::new("service.name")),
                Some(Value::from("unknown_service"))
            );
        });
    }
}
