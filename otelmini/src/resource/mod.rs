//! Representations of entities producing telemetry.
//!
//! A [`Resource`] is an immutable description of the entity producing
//! telemetry, e.g. `service.name` for a service. Resources are detected from
//! the environment at provider construction, merged in a well-defined order,
//! and attached to every exported span, log record and metric stream.

mod env;
mod telemetry;

pub use env::{EnvResourceDetector, SdkProvidedResourceDetector};
pub use telemetry::TelemetryResourceDetector;

use std::borrow::Cow;
use std::collections::{btree_map, BTreeMap};
use std::sync::Arc;

use crate::{Key, KeyValue, Value};

/// Key of the mandatory `service.name` attribute.
pub(crate) const SERVICE_NAME: &str = "service.name";
pub(crate) const TELEMETRY_SDK_NAME: &str = "telemetry.sdk.name";
pub(crate) const TELEMETRY_SDK_LANGUAGE: &str = "telemetry.sdk.language";
pub(crate) const TELEMETRY_SDK_VERSION: &str = "telemetry.sdk.version";

/// An immutable representation of the entity producing telemetry as attributes.
///
/// `Resource` is cheap to clone; the attribute map is shared behind an `Arc`.
/// Equality is structural, which the OTLP encoder relies on when grouping
/// telemetry by resource.
#[derive(Debug, Clone)]
pub struct Resource {
    inner: Arc<ResourceInner>,
}

#[derive(Debug, Default)]
struct ResourceInner {
    attrs: BTreeMap<Key, Value>,
    schema_url: Option<Cow<'static, str>>,
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.schema_url == other.inner.schema_url
                && self.inner.attrs == other.inner.attrs)
    }
}

impl Eq for Resource {}

// Value contains f64, which has no Hash; hash the attribute's string form so
// Resource can key the encoder's grouping maps.
impl std::hash::Hash for Resource {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for (k, v) in self.inner.attrs.iter() {
            k.hash(state);
            v.as_str().hash(state);
        }
        self.inner.schema_url.hash(state);
    }
}

impl Default for Resource {
    fn default() -> Self {
        Resource::builder().build()
    }
}

impl Resource {
    /// Creates a [ResourceBuilder] pre-populated with the default detectors:
    /// SDK metadata, `OTEL_SERVICE_NAME` and `OTEL_RESOURCE_ATTRIBUTES`.
    pub fn builder() -> ResourceBuilder {
        ResourceBuilder {
            resource: Resource::empty()
                .merge(&TelemetryResourceDetector.detect())
                .merge(&EnvResourceDetector::new().detect())
                .merge(&SdkProvidedResourceDetector.detect()),
        }
    }

    /// Creates a [ResourceBuilder] with no detectors applied.
    pub fn builder_empty() -> ResourceBuilder {
        ResourceBuilder {
            resource: Resource::empty(),
        }
    }

    /// A resource with no attributes.
    pub fn empty() -> Self {
        Resource {
            inner: Arc::new(ResourceInner::default()),
        }
    }

    pub(crate) fn from_parts(
        attrs: impl IntoIterator<Item = KeyValue>,
        schema_url: Option<Cow<'static, str>>,
    ) -> Self {
        Resource {
            inner: Arc::new(ResourceInner {
                attrs: attrs
                    .into_iter()
                    .map(|kv| (kv.key, kv.value))
                    .collect(),
                schema_url: schema_url.filter(|s| !s.is_empty()),
            }),
        }
    }

    /// Create a new `Resource` by combining two resources.
    ///
    /// The `other` resource wins on attribute conflicts; a non-empty schema
    /// URL replaces an empty one. Two differing non-empty schema URLs keep
    /// the original.
    pub fn merge(&self, other: &Resource) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        let mut attrs = self.inner.attrs.clone();
        for (k, v) in other.inner.attrs.iter() {
            attrs.insert(k.clone(), v.clone());
        }

        let schema_url = match (&self.inner.schema_url, &other.inner.schema_url) {
            (Some(url), None) => Some(url.clone()),
            (None, Some(url)) => Some(url.clone()),
            (Some(url), Some(_)) => Some(url.clone()),
            (None, None) => None,
        };

        Resource {
            inner: Arc::new(ResourceInner { attrs, schema_url }),
        }
    }

    /// The schema URL of this resource, if any.
    pub fn schema_url(&self) -> Option<&str> {
        self.inner.schema_url.as_deref()
    }

    /// Retrieve the value of the given attribute key, if present.
    pub fn get(&self, key: &Key) -> Option<Value> {
        self.inner.attrs.get(key).cloned()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.inner.attrs.len()
    }

    /// True if there are no attributes and no schema URL.
    pub fn is_empty(&self) -> bool {
        self.inner.attrs.is_empty() && self.inner.schema_url.is_none()
    }

    /// Iterate over the attribute pairs.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.inner.attrs.iter())
    }
}

/// An iterator over resource attributes.
#[derive(Debug)]
pub struct Iter<'a>(btree_map::Iter<'a, Key, Value>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Key, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<'a> IntoIterator for &'a Resource {
    type Item = (&'a Key, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builder for [Resource].
#[derive(Debug)]
pub struct ResourceBuilder {
    resource: Resource,
}

impl ResourceBuilder {
    /// Add a [ResourceDetector] to the builder.
    pub fn with_detector(mut self, detector: &dyn ResourceDetector) -> Self {
        self.resource = self.resource.merge(&detector.detect());
        self
    }

    /// Add a `service.name` attribute.
    pub fn with_service_name(self, name: impl Into<Value>) -> Self {
        self.with_attribute(KeyValue::new(SERVICE_NAME, name.into()))
    }

    /// Add a single attribute. Later values win over earlier ones.
    pub fn with_attribute(mut self, kv: KeyValue) -> Self {
        self.resource = self
            .resource
            .merge(&Resource::from_parts([kv], None));
        self
    }

    /// Add multiple attributes.
    pub fn with_attributes<T: IntoIterator<Item = KeyValue>>(mut self, attrs: T) -> Self {
        self.resource = self.resource.merge(&Resource::from_parts(attrs, None));
        self
    }

    /// Set the schema URL.
    pub fn with_schema_url(mut self, schema_url: impl Into<Cow<'static, str>>) -> Self {
        self.resource = Resource::from_parts(
            self.resource
                .iter()
                .map(|(k, v)| KeyValue {
                    key: k.clone(),
                    value: v.clone(),
                })
                .collect::<Vec<_>>(),
            Some(schema_url.into()),
        );
        self
    }

    /// Build the frozen [Resource].
    pub fn build(self) -> Resource {
        self.resource
    }
}

/// An interface for detecting resource information from the runtime
/// environment.
///
/// Implementations must not take longer than necessary and must not block.
pub trait ResourceDetector {
    /// Detect and return a resource; empty if nothing was found.
    fn detect(&self) -> Resource;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_resource_wins_on_conflict() {
        let old = Resource::from_parts([KeyValue::new("a", "1"), KeyValue::new("b", "2")], None);
        let new = Resource::from_parts([KeyValue::new("a", "10")], None);
        let merged = old.merge(&new);
        assert_eq!(merged.get(&Key::new("a")), Some(Value::from("10")));
        assert_eq!(merged.get(&Key::new("b")), Some(Value::from("2")));
    }

    #[test]
    fn non_empty_schema_url_replaces_empty() {
        let plain = Resource::from_parts([KeyValue::new("a", "1")], None);
        let with_schema =
            Resource::from_parts([KeyValue::new("b", "2")], Some("http://schema".into()));

        assert_eq!(plain.merge(&with_schema).schema_url(), Some("http://schema"));
        assert_eq!(with_schema.merge(&plain).schema_url(), Some("http://schema"));
    }

    #[test]
    fn conflicting_schema_urls_keep_original() {
        let first = Resource::from_parts([], Some("http://one".into()));
        let second = Resource::from_parts([], Some("http://two".into()));
        assert_eq!(first.merge(&second).schema_url(), Some("http://one"));
    }

    #[test]
    fn default_resource_carries_sdk_attributes() {
        temp_env::with_vars_unset(["OTEL_SERVICE_NAME", "OTEL_RESOURCE_ATTRIBUTES"], || {
            let resource = Resource::default();
            assert_eq!(
                resource.get(&Key::new(TELEMETRY_SDK_NAME)),
                Some(Value::from("otelmini"))
            );
            assert_eq!(
                resource.get(&Key::new(TELEMETRY_SDK_LANGUAGE)),
                Some(Value::from("rust"))
            );
            assert_eq!(
                resource.get(&Key::new(SERVICE_NAME)),
                Some(Value::from("unknown_service"))
            );
        });
    }
}
