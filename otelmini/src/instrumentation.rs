use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::KeyValue;

/// Information about the library producing a stream of telemetry.
///
/// Scopes are frozen at construction and cheap to clone; spans, log records
/// and metric streams hold shared references to the scope that created them.
#[derive(Debug, Clone)]
pub struct InstrumentationScope {
    inner: Arc<ScopeInner>,
}

#[derive(Debug)]
struct ScopeInner {
    name: Cow<'static, str>,
    version: Option<Cow<'static, str>>,
    schema_url: Option<Cow<'static, str>>,
    attributes: Vec<KeyValue>,
}

impl Default for InstrumentationScope {
    fn default() -> Self {
        InstrumentationScope::builder("").build()
    }
}

// Scope identity for encoder grouping: name, version and schema url. Scope
// attributes do not participate, matching the OTLP grouping rules.
impl PartialEq for InstrumentationScope {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.name == other.inner.name
                && self.inner.version == other.inner.version
                && self.inner.schema_url == other.inner.schema_url)
    }
}

impl Eq for InstrumentationScope {}

impl Hash for InstrumentationScope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
        self.inner.version.hash(state);
        self.inner.schema_url.hash(state);
    }
}

impl InstrumentationScope {
    /// Create a new builder for the named scope.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> InstrumentationScopeBuilder {
        InstrumentationScopeBuilder {
            name: name.into(),
            version: None,
            schema_url: None,
            attributes: Vec::new(),
        }
    }

    /// The name of the instrumented library.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The version of the instrumented library, if known.
    pub fn version(&self) -> Option<&str> {
        self.inner.version.as_deref()
    }

    /// The schema URL applying to this scope's telemetry, if any.
    pub fn schema_url(&self) -> Option<&str> {
        self.inner.schema_url.as_deref()
    }

    /// Attributes describing the scope.
    pub fn attributes(&self) -> impl Iterator<Item = &KeyValue> {
        self.inner.attributes.iter()
    }
}

/// Builder for [`InstrumentationScope`].
#[derive(Debug)]
pub struct InstrumentationScopeBuilder {
    name: Cow<'static, str>,
    version: Option<Cow<'static, str>>,
    schema_url: Option<Cow<'static, str>>,
    attributes: Vec<KeyValue>,
}

impl InstrumentationScopeBuilder {
    /// Configure the version of the scope.
    pub fn with_version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Configure the schema URL of the scope.
    pub fn with_schema_url(mut self, schema_url: impl Into<Cow<'static, str>>) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    /// Configure scope attributes.
    pub fn with_attributes<I>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = KeyValue>,
    {
        self.attributes = attributes.into_iter().collect();
        self
    }

    /// Create the frozen scope.
    pub fn build(self) -> InstrumentationScope {
        InstrumentationScope {
            inner: Arc::new(ScopeInner {
                name: self.name,
                version: self.version,
                schema_url: self.schema_url,
                attributes: self.attributes,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_identity_ignores_attributes() {
        let a = InstrumentationScope::builder("lib")
            .with_version("1.0")
            .with_attributes([KeyValue::new("k", "v")])
            .build();
        let b = InstrumentationScope::builder("lib").with_version("1.0").build();
        assert_eq!(a, b);

        let c = InstrumentationScope::builder("lib").with_version("2.0").build();
        assert_ne!(a, c);
    }
}
