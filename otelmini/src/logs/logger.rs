use std::fmt;
use std::sync::Weak;

use crate::logs::logger_provider::LoggerProviderInner;
use crate::logs::record::SdkLogRecord;
use crate::InstrumentationScope;

/// Emits log records for one instrumentation scope.
#[derive(Clone)]
pub struct Logger {
    scope: InstrumentationScope,
    provider: Weak<LoggerProviderInner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.scope.name())
            .finish()
    }
}

impl Logger {
    pub(crate) fn new(scope: InstrumentationScope, provider: Weak<LoggerProviderInner>) -> Self {
        Logger { scope, provider }
    }

    /// The scope this logger was created with.
    pub fn scope(&self) -> &InstrumentationScope {
        &self.scope
    }

    /// Create an empty record to fill in before emitting.
    pub fn create_log_record(&self) -> SdkLogRecord {
        SdkLogRecord::new()
    }

    /// Freeze the record and fan it out to the provider's processors.
    ///
    /// Stamps the observed timestamp (when unset), the provider resource and
    /// this logger's scope. No-op after provider shutdown.
    pub fn emit(&self, mut record: SdkLogRecord) {
        let Some(provider) = self.provider.upgrade() else {
            return;
        };
        if record.observed_timestamp.is_none() {
            record.observed_timestamp = Some(crate::time::now());
        }
        record.resource = Some(provider.resource().clone());
        record.scope = Some(self.scope.clone());
        provider.emit(record);
    }
}
