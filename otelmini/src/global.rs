//! Process-wide default providers.
//!
//! The globals are lazily consulted accessors guarded by `RwLock`s; an
//! application installs its configured providers once at startup and
//! instrumented libraries obtain tracers/meters/loggers from here. When no
//! provider is installed, the returned instruments are inert: they carry
//! context but record nothing.

#[cfg(any(feature = "trace", feature = "metrics", feature = "logs"))]
use std::borrow::Cow;
#[cfg(any(feature = "trace", feature = "metrics", feature = "logs"))]
use std::sync::RwLock;

#[cfg(feature = "logs")]
use crate::logs::{Logger, SdkLoggerProvider};
#[cfg(feature = "metrics")]
use crate::metrics::{Meter, SdkMeterProvider};
#[cfg(feature = "trace")]
use crate::trace::{SdkTracerProvider, Tracer};

#[cfg(feature = "trace")]
static GLOBAL_TRACER_PROVIDER: RwLock<Option<SdkTracerProvider>> = RwLock::new(None);
#[cfg(feature = "metrics")]
static GLOBAL_METER_PROVIDER: RwLock<Option<SdkMeterProvider>> = RwLock::new(None);
#[cfg(feature = "logs")]
static GLOBAL_LOGGER_PROVIDER: RwLock<Option<SdkLoggerProvider>> = RwLock::new(None);

/// Install the process-wide tracer provider, returning the previous one.
#[cfg(feature = "trace")]
pub fn set_tracer_provider(provider: SdkTracerProvider) -> Option<SdkTracerProvider> {
    let mut global = GLOBAL_TRACER_PROVIDER
        .write()
        .expect("global tracer provider poisoned");
    global.replace(provider)
}

/// The installed tracer provider, if any.
#[cfg(feature = "trace")]
pub fn tracer_provider() -> Option<SdkTracerProvider> {
    GLOBAL_TRACER_PROVIDER
        .read()
        .expect("global tracer provider poisoned")
        .clone()
}

/// A tracer from the installed provider, or an inert tracer when none is
/// installed.
#[cfg(feature = "trace")]
pub fn tracer(name: impl Into<Cow<'static, str>>) -> Tracer {
    match tracer_provider() {
        Some(provider) => provider.tracer(name),
        // the backing provider drops immediately, leaving a tracer whose
        // spans are non-recording
        None => SdkTracerProvider::builder().build().tracer(name),
    }
}

/// Shut down and uninstall the global tracer provider.
#[cfg(feature = "trace")]
pub fn shutdown_tracer_provider() {
    let provider = GLOBAL_TRACER_PROVIDER
        .write()
        .expect("global tracer provider poisoned")
        .take();
    if let Some(provider) = provider {
        let _ = provider.shutdown();
    }
}

/// Install the process-wide meter provider, returning the previous one.
#[cfg(feature = "metrics")]
pub fn set_meter_provider(provider: SdkMeterProvider) -> Option<SdkMeterProvider> {
    let mut global = GLOBAL_METER_PROVIDER
        .write()
        .expect("global meter provider poisoned");
    global.replace(provider)
}

/// The installed meter provider, if any.
#[cfg(feature = "metrics")]
pub fn meter_provider() -> Option<SdkMeterProvider> {
    GLOBAL_METER_PROVIDER
        .read()
        .expect("global meter provider poisoned")
        .clone()
}

/// A meter from the installed provider, or an inert meter when none is
/// installed.
#[cfg(feature = "metrics")]
pub fn meter(name: impl Into<Cow<'static, str>>) -> Meter {
    match meter_provider() {
        Some(provider) => provider.meter(name),
        // never collected, so measurements vanish
        None => SdkMeterProvider::builder().build().meter(name),
    }
}

/// Shut down and uninstall the global meter provider.
#[cfg(feature = "metrics")]
pub fn shutdown_meter_provider() {
    let provider = GLOBAL_METER_PROVIDER
        .write()
        .expect("global meter provider poisoned")
        .take();
    if let Some(provider) = provider {
        let _ = provider.shutdown();
    }
}

/// Install the process-wide logger provider, returning the previous one.
#[cfg(feature = "logs")]
pub fn set_logger_provider(provider: SdkLoggerProvider) -> Option<SdkLoggerProvider> {
    let mut global = GLOBAL_LOGGER_PROVIDER
        .write()
        .expect("global logger provider poisoned");
    global.replace(provider)
}

/// The installed logger provider, if any.
#[cfg(feature = "logs")]
pub fn logger_provider() -> Option<SdkLoggerProvider> {
    GLOBAL_LOGGER_PROVIDER
        .read()
        .expect("global logger provider poisoned")
        .clone()
}

/// A logger from the installed provider, or an inert logger when none is
/// installed.
#[cfg(feature = "logs")]
pub fn logger(name: impl Into<Cow<'static, str>>) -> Logger {
    match logger_provider() {
        Some(provider) => provider.logger(name),
        None => SdkLoggerProvider::builder().build().logger(name),
    }
}

/// Shut down and uninstall the global logger provider.
#[cfg(feature = "logs")]
pub fn shutdown_logger_provider() {
    let provider = GLOBAL_LOGGER_PROVIDER
        .write()
        .expect("global logger provider poisoned")
        .take();
    if let Some(provider) = provider {
        let _ = provider.shutdown();
    }
}

/// Uninstall every global provider without shutting it down.
///
/// Only for tests that need a clean slate between cases; applications
/// should use the `shutdown_*` functions.
pub fn reset_providers_for_tests() {
    #[cfg(feature = "trace")]
    {
        GLOBAL_TRACER_PROVIDER
            .write()
            .expect("global tracer provider poisoned")
            .take();
    }
    #[cfg(feature = "metrics")]
    {
        GLOBAL_METER_PROVIDER
            .write()
            .expect("global meter provider poisoned")
            .take();
    }
    #[cfg(feature = "logs")]
    {
        GLOBAL_LOGGER_PROVIDER
            .write()
            .expect("global logger provider poisoned")
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // the globals are process-wide; keep every assertion in one test to
    // avoid cross-test interference
    #[test]
    #[cfg(all(feature = "trace", feature = "metrics", feature = "logs"))]
    fn install_access_and_reset() {
        reset_providers_for_tests();
        assert!(tracer_provider().is_none());
        assert!(meter_provider().is_none());
        assert!(logger_provider().is_none());

        // inert instruments work without an installed provider
        let span = tracer("fallback").start("op");
        assert!(!span.is_recording());

        set_tracer_provider(SdkTracerProvider::builder().build());
        set_meter_provider(SdkMeterProvider::builder().build());
        set_logger_provider(SdkLoggerProvider::builder().build());
        assert!(tracer_provider().is_some());
        assert!(meter_provider().is_some());
        assert!(logger_provider().is_some());

        shutdown_tracer_provider();
        shutdown_meter_provider();
        shutdown_logger_provider();
        assert!(tracer_provider().is_none());

        reset_providers_for_tests();
    }
}
