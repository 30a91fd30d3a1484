//! Exporter selection from the `OTEL_{TRACES,METRICS,LOGS}_EXPORTER`
//! environment variables: `otlp` (the default), `console`, or `none`.

use std::env;

use crate::ExporterBuildError;

/// Selects the span exporter implementation.
pub const OTEL_TRACES_EXPORTER: &str = "OTEL_TRACES_EXPORTER";
/// Selects the metrics exporter implementation.
pub const OTEL_METRICS_EXPORTER: &str = "OTEL_METRICS_EXPORTER";
/// Selects the logs exporter implementation.
pub const OTEL_LOGS_EXPORTER: &str = "OTEL_LOGS_EXPORTER";

fn selection(var: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "otlp".to_string())
}

/// Build the span exporter selected by `OTEL_TRACES_EXPORTER`.
///
/// Returns `None` for the `none` tag; the `otlp` tag builds the HTTP/JSON
/// exporter against the configured endpoint.
#[cfg(all(feature = "trace", feature = "http-json", feature = "serialize"))]
pub fn span_exporter_from_env(
) -> Result<Option<Box<dyn otelmini::trace::SpanExporter>>, ExporterBuildError> {
    match selection(OTEL_TRACES_EXPORTER).as_str() {
        "otlp" => Ok(Some(Box::new(
            crate::new_exporter().http().build_span_exporter()?,
        ))),
        "console" => Ok(Some(Box::new(crate::ConsoleSpanExporter::default()))),
        "none" => Ok(None),
        other => Err(ExporterBuildError::InvalidConfig {
            name: OTEL_TRACES_EXPORTER,
            reason: format!("unsupported exporter `{other}`"),
        }),
    }
}

/// Build the metrics exporter selected by `OTEL_METRICS_EXPORTER`.
#[cfg(all(feature = "metrics", feature = "http-json", feature = "serialize"))]
pub fn metric_exporter_from_env(
) -> Result<Option<Box<dyn otelmini::metrics::PushMetricExporter>>, ExporterBuildError> {
    match selection(OTEL_METRICS_EXPORTER).as_str() {
        "otlp" => Ok(Some(Box::new(
            crate::new_exporter().http().build_metrics_exporter()?,
        ))),
        "console" => Ok(Some(Box::new(crate::ConsoleMetricExporter::default()))),
        "none" => Ok(None),
        other => Err(ExporterBuildError::InvalidConfig {
            name: OTEL_METRICS_EXPORTER,
            reason: format!("unsupported exporter `{other}`"),
        }),
    }
}

/// Build the log exporter selected by `OTEL_LOGS_EXPORTER`.
#[cfg(all(feature = "logs", feature = "http-json", feature = "serialize"))]
pub fn log_exporter_from_env(
) -> Result<Option<Box<dyn otelmini::logs::LogExporter>>, ExporterBuildError> {
    match selection(OTEL_LOGS_EXPORTER).as_str() {
        "otlp" => Ok(Some(Box::new(
            crate::new_exporter().http().build_log_exporter()?,
        ))),
        "console" => Ok(Some(Box::new(crate::ConsoleLogExporter::default()))),
        "none" => Ok(None),
        other => Err(ExporterBuildError::InvalidConfig {
            name: OTEL_LOGS_EXPORTER,
            reason: format!("unsupported exporter `{other}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_defaults_to_otlp() {
        temp_env::with_vars_unset([OTEL_TRACES_EXPORTER], || {
            assert_eq!(selection(OTEL_TRACES_EXPORTER), "otlp");
        });
        temp_env::with_var(OTEL_TRACES_EXPORTER, Some("console"), || {
            assert_eq!(selection(OTEL_TRACES_EXPORTER), "console");
        });
    }

    #[cfg(all(
        feature = "trace",
        feature = "http-json",
        feature = "serialize",
        feature = "reqwest-blocking-client"
    ))]
    #[test]
    fn none_selection_builds_no_exporter() {
        temp_env::with_var(OTEL_TRACES_EXPORTER, Some("none"), || {
            assert!(span_exporter_from_env().unwrap().is_none());
        });
    }

    #[cfg(all(
        feature = "trace",
        feature = "http-json",
        feature = "serialize",
        feature = "reqwest-blocking-client"
    ))]
    #[test]
    fn unknown_selection_is_a_loud_error() {
        temp_env::with_var(OTEL_TRACES_EXPORTER, Some("jaeger"), || {
            assert!(span_exporter_from_env().is_err());
        });
    }
}
