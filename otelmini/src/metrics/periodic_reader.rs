use std::env;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

use crate::error::{ExportResult, OTelSdkError, OTelSdkResult};
use crate::metrics::data::ResourceMetrics;
use crate::metrics::exporter::PushMetricExporter;
use crate::metrics::reader::{MetricReader, SdkProducer};
use crate::{otel_debug, otel_warn};

/// Interval between two consecutive collect/export passes, in milliseconds.
pub const OTEL_METRIC_EXPORT_INTERVAL: &str = "OTEL_METRIC_EXPORT_INTERVAL";
const DEFAULT_INTERVAL: Duration = Duration::from_millis(10_000);

/// Configuration options for a [PeriodicReader].
#[derive(Debug)]
pub struct PeriodicReaderBuilder<E> {
    interval: Duration,
    exporter: E,
}

impl<E> PeriodicReaderBuilder<E>
where
    E: PushMetricExporter,
{
    fn new(exporter: E) -> Self {
        let interval = env::var(OTEL_METRIC_EXPORT_INTERVAL)
            .ok()
            .and_then(|v| v.parse().map(Duration::from_millis).ok())
            .unwrap_or(DEFAULT_INTERVAL);
        PeriodicReaderBuilder { interval, exporter }
    }

    /// Configure the intervening time between exports. Overrides
    /// `OTEL_METRIC_EXPORT_INTERVAL`.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.interval = interval;
        }
        self
    }

    /// Create the reader and start its worker thread.
    pub fn build(self) -> PeriodicReader {
        PeriodicReader::new(self.exporter, self.interval)
    }
}

/// A [`MetricReader`] that collects and exports on a fixed interval from a
/// dedicated worker thread.
///
/// `force_flush` triggers one collect/export pass now; `shutdown` stops the
/// worker, performs one final pass, and shuts the exporter down.
#[derive(Clone)]
pub struct PeriodicReader {
    exporter: Arc<dyn PushMetricExporter>,
    inner: Arc<PeriodicReaderInner>,
}

struct PeriodicReaderInner {
    message_sender: Sender<Message>,
    producer: Mutex<Option<Weak<dyn SdkProducer>>>,
    // set when shutdown is requested; guards reentry
    shutdown_invoked: AtomicBool,
    // set once the final collection completed; gates collect()
    is_shutdown: AtomicBool,
}

#[derive(Debug)]
enum Message {
    Flush(Sender<bool>),
    Shutdown(Sender<bool>),
}

impl fmt::Debug for PeriodicReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PeriodicReader")
    }
}

impl PeriodicReader {
    /// Configuration options for a periodic reader.
    pub fn builder<E>(exporter: E) -> PeriodicReaderBuilder<E>
    where
        E: PushMetricExporter,
    {
        PeriodicReaderBuilder::new(exporter)
    }

    fn new<E>(exporter: E, interval: Duration) -> Self
    where
        E: PushMetricExporter,
    {
        let (message_sender, message_receiver): (Sender<Message>, Receiver<Message>) =
            mpsc::channel();
        let reader = PeriodicReader {
            exporter: Arc::new(exporter),
            inner: Arc::new(PeriodicReaderInner {
                message_sender,
                producer: Mutex::new(None),
                shutdown_invoked: AtomicBool::new(false),
                is_shutdown: AtomicBool::new(false),
            }),
        };
        let cloned_reader = reader.clone();

        thread::Builder::new()
            .name("OtelMini.Metrics.PeriodicReader".to_string())
            .spawn(move || {
                otel_debug!(
                    name: "PeriodicReader.ThreadStarted",
                    interval_in_millisecs = interval.as_millis()
                );
                loop {
                    match message_receiver.recv_timeout(interval) {
                        Ok(Message::Flush(response_sender)) => {
                            let result = cloned_reader.collect_and_export();
                            let _ = response_sender.send(result.is_ok());
                        }
                        Ok(Message::Shutdown(response_sender)) => {
                            let result = cloned_reader.collect_and_export();
                            let _ = response_sender.send(result.is_ok());
                            break;
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            if let Err(err) = cloned_reader.collect_and_export() {
                                otel_warn!(
                                    name: "PeriodicReader.ExportFailed",
                                    error = format!("{err}")
                                );
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                otel_debug!(name: "PeriodicReader.ThreadStopped");
            })
            .expect("failed to spawn periodic reader thread");

        reader
    }

    fn collect_and_export(&self) -> OTelSdkResult {
        let mut rm = ResourceMetrics::default();
        self.collect(&mut rm)?;
        match self.exporter.export(&rm) {
            ExportResult::Success => Ok(()),
            ExportResult::Failure => Err(OTelSdkError::InternalFailure(
                "metrics export failed".into(),
            )),
        }
    }
}

impl MetricReader for PeriodicReader {
    fn register_pipeline(&self, producer: Weak<dyn SdkProducer>) {
        let mut guard = self
            .inner
            .producer
            .lock()
            .expect("producer lock poisoned");
        *guard = Some(producer);
    }

    fn collect(&self, rm: &mut ResourceMetrics) -> OTelSdkResult {
        if self.inner.is_shutdown.load(Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let producer = self
            .inner
            .producer
            .lock()
            .expect("producer lock poisoned");
        match producer.as_ref().and_then(Weak::upgrade) {
            Some(producer) => producer.produce(rm),
            None => Err(OTelSdkError::InternalFailure(
                "reader is not registered with a meter provider".into(),
            )),
        }
    }

    fn force_flush(&self) -> OTelSdkResult {
        if self.inner.shutdown_invoked.load(Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let (response_tx, response_rx) = mpsc::channel();
        self.inner
            .message_sender
            .send(Message::Flush(response_tx))
            .map_err(|e| OTelSdkError::InternalFailure(e.to_string()))?;

        match response_rx.recv() {
            Ok(true) => Ok(()),
            _ => Err(OTelSdkError::InternalFailure("failed to flush".into())),
        }
    }

    fn shutdown(&self) -> OTelSdkResult {
        if self.inner.shutdown_invoked.swap(true, Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }

        // the worker performs one final collect/export before exiting
        let (response_tx, response_rx) = mpsc::channel();
        let send_result = self.inner.message_sender.send(Message::Shutdown(response_tx));
        let result = match send_result {
            Ok(()) => match response_rx.recv() {
                Ok(true) => Ok(()),
                _ => Err(OTelSdkError::InternalFailure("failed to shutdown".into())),
            },
            Err(e) => Err(OTelSdkError::InternalFailure(e.to_string())),
        };
        self.inner.is_shutdown.store(true, Ordering::SeqCst);

        self.exporter.shutdown()?;
        result
    }
}
