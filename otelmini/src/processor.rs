//! The batching pipeline between telemetry producers and exporters.
//!
//! A [`BatchProcessor`] buffers finished telemetry items and exports them in
//! batches from a **dedicated background thread**. An export is triggered
//! when the batch size is reached or when the schedule interval elapses;
//! `force_flush` triggers one immediately and `shutdown` drains every
//! remaining item exactly once.
//!
//! ```ascii
//!   +-----+--------------+   +-----------------------+   +----------------+
//!   |     |              |   |                       |   |                |
//!   | SDK | Span::end()  +---> BatchProcessor        +--->   Exporter     |
//!   |     | Logger.emit()|   |  (Batcher + Timer)    |   |  (OTLP, ...)   |
//!   +-----+--------------+   +-----------------------+   +----------------+
//! ```
//!
//! The processor is generic over the item type; the trace and logs modules
//! wrap it behind their signal-specific processor traits.

use std::collections::VecDeque;
use std::env;
use std::fmt;
use std::mem;
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use crate::error::{ExportResult, OTelSdkError, OTelSdkResult};
use crate::{otel_debug, otel_warn};

/// Maximum batch size; an export fires as soon as this many items are buffered.
pub const OTEL_BSP_MAX_EXPORT_BATCH_SIZE: &str = "OTEL_BSP_MAX_EXPORT_BATCH_SIZE";
/// Default maximum batch size.
pub(crate) const OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT: usize = 512;
/// Delay interval (in milliseconds) between two consecutive scheduled exports.
pub const OTEL_BSP_SCHEDULE_DELAY: &str = "OTEL_BSP_SCHEDULE_DELAY";
/// Default delay interval between two consecutive scheduled exports.
pub(crate) const OTEL_BSP_SCHEDULE_DELAY_DEFAULT: Duration = Duration::from_millis(5_000);

/// Terminal sink for batches of telemetry items.
///
/// The [`BatchProcessor`] guarantees that `export` is never invoked
/// concurrently on the same exporter; implementations own their retry loop
/// and classify the terminal outcome.
pub trait Exporter<T>: Send + Sync {
    /// Deliver one batch. A [`ExportResult::Failure`] batch is dropped by the
    /// caller, not requeued.
    fn export(&self, batch: Vec<T>) -> ExportResult;

    /// Release any held resources. Called once, after the final drain.
    fn shutdown(&self) -> OTelSdkResult {
        Ok(())
    }
}

/// Thread-safe accumulator with a fixed batch-size cut.
///
/// Items append to a current list; when the list reaches `batch_size` it is
/// moved onto a FIFO queue of completed batches. No item is ever duplicated
/// or lost across `add`/`pop`, and batch order is preserved.
pub struct Batcher<T> {
    batch_size: usize,
    state: Mutex<BatcherState<T>>,
}

struct BatcherState<T> {
    items: Vec<T>,
    batches: VecDeque<Vec<T>>,
}

impl<T> fmt::Debug for Batcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batcher")
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl<T> Batcher<T> {
    /// Create a batcher cutting batches of `batch_size` items.
    pub fn new(batch_size: usize) -> Self {
        Batcher {
            batch_size: batch_size.max(1),
            state: Mutex::new(BatcherState {
                items: Vec::new(),
                batches: VecDeque::new(),
            }),
        }
    }

    /// Append an item. Returns true exactly when the append completed a
    /// batch, signalling the caller to wake the export worker.
    pub fn add(&self, item: T) -> bool {
        let mut state = self.state.lock().expect("batcher lock poisoned");
        state.items.push(item);
        if state.items.len() == self.batch_size {
            let full = mem::take(&mut state.items);
            state.batches.push_back(full);
            true
        } else {
            false
        }
    }

    /// Cut the current items into a batch (if any) and dequeue the oldest
    /// batch.
    pub fn pop(&self) -> Option<Vec<T>> {
        let mut state = self.state.lock().expect("batcher lock poisoned");
        if !state.items.is_empty() {
            let partial = mem::take(&mut state.items);
            state.batches.push_back(partial);
        }
        state.batches.pop_front()
    }
}

/// Periodic wakeup with explicit notify and stop.
///
/// `run` loops on the worker thread: wait up to the interval, or until
/// notified, or until stopped; invoke the target when not stopped.
/// [`Timer::stop`] additionally invokes the target one final time from the
/// calling thread so buffered work is drained; stop is idempotent and the
/// final invocation happens at most once.
pub struct Timer {
    target: Box<dyn Fn() + Send + Sync>,
    interval: Duration,
    sleeper: Mutex<bool>,
    condvar: Condvar,
    stopped: AtomicBool,
    drained: AtomicBool,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("interval", &self.interval)
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl Timer {
    /// Create a timer invoking `target` every `interval`.
    pub fn new(target: impl Fn() + Send + Sync + 'static, interval: Duration) -> Self {
        Timer {
            target: Box::new(target),
            interval,
            sleeper: Mutex::new(false),
            condvar: Condvar::new(),
            stopped: AtomicBool::new(false),
            drained: AtomicBool::new(false),
        }
    }

    /// The wait-invoke loop; runs until [`Timer::stop`].
    pub fn run(&self) {
        otel_debug!(
            name: "Timer.ThreadStarted",
            interval_in_millisecs = self.interval.as_millis()
        );
        while !self.is_stopped() {
            self.sleep();
            if !self.is_stopped() {
                (self.target)();
            }
        }
        otel_debug!(name: "Timer.ThreadStopped");
    }

    fn sleep(&self) {
        let notified = self.sleeper.lock().expect("timer lock poisoned");
        let (mut notified, _) = self
            .condvar
            .wait_timeout_while(notified, self.interval, |notified| {
                !*notified && !self.is_stopped()
            })
            .expect("timer lock poisoned");
        *notified = false;
    }

    /// Wake the waiter so the next target invocation happens now. Used when a
    /// batch fills before the interval elapses.
    pub fn notify_sleeper(&self) {
        let mut notified = self.sleeper.lock().expect("timer lock poisoned");
        *notified = true;
        self.condvar.notify_one();
    }

    /// True once [`Timer::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Stop the loop, wake the waiter, and invoke the target one final time.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify_sleeper();
        if !self.drained.swap(true, Ordering::SeqCst) {
            (self.target)();
        }
    }
}

/// Batch processor configuration.
///
/// Defaults follow the OTel SDK spec: batch size 512
/// (`OTEL_BSP_MAX_EXPORT_BATCH_SIZE`), interval 5 s
/// (`OTEL_BSP_SCHEDULE_DELAY`, milliseconds). Programmatic configuration
/// overrides the environment.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub(crate) max_export_batch_size: usize,
    pub(crate) scheduled_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfigBuilder::default().build()
    }
}

impl BatchConfig {
    /// The configured maximum batch size.
    pub fn max_export_batch_size(&self) -> usize {
        self.max_export_batch_size
    }

    /// The configured schedule delay.
    pub fn scheduled_delay(&self) -> Duration {
        self.scheduled_delay
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    max_export_batch_size: usize,
    scheduled_delay: Duration,
}

impl Default for BatchConfigBuilder {
    /// Defaults per the OTel spec, overridden by the `OTEL_BSP_*` environment
    /// variables when set.
    fn default() -> Self {
        BatchConfigBuilder {
            max_export_batch_size: OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT,
            scheduled_delay: OTEL_BSP_SCHEDULE_DELAY_DEFAULT,
        }
        .init_from_env_vars()
    }
}

impl BatchConfigBuilder {
    /// Set the maximum batch size.
    pub fn with_max_export_batch_size(mut self, max_export_batch_size: usize) -> Self {
        self.max_export_batch_size = max_export_batch_size;
        self
    }

    /// Set the schedule delay.
    pub fn with_scheduled_delay(mut self, scheduled_delay: Duration) -> Self {
        self.scheduled_delay = scheduled_delay;
        self
    }

    /// Build the config.
    pub fn build(self) -> BatchConfig {
        BatchConfig {
            max_export_batch_size: self.max_export_batch_size.max(1),
            scheduled_delay: self.scheduled_delay,
        }
    }

    fn init_from_env_vars(mut self) -> Self {
        if let Some(batch_size) = env::var(OTEL_BSP_MAX_EXPORT_BATCH_SIZE)
            .ok()
            .and_then(|s| usize::from_str(&s).ok())
        {
            self.max_export_batch_size = batch_size;
        }

        if let Some(delay) = env::var(OTEL_BSP_SCHEDULE_DELAY)
            .ok()
            .and_then(|s| u64::from_str(&s).ok())
        {
            self.scheduled_delay = Duration::from_millis(delay);
        }

        self
    }
}

/// Bridges telemetry producers and an [`Exporter`] through a [`Batcher`] and
/// a [`Timer`] running on a dedicated worker thread.
///
/// Producer-side calls never block on network I/O; they take a short mutex
/// at most. All exports happen on the worker thread, except the final drain
/// on `shutdown` and explicit `force_flush` calls, which run on the calling
/// thread and are serialized with the worker through an internal lock.
///
/// If the process forks while the worker exists, the child inherits no
/// running threads. The first producer call in the child detects the new
/// process id and reconstitutes a fresh Batcher/Timer/worker before
/// completing; the parent's queued batches are discarded in the child.
pub struct BatchProcessor<T: Send + 'static> {
    exporter: Arc<dyn Exporter<T>>,
    config: BatchConfig,
    stopped: AtomicBool,
    worker: RwLock<Worker<T>>,
    export_lock: Arc<Mutex<()>>,
    name: &'static str,
}

struct Worker<T> {
    batcher: Arc<Batcher<T>>,
    timer: Arc<Timer>,
    handle: Option<thread::JoinHandle<()>>,
    pid: u32,
}

impl<T: Send + 'static> fmt::Debug for BatchProcessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Send + 'static> BatchProcessor<T> {
    /// Create a processor and start its worker thread. `name` labels the
    /// worker thread and internal log events.
    pub fn new(name: &'static str, exporter: Arc<dyn Exporter<T>>, config: BatchConfig) -> Self {
        let export_lock = Arc::new(Mutex::new(()));
        let worker = Self::spawn_worker(name, &exporter, &config, &export_lock);
        BatchProcessor {
            exporter,
            config,
            stopped: AtomicBool::new(false),
            worker: RwLock::new(worker),
            export_lock,
            name,
        }
    }

    fn spawn_worker(
        name: &'static str,
        exporter: &Arc<dyn Exporter<T>>,
        config: &BatchConfig,
        export_lock: &Arc<Mutex<()>>,
    ) -> Worker<T> {
        let batcher = Arc::new(Batcher::new(config.max_export_batch_size));
        let step_batcher = batcher.clone();
        let step_exporter = exporter.clone();
        let step_lock = export_lock.clone();
        let timer = Arc::new(Timer::new(
            move || export_step(&step_batcher, step_exporter.as_ref(), &step_lock),
            config.scheduled_delay,
        ));

        let timer_for_thread = timer.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || timer_for_thread.run())
            .expect("failed to spawn batch export thread");

        Worker {
            batcher,
            timer,
            handle: Some(handle),
            pid: process::id(),
        }
    }

    /// Called when an item starts. No-op.
    pub fn on_start(&self, _item: &T) {}

    /// Accept a finished item. Silently drops after shutdown.
    pub fn on_end(&self, item: T) {
        if self.stopped.load(Ordering::SeqCst) {
            otel_debug!(name: "BatchProcessor.OnEndAfterShutdown");
            return;
        }

        self.reinitialize_if_forked();

        let worker = self.worker.read().expect("worker lock poisoned");
        if worker.batcher.add(item) {
            worker.timer.notify_sleeper();
        }
    }

    /// Run the export step once, synchronously. Best-effort: always true.
    pub fn force_flush(&self, _timeout: Duration) -> bool {
        let worker = self.worker.read().expect("worker lock poisoned");
        export_step(
            &worker.batcher,
            self.exporter.as_ref(),
            &self.export_lock,
        );
        true
    }

    /// Stop the timer (which performs one final export), join the worker,
    /// drain any remaining batches, and shut the exporter down.
    pub fn shutdown(&self) -> OTelSdkResult {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }

        let (batcher, timer, handle) = {
            let mut worker = self.worker.write().expect("worker lock poisoned");
            (
                worker.batcher.clone(),
                worker.timer.clone(),
                worker.handle.take(),
            )
        };

        timer.stop();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                otel_warn!(name: "BatchProcessor.WorkerPanicked");
            }
        }

        // The final timer invocation drains one batch; more may be queued.
        loop {
            let _guard = self.export_lock.lock().expect("export lock poisoned");
            match batcher.pop() {
                Some(batch) => export_batch(self.exporter.as_ref(), batch),
                None => break,
            }
        }

        self.exporter.shutdown()
    }

    // After a fork the child inherits this struct but no running worker
    // thread. Rebuild Batcher/Timer/worker before the producer call returns;
    // the parent's queued items stay the parent's responsibility.
    fn reinitialize_if_forked(&self) {
        let current_pid = process::id();
        if self.worker.read().expect("worker lock poisoned").pid == current_pid {
            return;
        }

        let mut worker = self.worker.write().expect("worker lock poisoned");
        if worker.pid == current_pid {
            return;
        }
        otel_debug!(name: "BatchProcessor.ReinitializeAfterFork", pid = current_pid);
        // The inherited join handle refers to a thread that does not exist in
        // this process; dropping it detaches.
        worker.handle.take();
        *worker = Self::spawn_worker(self.name, &self.exporter, &self.config, &self.export_lock);
    }
}

impl<T: Send + 'static> Drop for BatchProcessor<T> {
    fn drop(&mut self) {
        if !self.stopped.load(Ordering::SeqCst) {
            let _ = self.shutdown();
        }
    }
}

fn export_step<T>(batcher: &Batcher<T>, exporter: &dyn Exporter<T>, lock: &Mutex<()>) {
    let _guard = lock.lock().expect("export lock poisoned");
    if let Some(batch) = batcher.pop() {
        export_batch(exporter, batch);
    }
}

fn export_batch<T>(exporter: &dyn Exporter<T>, batch: Vec<T>) {
    let count = batch.len();
    if exporter.export(batch) == ExportResult::Failure {
        otel_warn!(name: "BatchProcessor.ExportFailed", dropped_items = count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[derive(Debug, Default)]
    struct RecordingExporter {
        batches: Mutex<Vec<Vec<u32>>>,
        shutdown_called: AtomicBool,
        fail: AtomicBool,
    }

    impl RecordingExporter {
        fn batches(&self) -> Vec<Vec<u32>> {
            self.batches.lock().unwrap().clone()
        }
    }

    impl Exporter<u32> for RecordingExporter {
        fn export(&self, batch: Vec<u32>) -> ExportResult {
            if self.fail.load(Ordering::SeqCst) {
                return ExportResult::Failure;
            }
            self.batches.lock().unwrap().push(batch);
            ExportResult::Success
        }

        fn shutdown(&self) -> OTelSdkResult {
            self.shutdown_called.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn wait_until(deadline: Duration, mut predicate: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if predicate() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        predicate()
    }

    fn config(batch_size: usize, delay: Duration) -> BatchConfig {
        BatchConfig {
            max_export_batch_size: batch_size,
            scheduled_delay: delay,
        }
    }

    #[test]
    fn batcher_signals_on_fill() {
        let batcher = Batcher::new(3);
        assert!(!batcher.add(1));
        assert!(!batcher.add(2));
        assert!(batcher.add(3));
        assert_eq!(batcher.pop(), Some(vec![1, 2, 3]));
        assert_eq!(batcher.pop(), None);
    }

    #[test]
    fn batcher_pop_cuts_partial_items() {
        let batcher = Batcher::new(10);
        batcher.add(1);
        batcher.add(2);
        assert_eq!(batcher.pop(), Some(vec![1, 2]));
        assert_eq!(batcher.pop(), None);
    }

    #[test]
    fn batcher_preserves_fifo_order() {
        let batcher = Batcher::new(2);
        for i in 0..5 {
            batcher.add(i);
        }
        assert_eq!(batcher.pop(), Some(vec![0, 1]));
        assert_eq!(batcher.pop(), Some(vec![2, 3]));
        assert_eq!(batcher.pop(), Some(vec![4]));
        assert_eq!(batcher.pop(), None);
    }

    #[test]
    fn timer_notify_wakes_early() {
        let invocations = Arc::new(AtomicBool::new(false));
        let flag = invocations.clone();
        let timer = Arc::new(Timer::new(
            move || flag.store(true, Ordering::SeqCst),
            Duration::from_secs(600),
        ));
        let run_timer = timer.clone();
        let handle = thread::spawn(move || run_timer.run());

        timer.notify_sleeper();
        assert!(wait_until(Duration::from_secs(5), || invocations
            .load(Ordering::SeqCst)));

        timer.stop();
        handle.join().unwrap();
    }

    #[test]
    fn timer_stop_runs_final_invocation_once() {
        let count = Arc::new(Mutex::new(0u32));
        let counted = count.clone();
        let timer = Timer::new(
            move || *counted.lock().unwrap() += 1,
            Duration::from_secs(600),
        );
        timer.stop();
        timer.stop();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn batch_size_trigger_exports_full_then_remainder() {
        let exporter = Arc::new(RecordingExporter::default());
        let processor = BatchProcessor::new(
            "test.batch",
            exporter.clone(),
            config(24, Duration::from_secs(600)),
        );

        for i in 0..24 {
            processor.on_end(i);
        }
        // the fill notification wakes the worker for the first batch
        assert!(wait_until(Duration::from_secs(5), || !exporter
            .batches()
            .is_empty()));
        for i in 24..36 {
            processor.on_end(i);
        }

        processor.shutdown().unwrap();

        let batches = exporter.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 24);
        assert_eq!(batches[1].len(), 12);
        let all: Vec<u32> = batches.into_iter().flatten().collect();
        assert_eq!(all, (0..36).collect::<Vec<u32>>());
        assert!(exporter.shutdown_called.load(Ordering::SeqCst));
    }

    #[test]
    fn periodic_trigger_exports_on_interval() {
        let exporter = Arc::new(RecordingExporter::default());
        let processor = BatchProcessor::new(
            "test.periodic",
            exporter.clone(),
            config(1000, Duration::from_millis(30)),
        );

        for i in 0..12 {
            processor.on_end(i);
            thread::sleep(Duration::from_millis(10));
        }
        assert!(wait_until(Duration::from_secs(5), || !exporter
            .batches()
            .is_empty()));
        processor.shutdown().unwrap();

        let batches = exporter.batches();
        assert!(batches.len() >= 2, "expected >= 2 exports, got {batches:?}");
        let all: Vec<u32> = batches.into_iter().flatten().collect();
        assert_eq!(all, (0..12).collect::<Vec<u32>>());
    }

    #[test]
    fn shutdown_drains_single_item() {
        let exporter = Arc::new(RecordingExporter::default());
        let processor = BatchProcessor::new(
            "test.drain",
            exporter.clone(),
            config(512, Duration::from_secs(600)),
        );
        processor.on_end(7);
        processor.shutdown().unwrap();
        assert_eq!(exporter.batches(), vec![vec![7]]);
    }

    #[test]
    fn on_end_after_shutdown_drops_silently() {
        let exporter = Arc::new(RecordingExporter::default());
        let processor = BatchProcessor::new(
            "test.after-shutdown",
            exporter.clone(),
            config(512, Duration::from_secs(600)),
        );
        processor.shutdown().unwrap();
        processor.on_end(1);
        assert!(exporter.batches().is_empty());
    }

    #[test]
    fn shutdown_twice_reports_already_shutdown() {
        let exporter = Arc::new(RecordingExporter::default());
        let processor = BatchProcessor::new(
            "test.twice",
            exporter.clone(),
            config(512, Duration::from_secs(600)),
        );
        assert!(processor.shutdown().is_ok());
        assert_eq!(processor.shutdown(), Err(OTelSdkError::AlreadyShutdown));
    }

    #[test]
    fn force_flush_exports_pending_items() {
        let exporter = Arc::new(RecordingExporter::default());
        let processor = BatchProcessor::new(
            "test.flush",
            exporter.clone(),
            config(512, Duration::from_secs(600)),
        );
        processor.on_end(1);
        processor.on_end(2);
        assert!(processor.force_flush(Duration::from_secs(5)));
        assert_eq!(exporter.batches(), vec![vec![1, 2]]);
        processor.shutdown().unwrap();
    }

    #[test]
    fn failed_batches_are_dropped_not_requeued() {
        let exporter = Arc::new(RecordingExporter::default());
        exporter.fail.store(true, Ordering::SeqCst);
        let processor = BatchProcessor::new(
            "test.failure",
            exporter.clone(),
            config(512, Duration::from_secs(600)),
        );
        processor.on_end(1);
        processor.force_flush(Duration::from_secs(5));

        exporter.fail.store(false, Ordering::SeqCst);
        processor.on_end(2);
        processor.shutdown().unwrap();
        // the failed batch containing 1 is gone
        assert_eq!(exporter.batches(), vec![vec![2]]);
    }
}
