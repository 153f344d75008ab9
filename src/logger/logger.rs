// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use crossbeam_channel::Sender;
use crossbeam_channel::unbounded;
use serde::Serialize;

use crate::logger::FileLoggerBuilder;
use crate::record::Entry;
use crate::record::Level;
use crate::text;
use crate::writer::rotate::RotatingWriter;
use crate::writer::worker::QUANTUM;
use crate::writer::worker::Signals;
use crate::writer::worker::Worker;

const MIN_SHUTDOWN_WAIT: Duration = Duration::from_millis(100);
const FLUSH_WAIT: Duration = Duration::from_millis(500);

/// A handle to a file logger: an ingest queue, its configuration, and one
/// background writer thread.
///
/// A `FileLogger` is an explicitly constructed component, not process-global
/// state; keeping one writer per process is a caller convention. Handles are
/// cheap to clone and share the same writer. Logging calls never block on
/// I/O and never return errors; blocking is confined to [`flush`] and
/// [`shutdown`], both of which wait with a bound.
///
/// When the last handle is dropped, a best-effort shutdown with a short wait
/// runs automatically. Call [`shutdown`] explicitly to control the wait and
/// learn whether all buffered entries were persisted.
///
/// [`flush`]: FileLogger::flush
/// [`shutdown`]: FileLogger::shutdown
///
/// # Examples
///
/// ```
/// use rotolog::FileLogger;
/// use rotolog::Level;
///
/// let dir = tempfile::tempdir().unwrap();
/// let sink = FileLogger::builder()
///     .path(dir.path().join("app.log"))
///     .min_level(Level::Debug)
///     .build()
///     .unwrap();
///
/// let logger = sink.logger("billing");
/// logger.info("charge", "captured payment");
/// logger.log_value(Level::Debug, "charge", &vec![450, 12]);
///
/// assert!(sink.shutdown(std::time::Duration::from_secs(5)));
/// ```
#[derive(Clone, Debug)]
pub struct FileLogger {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    sender: Sender<Entry>,
    signals: Arc<Signals>,
    min_level: AtomicU8,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLogger")
            .field("path", &self.path)
            .field("min_level", &Level::from_u8(self.min_level.load(Ordering::Relaxed)))
            .finish_non_exhaustive()
    }
}

impl FileLogger {
    /// Creates a new [`FileLoggerBuilder`].
    #[must_use]
    pub fn builder() -> FileLoggerBuilder {
        FileLoggerBuilder::new()
    }

    pub(crate) fn start(
        writer: RotatingWriter,
        min_level: Level,
        interval: Duration,
        thread_name: String,
    ) -> FileLogger {
        let path = writer.path().to_path_buf();
        let (sender, receiver) = unbounded();
        let signals = Arc::new(Signals::default());
        let worker = Worker::new(receiver, signals.clone(), writer, interval);
        let handle = worker.make_thread(thread_name);

        FileLogger {
            inner: Arc::new(Inner {
                path,
                sender,
                signals,
                min_level: AtomicU8::new(min_level as u8),
                handle: Mutex::new(Some(handle)),
            }),
        }
    }

    /// The resolved path of the target log file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// The current minimum level.
    pub fn min_level(&self) -> Level {
        Level::from_u8(self.inner.min_level.load(Ordering::Relaxed))
    }

    /// Changes the minimum level, effective for subsequently written entries.
    pub fn set_min_level(&self, level: Level) {
        self.inner.min_level.store(level as u8, Ordering::Relaxed);
    }

    /// Enqueues a string entry verbatim, with no re-encoding.
    ///
    /// Entries below the minimum level are dropped before any work is done.
    pub fn write(&self, level: Level, context: &str, method: &str, message: &str) {
        if level < self.min_level() {
            return;
        }
        self.enqueue(Entry::new(level, context, method, message));
    }

    /// Enqueues an entry whose message is the textual form of `value`, per
    /// [`to_text`](crate::to_text).
    ///
    /// The level filter applies before serialization, so filtered-out calls
    /// pay no serialization cost.
    pub fn write_value<T>(&self, level: Level, context: &str, method: &str, value: &T)
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        if level < self.min_level() {
            return;
        }
        self.enqueue(Entry::new(level, context, method, text::to_text(value)));
    }

    /// Creates a [`Logger`] facade bound to a context.
    pub fn logger(&self, context: impl Into<String>) -> Logger {
        Logger {
            context: context.into(),
            sink: self.clone(),
        }
    }

    /// Requests an out-of-band append cycle and waits a short fixed time for
    /// it to complete.
    ///
    /// Returns `true` once an append cycle that observed this request has
    /// finished, so entries enqueued before the call are persisted; `false`
    /// if the wait elapsed first. A cycle already in flight when the request
    /// is made cannot satisfy the wait.
    pub fn flush(&self) -> bool {
        let signals = &self.inner.signals;
        let target = signals.flush_requests.fetch_add(1, Ordering::AcqRel) + 1;

        let deadline = Instant::now() + FLUSH_WAIT;
        while signals.flush_acknowledged.load(Ordering::Acquire) < target {
            if signals.stopped.load(Ordering::Acquire) {
                // The writer already drained everything on its way out.
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(QUANTUM);
        }
        true
    }

    /// Signals the writer to drain and stop, waiting up to `max_wait` (with a
    /// floor of 100 ms) for it to finish.
    ///
    /// Returns `true` if the writer flushed all buffered entries and stopped
    /// in time; the worker thread is then joined. On `false` the writer keeps
    /// running in the background to finish eventually, but the caller is not
    /// blocked further.
    pub fn shutdown(&self, max_wait: Duration) -> bool {
        let signals = &self.inner.signals;
        signals.shutdown.store(true, Ordering::Release);

        let deadline = Instant::now() + max_wait.max(MIN_SHUTDOWN_WAIT);
        while !signals.stopped.load(Ordering::Acquire) {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(QUANTUM);
        }

        if let Ok(mut handle) = self.inner.handle.lock() {
            if let Some(handle) = handle.take() {
                let _ = handle.join();
            }
        }
        true
    }

    fn enqueue(&self, entry: Entry) {
        // The channel only disconnects once the worker has exited; entries
        // written after shutdown are dropped.
        let _ = self.inner.sender.send(entry);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.signals.shutdown.store(true, Ordering::Release);

        let deadline = Instant::now() + MIN_SHUTDOWN_WAIT;
        while !self.signals.stopped.load(Ordering::Acquire) {
            if Instant::now() >= deadline {
                return;
            }
            std::thread::sleep(QUANTUM);
        }
        if let Ok(mut handle) = self.handle.lock() {
            if let Some(handle) = handle.take() {
                let _ = handle.join();
            }
        }
    }
}

/// A per-call-site facade bound to a fixed context, typically a module or
/// type name.
///
/// # Examples
///
/// ```
/// use rotolog::FileLogger;
///
/// let dir = tempfile::tempdir().unwrap();
/// let sink = FileLogger::builder()
///     .path(dir.path().join("app.log"))
///     .build()
///     .unwrap();
///
/// let logger = sink.logger("payments::gateway");
/// logger.warning("authorize", "issuer latency above 2s");
/// # sink.shutdown(std::time::Duration::from_secs(1));
/// ```
#[derive(Clone, Debug)]
pub struct Logger {
    context: String,
    sink: FileLogger,
}

impl Logger {
    /// The context this facade was bound to.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Writes a string entry at the given level.
    pub fn log(&self, level: Level, method: &str, message: &str) {
        self.sink.write(level, &self.context, method, message);
    }

    /// Writes an entry whose message is the textual form of `value`.
    pub fn log_value<T>(&self, level: Level, method: &str, value: &T)
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        self.sink.write_value(level, &self.context, method, value);
    }

    /// Writes a [`Level::Verbose`] entry.
    pub fn verbose(&self, method: &str, message: &str) {
        self.log(Level::Verbose, method, message);
    }

    /// Writes a [`Level::Debug`] entry.
    pub fn debug(&self, method: &str, message: &str) {
        self.log(Level::Debug, method, message);
    }

    /// Writes a [`Level::Information`] entry.
    pub fn info(&self, method: &str, message: &str) {
        self.log(Level::Information, method, message);
    }

    /// Writes a [`Level::Warning`] entry.
    pub fn warning(&self, method: &str, message: &str) {
        self.log(Level::Warning, method, message);
    }

    /// Writes a [`Level::Error`] entry.
    pub fn error(&self, method: &str, message: &str) {
        self.log(Level::Error, method, message);
    }

    /// Writes a [`Level::Fatal`] entry.
    pub fn fatal(&self, method: &str, message: &str) {
        self.log(Level::Fatal, method, message);
    }
}
