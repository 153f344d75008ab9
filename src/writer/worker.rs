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

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use crossbeam_channel::Receiver;

use crate::record::Entry;
use crate::writer::rotate::RotatingWriter;

/// How long the worker sleeps between wakes. Bounds both shutdown latency and
/// the staleness of a pending flush, independently of the buffering interval.
pub(crate) const QUANTUM: Duration = Duration::from_millis(25);

/// Flags shared between the worker thread and the logger handles.
#[derive(Debug, Default)]
pub(crate) struct Signals {
    /// Cooperative cancellation, observed between quanta.
    pub(crate) shutdown: AtomicBool,
    /// Set once by the worker after its final flush.
    pub(crate) stopped: AtomicBool,
    /// Count of out-of-band flush requests issued by logger handles.
    pub(crate) flush_requests: AtomicU64,
    /// The highest request count the worker had observed before starting its
    /// most recent completed append cycle. A waiter whose request number is
    /// acknowledged here knows a cycle began after its request, so entries
    /// it enqueued beforehand were drained into that cycle.
    pub(crate) flush_acknowledged: AtomicU64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum WorkerState {
    Running,
    Draining,
    Stopped,
}

/// The single background worker. Drains the ingest queue on a fixed cadence,
/// rotates the target file when oversized, and appends batches until shutdown
/// has been observed and the queue is empty.
pub(crate) struct Worker {
    receiver: Receiver<Entry>,
    signals: Arc<Signals>,
    writer: RotatingWriter,
    interval: Duration,
    pending: Vec<Entry>,
    last_flush: Instant,
}

impl Worker {
    pub(crate) fn new(
        receiver: Receiver<Entry>,
        signals: Arc<Signals>,
        writer: RotatingWriter,
        interval: Duration,
    ) -> Worker {
        Worker {
            receiver,
            signals,
            writer,
            interval,
            pending: Vec::new(),
            last_flush: Instant::now(),
        }
    }

    pub(crate) fn make_thread(mut self, name: String) -> std::thread::JoinHandle<()> {
        std::thread::Builder::new()
            .name(name)
            .spawn(move || self.run())
            .expect("failed to spawn the rotolog writer thread")
    }

    fn run(mut self) {
        self.writer.append(&[Entry::internal("start logging")]);

        let mut state = WorkerState::Running;
        while state != WorkerState::Stopped {
            std::thread::sleep(QUANTUM);
            state = self.turn(state);
        }

        self.writer.append(&[Entry::internal("stop logging")]);
        self.signals.stopped.store(true, Ordering::Release);
    }

    /// One wake of the loop: drain the queue into the pending batch, run an
    /// append cycle if one is due, and advance the state machine.
    fn turn(&mut self, state: WorkerState) -> WorkerState {
        let state = if self.signals.shutdown.load(Ordering::Acquire) {
            WorkerState::Draining
        } else {
            state
        };

        // Read the request count before draining: an entry enqueued before a
        // flush request (or shutdown) is then guaranteed into this cycle.
        let requested = self.signals.flush_requests.load(Ordering::Acquire);
        let flush_due = requested > self.signals.flush_acknowledged.load(Ordering::Acquire);
        let interval_due = self.last_flush.elapsed() >= self.interval;

        while let Ok(entry) = self.receiver.try_recv() {
            self.pending.push(entry);
        }

        if flush_due || interval_due || state == WorkerState::Draining {
            if !self.pending.is_empty() {
                self.writer.append(&self.pending);
                self.pending.clear();
            }
            // Acknowledge only the requests observed before the drain;
            // later requests stay pending for the next cycle.
            self.signals.flush_acknowledged.store(requested, Ordering::Release);
            self.last_flush = Instant::now();
        }

        if state == WorkerState::Draining && self.pending.is_empty() && self.receiver.is_empty() {
            WorkerState::Stopped
        } else {
            state
        }
    }
}
