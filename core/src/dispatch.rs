//! A fixed pool of workers running scan units through the engine.
//!
//! Workers share one queue and report nothing back but a completion count.
//! Outcomes live on disk: a unit that failed has no artifact, which is all the
//! aggregator needs to know.

use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{error, warn};

use portwatch_common::audit;
use portwatch_common::error::EngineError;
use portwatch_common::models::unit::ScanUnit;

use crate::engine::ScanEngine;

type Progress = Arc<dyn Fn(&ScanUnit, usize) + Send + Sync>;

/// Counts finished units and lets one thread wait for a target count.
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    done: Mutex<usize>,
    cvar: Condvar,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arrive(&self) {
        let mut done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        *done += 1;
        self.cvar.notify_all();
    }

    /// Blocks until at least `expected` arrivals have happened.
    pub fn wait_for(&self, expected: usize) {
        let done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        let _done = self
            .cvar
            .wait_while(done, |done| *done < expected)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub completed: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn succeeded(&self) -> usize {
        self.completed - self.failed
    }
}

pub struct Dispatcher {
    engine: Arc<dyn ScanEngine>,
    workers: usize,
    timeout: Option<Duration>,
    on_progress: Option<Progress>,
}

impl Dispatcher {
    pub fn new(engine: Arc<dyn ScanEngine>, workers: usize) -> Self {
        Self {
            engine,
            workers: workers.max(1),
            timeout: None,
            on_progress: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Called from the worker thread after each unit, with the number of
    /// units finished so far.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ScanUnit, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Runs every unit exactly once and returns when all of them finished.
    pub fn run(&self, units: &[ScanUnit]) -> DispatchSummary {
        let (tx, rx) = mpsc::channel::<ScanUnit>();
        let queue = Arc::new(Mutex::new(rx));
        let barrier = Arc::new(CompletionBarrier::new());
        let failed = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        let mut started = 0;
        for id in 0..self.workers {
            let worker = Worker {
                id,
                queue: Arc::clone(&queue),
                engine: Arc::clone(&self.engine),
                barrier: Arc::clone(&barrier),
                failed: Arc::clone(&failed),
                finished: Arc::clone(&finished),
                timeout: self.timeout,
                on_progress: self.on_progress.clone(),
            };
            // Workers exit on their own once the queue is closed.
            let spawned = thread::Builder::new()
                .name(format!("scan-worker-{id}"))
                .spawn(move || worker.run());
            match spawned {
                Ok(_) => started += 1,
                Err(e) => error!("Failed to start scan worker {id}: {e}"),
            }
        }

        if started == 0 {
            error!("No scan worker could be started, {} units not run", units.len());
            return DispatchSummary {
                completed: units.len(),
                failed: units.len(),
            };
        }

        for unit in units {
            // The queue's receiver is owned here as well, so sending cannot fail.
            let _ = tx.send(unit.clone());
        }
        drop(tx);

        barrier.wait_for(units.len());

        DispatchSummary {
            completed: units.len(),
            failed: failed.load(Ordering::SeqCst),
        }
    }
}

struct Worker {
    id: usize,
    queue: Arc<Mutex<Receiver<ScanUnit>>>,
    engine: Arc<dyn ScanEngine>,
    barrier: Arc<CompletionBarrier>,
    failed: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
    timeout: Option<Duration>,
    on_progress: Option<Progress>,
}

impl Worker {
    fn run(self) {
        loop {
            let next = {
                let queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
                queue.recv()
            };
            let Ok(unit) = next else {
                break;
            };

            let _arrival = Arrival(&self.barrier);
            self.process(&unit);
        }
    }

    fn process(&self, unit: &ScanUnit) {
        if let Err(e) = self.execute(unit) {
            error!("Scan of {unit} failed on worker {}: {e}", self.id);
            audit::record(format!("Scan of {} failed: {e}", unit.target));
            self.failed.fetch_add(1, Ordering::SeqCst);
            discard_artifact(unit);
        }

        let done = self.finished.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(callback) = &self.on_progress {
            let reported = panic::catch_unwind(AssertUnwindSafe(|| callback(unit, done)));
            if reported.is_err() {
                warn!("Progress callback panicked for {unit}");
            }
        }
    }

    fn execute(&self, unit: &ScanUnit) -> Result<(), EngineError> {
        discard_artifact(unit);

        panic::catch_unwind(AssertUnwindSafe(|| {
            audit::record(self.engine.command_line(unit));
            self.engine.run(unit, self.timeout)
        }))
        .unwrap_or_else(|_| Err(EngineError::Wait(io::Error::other("engine panicked"))))
    }
}

/// Signals the barrier when dropped, so a unit counts as finished even if its
/// worker unwinds.
struct Arrival<'a>(&'a CompletionBarrier);

impl Drop for Arrival<'_> {
    fn drop(&mut self) {
        self.0.arrive();
    }
}

/// Removes a unit's artifact so a stale or partial file is never aggregated.
fn discard_artifact(unit: &ScanUnit) {
    match fs::remove_file(&unit.artifact) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Unable to remove {}: {e}", unit.artifact.display()),
    }
}
