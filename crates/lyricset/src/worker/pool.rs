use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info};
use tracing::info_span;

use crate::client::{LookupOutcome, LyricsSource};
use crate::error::{LookupError, WorkerError};
use crate::source::WorkItem;
use crate::worker::job::{CollectionResult, Job};

/// Runs work items against a shared [`LyricsSource`] on a fixed pool of threads.
pub struct Collector {
    source: Arc<dyn LyricsSource>,
    worker_count: usize,
}

impl Collector {
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn new(source: Arc<dyn LyricsSource>, worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");
        Self {
            source,
            worker_count,
        }
    }

    /// Submits every item up front and returns the results as they complete.
    ///
    /// At most `worker_count` lookups run at once; the rest wait in the queue.
    pub fn collect<I>(&self, items: I) -> Result<Collection, WorkerError>
    where
        I: IntoIterator<Item = WorkItem>,
    {
        let jobs: Vec<Job> = items.into_iter().map(Job::new).collect();
        let worker_count = self.worker_count.min(jobs.len());

        let (job_sender, job_receiver) = unbounded::<Job>();
        let (result_sender, result_receiver) = unbounded::<CollectionResult>();

        let remaining = jobs.len();
        for job in jobs {
            // Unbounded and `job_receiver` is still held here, so this cannot fail.
            let _ = job_sender.send(job);
        }
        // Closing the queue lets idle workers exit once it drains.
        drop(job_sender);

        // Built before spawning so a failed spawn still joins earlier workers.
        let mut collection = Collection {
            result_receiver,
            workers: Vec::with_capacity(worker_count),
            shutdown: Arc::new(AtomicBool::new(false)),
            remaining,
        };

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let result_tx = result_sender.clone();
            let shutdown_flag = Arc::clone(&collection.shutdown);
            let source = Arc::clone(&self.source);

            let handle = thread::Builder::new()
                .name(format!("lyricset-worker-{}", worker_id))
                .spawn(move || run_worker(worker_id, job_rx, result_tx, shutdown_flag, source))
                .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

            collection.workers.push(handle);
        }
        drop(result_sender);

        info!(
            "Started {} workers for {} items",
            worker_count, collection.remaining
        );

        Ok(collection)
    }
}

/// Completion-ordered results of one [`Collector::collect`] call.
///
/// Yields exactly one result per submitted item. Dropping it, even
/// part-way through, stops workers from taking new items, lets in-flight
/// lookups finish and joins every worker thread.
pub struct Collection {
    result_receiver: Receiver<CollectionResult>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    remaining: usize,
}

impl Collection {
    /// Number of results not yet yielded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Iterator for Collection {
    type Item = CollectionResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        match self.result_receiver.recv() {
            Ok(result) => {
                self.remaining -= 1;
                Some(result)
            }
            Err(_) => {
                error!(
                    "All workers exited with {} results outstanding",
                    self.remaining
                );
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl Drop for Collection {
    fn drop(&mut self) {
        if self.remaining > 0 {
            info!(
                "Collection dropped with {} results outstanding; stopping workers",
                self.remaining
            );
        }
        self.shutdown.store(true, Ordering::Relaxed);

        for (i, worker) in self.workers.drain(..).enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    result_sender: Sender<CollectionResult>,
    shutdown: Arc<AtomicBool>,
    source: Arc<dyn LyricsSource>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(job) => {
                let _span = info_span!("job", job_id = %job.id, worker_id).entered();
                debug!("Worker {} processing {}", worker_id, job.item);

                let start = Instant::now();
                let outcome = execute_guarded(&job, source.as_ref());
                let result = CollectionResult {
                    job_id: job.id,
                    item: job.item,
                    outcome,
                    worker_id,
                    elapsed: start.elapsed(),
                };

                if let Err(e) = result_sender.send(result) {
                    error!("Worker {} failed to send result: {}", worker_id, e);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job queue drained", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}

/// Runs the lookup, turning a panic into a `Failed` outcome so the worker survives.
fn execute_guarded(job: &Job, source: &dyn LyricsSource) -> LookupOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| job.execute(source))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Lookup for {} panicked: {}", job.item, message);
            LookupOutcome::Failed(LookupError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
