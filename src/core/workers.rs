//! Background worker pool for thumbnail strip generation.
//!
//! Jobs are pushed to a shared `Injector` and picked up by whichever
//! worker is free. Gesture resolution never runs here: the pool only
//! hosts work whose results come back over channels polled by the
//! owning thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::deque::Injector;
use log::{trace, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Idle poll interval of a worker with nothing to do.
const IDLE_SLEEP: Duration = Duration::from_millis(2);

/// How long `Drop` waits for running jobs before detaching threads.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    /// Jobs queued or running.
    in_flight: Arc<AtomicUsize>,
}

impl Workers {
    /// Spawn `num_threads` workers (at least one).
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::with_capacity(num_threads);

        for worker_id in 0..num_threads {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let in_flight = Arc::clone(&in_flight);

            let spawned = thread::Builder::new()
                .name(format!("trimrange-worker-{}", worker_id))
                .spawn(move || {
                    trace!("Worker {} started", worker_id);
                    loop {
                        if let Some(job) = injector.steal().success() {
                            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                                warn!("Worker {}: job panicked", worker_id);
                            }
                            in_flight.fetch_sub(1, Ordering::AcqRel);
                            continue;
                        }
                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        thread::sleep(IDLE_SLEEP);
                    }
                    trace!("Worker {} stopped", worker_id);
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => warn!("Failed to spawn worker {}: {}", worker_id, e),
            }
        }

        trace!("Workers initialized: {} threads", handles.len());

        Self {
            injector,
            handles,
            shutdown,
            in_flight,
        }
    }

    /// Pool sized for background media work: a quarter of the cores,
    /// between one and two threads.
    pub fn for_media() -> Self {
        Self::new((num_cpus::get() / 4).clamp(1, 2))
    }

    pub fn num_threads(&self) -> usize {
        self.handles.len()
    }

    /// Queue a job. Runs on a worker thread, no return value: send
    /// results back over a channel.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.injector.push(Box::new(f));
    }

    /// Jobs queued or still running.
    pub fn pending(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);
        self.shutdown.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        for handle in std::mem::take(&mut self.handles) {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, detaching remaining workers");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }
        trace!("All {} workers stopped", num_threads);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_jobs_run_on_workers() {
        let workers = Workers::new(2);
        let (tx, rx) = unbounded();
        for i in 0..8 {
            let tx = tx.clone();
            workers.execute(move || {
                let _ = tx.send(i);
            });
        }
        let mut got: Vec<i32> = (0..8)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        got.sort();
        assert_eq!(got, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_threads_still_spawns_one() {
        let workers = Workers::new(0);
        assert_eq!(workers.num_threads(), 1);
    }

    #[test]
    fn test_panicking_job_keeps_worker_alive() {
        let workers = Workers::new(1);
        workers.execute(|| panic!("job failed"));
        let (tx, rx) = unbounded();
        workers.execute(move || {
            let _ = tx.send(7);
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }

    #[test]
    fn test_pending_drains() {
        let workers = Workers::new(1);
        let (tx, rx) = unbounded();
        workers.execute(move || {
            let _ = tx.send(());
        });
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while workers.pending() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(workers.pending(), 0);
    }
}
