//! Fixed-size worker pool fed by a single FIFO job queue.
//!
//! Workers cycle idle -> running -> idle until [`ThreadPool::stop`].
//! Completion is tracked with an in-flight counter kept under the same
//! lock as the queue, so "queue empty and nothing running" is observed
//! atomically and [`ThreadPool::wait_idle`] cannot return while the last
//! dequeued job is still executing.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Number of hardware execution units, or 1 if it cannot be queried.
pub fn hardware_concurrency() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or_else(|err| {
            log::warn!("Could not query hardware concurrency ({}), assuming 1", err);
            1
        })
}

#[derive(Default)]
struct State {
    jobs: VecDeque<Job>,
    in_flight: usize,
    panicked: usize,
    terminate: bool,
}

impl State {
    fn is_idle(&self) -> bool {
        self.jobs.is_empty() && self.in_flight == 0
    }
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    /// Signalled when a job is queued or on shutdown
    job_available: Condvar,
    /// Signalled when the pool becomes idle
    drained: Condvar,
}

/// Fixed set of worker threads consuming a shared job queue.
pub struct ThreadPool {
    num_threads: usize,
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Create a pool of `requested` workers, clamped to the hardware
    /// concurrency. Threads are not spawned until [`ThreadPool::start`].
    pub fn new(requested: usize) -> Self {
        Self::with_limit(requested, hardware_concurrency())
    }

    fn with_limit(requested: usize, limit: usize) -> Self {
        let num_threads = if requested > limit {
            log::warn!(
                "Requested {} worker threads, limiting to the {} available hardware threads",
                requested,
                limit
            );
            limit
        } else {
            requested.max(1)
        };

        Self {
            num_threads,
            shared: Arc::new(Shared::default()),
            workers: Vec::with_capacity(num_threads),
        }
    }

    /// Number of worker threads this pool runs.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Spawn the workers. Calling it on a running pool does nothing.
    pub fn start(&mut self) -> std::io::Result<()> {
        if !self.workers.is_empty() {
            log::warn!("Thread pool already started");
            return Ok(());
        }

        for index in 0..self.num_threads {
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name(format!("lumen-worker-{}", index))
                .spawn(move || worker_loop(index, &shared))?;
            self.workers.push(handle);
        }
        log::debug!("Started {} worker threads", self.num_threads);
        Ok(())
    }

    /// Queue a job and wake one idle worker.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let queued = {
            let mut state = self.shared.state.lock();
            state.jobs.push_back(Box::new(job));
            state.jobs.len()
        };
        log::trace!("Job submitted, {} queued", queued);
        self.shared.job_available.notify_one();
    }

    /// Ask every worker to exit after its current job and join them all.
    ///
    /// Jobs still queued are left in the queue, so callers should wait
    /// for [`ThreadPool::wait_idle`] first.
    pub fn stop(&mut self) {
        self.shared.state.lock().terminate = true;
        self.shared.job_available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Worker thread exited abnormally");
            }
        }

        let mut state = self.shared.state.lock();
        state.terminate = false;
        if !state.jobs.is_empty() {
            log::warn!("Thread pool stopped with {} queued jobs", state.jobs.len());
        }
    }

    /// True while the queue holds jobs. Jobs already picked up by a
    /// worker do not count; use [`ThreadPool::is_idle`] for that.
    pub fn busy(&self) -> bool {
        !self.shared.state.lock().jobs.is_empty()
    }

    /// Snapshot of queued jobs not yet picked up. Progress reporting only.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().jobs.len()
    }

    /// Jobs currently executing on a worker.
    pub fn in_flight(&self) -> usize {
        self.shared.state.lock().in_flight
    }

    /// Jobs that panicked since the pool was created.
    pub fn panicked_jobs(&self) -> usize {
        self.shared.state.lock().panicked
    }

    /// True when the queue is empty and no job is executing.
    pub fn is_idle(&self) -> bool {
        self.shared.state.lock().is_idle()
    }

    /// Block until the queue is empty and no job is executing.
    ///
    /// Never returns if jobs are queued on a pool that was not started.
    pub fn wait_idle(&self) {
        let mut state = self.shared.state.lock();
        while !state.is_idle() {
            self.shared.drained.wait(&mut state);
        }
    }

    /// Like [`ThreadPool::wait_idle`] but gives up after `timeout`.
    /// Returns whether the pool is idle.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while !state.is_idle() {
            if self.shared.drained.wait_until(&mut state, deadline).timed_out() {
                return state.is_idle();
            }
        }
        true
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.stop();
        }
    }
}

fn worker_loop(index: usize, shared: &Shared) {
    log::trace!("Worker {} started", index);
    loop {
        let job = {
            let mut state = shared.state.lock();
            while state.jobs.is_empty() && !state.terminate {
                shared.job_available.wait(&mut state);
            }
            if state.terminate {
                break;
            }
            let Some(job) = state.jobs.pop_front() else {
                continue;
            };
            state.in_flight += 1;
            job
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(job));

        let mut state = shared.state.lock();
        state.in_flight -= 1;
        if outcome.is_err() {
            state.panicked += 1;
            log::error!("Job panicked on worker {}", index);
        }
        if state.is_idle() {
            shared.drained.notify_all();
        }
    }
    log::trace!("Worker {} exiting", index);
}
