//! Thread-backed schedulers with an explicit lifecycle.
//!
//! Both schedulers here are constructed by the caller and torn down with an
//! explicit, idempotent `shutdown` (also run on drop as a safety net). A job
//! that panics kills the thread it ran on; the next `execute` on that
//! scheduler then fails loudly, per the fatal-fault contract of
//! [`Scheduler`].
//!
//! `shutdown` joins worker threads and must not be called from a job running
//! on the scheduler itself.

use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;
use std::thread::JoinHandle;
use tracing::debug;

use super::types::{Job, Scheduler};

/// A single named worker thread draining jobs in submission order.
///
/// Serializes execution, which makes it a correct observation scheduler:
/// callbacks delivered through it are strictly ordered and non-overlapping.
pub struct WorkerScheduler {
    name: String,
    sender: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerScheduler {
    /// Spawn the worker thread. The thread is named `rivulet-{name}`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let (sender, receiver) = unbounded::<Job>();
        let worker = std::thread::Builder::new()
            .name(format!("rivulet-{name}"))
            .spawn(move || {
                for job in receiver {
                    job();
                }
            })
            .expect("failed to spawn scheduler thread");
        debug!(scheduler = %name, "worker scheduler started");

        Self {
            name,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Close the job channel, drain outstanding jobs, and join the worker.
    /// Idempotent.
    pub fn shutdown(&self) {
        drop(self.sender.lock().take());
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
            debug!(scheduler = %self.name, "worker scheduler shut down");
        }
    }
}

impl Scheduler for WorkerScheduler {
    fn execute(&self, job: Job) {
        let guard = self.sender.lock();
        let sender = guard.as_ref().expect("scheduler used after shutdown");
        sender.send(job).expect("scheduler worker thread is gone");
    }
}

impl Drop for WorkerScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A fixed-size pool of named threads sharing one job channel.
///
/// Does NOT serialize execution: two jobs may run concurrently, so consumer
/// callback ordering is not preserved and the engine's terminal guards
/// degrade to advisory fast-fail checks. Fit for the subscription context;
/// use a [`WorkerScheduler`] for observation when ordering matters.
pub struct PoolScheduler {
    name: String,
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl PoolScheduler {
    /// Spawn `threads` workers (minimum one), named `rivulet-{name}-{i}`.
    pub fn new(name: impl Into<String>, threads: usize) -> Self {
        let name = name.into();
        let threads = threads.max(1);
        let (sender, receiver) = unbounded::<Job>();

        let mut workers = Vec::with_capacity(threads);
        for i in 0..threads {
            let receiver = receiver.clone();
            let handle = std::thread::Builder::new()
                .name(format!("rivulet-{name}-{i}"))
                .spawn(move || {
                    for job in receiver {
                        job();
                    }
                })
                .expect("failed to spawn scheduler thread");
            workers.push(handle);
        }
        debug!(scheduler = %name, threads, "pool scheduler started");

        Self {
            name,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// Close the job channel, drain outstanding jobs, and join every worker.
    /// Idempotent.
    pub fn shutdown(&self) {
        drop(self.sender.lock().take());
        for handle in self.workers.lock().drain(..) {
            let _ = handle.join();
        }
        debug!(scheduler = %self.name, "pool scheduler shut down");
    }
}

impl Scheduler for PoolScheduler {
    fn execute(&self, job: Job) {
        let guard = self.sender.lock();
        let sender = guard.as_ref().expect("scheduler used after shutdown");
        sender.send(job).expect("scheduler worker threads are gone");
    }
}

impl Drop for PoolScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
