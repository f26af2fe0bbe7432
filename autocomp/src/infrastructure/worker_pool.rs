// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worker Pool (§4.O)
//!
//! A bounded pool of `std::thread`s draining a `crossbeam_channel` job
//! queue. The server owns two independent instances — the request pool
//! runs the file pipeline (K), the transmission pool runs the send loop
//! (L) — so compression-bound work on one connection can never starve
//! socket-draining on another (§4.O: "this separation keeps
//! compression-bound work from starving socket-draining").

use crossbeam::channel::{bounded, Sender};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Queue depth per worker thread. The queue is bounded (§4.O: "bounded queue
/// of jobs") so a pool that falls behind applies backpressure to whoever is
/// submitting — the acceptor (N), for the request pool — rather than letting
/// unbounded work pile up in memory.
const QUEUE_DEPTH_PER_WORKER: usize = 16;

/// A fixed-size pool of worker threads sharing one bounded job queue.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` worker threads, each looping on the shared queue until
    /// it is closed. `size` is typically `hardware_concurrency` (§4.O),
    /// resolved by the caller via [`autocomp_bootstrap::platform::Platform::cpu_count`].
    pub fn new(size: usize, name: &str) -> Self {
        assert!(size > 0, "worker pool size must be at least 1");
        let (sender, receiver) = bounded::<Job>(size * QUEUE_DEPTH_PER_WORKER);

        let workers = (0..size)
            .map(|i| {
                let receiver = receiver.clone();
                std::thread::Builder::new()
                    .name(format!("{name}-{i}"))
                    .spawn(move || {
                        for job in receiver {
                            job();
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self { sender: Some(sender), workers }
    }

    /// Enqueues a job for the next free worker, blocking the caller while the
    /// queue is full so a pool that falls behind pushes back on whoever is
    /// submitting. Panics if the pool has already been shut down — submitting
    /// after shutdown is a programming error, not a runtime condition callers
    /// are expected to recover from.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        self.sender
            .as_ref()
            .expect("submit called after worker pool shutdown")
            .send(Box::new(job))
            .expect("worker pool receiver dropped before sender");
    }

    /// Closes the job queue and blocks until every worker has drained it and
    /// exited (§4.P: "shut request pool (joins workers)").
    pub fn shutdown(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_submitted_jobs() {
        let pool = WorkerPool::new(2, "test-pool");
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let counter = counter.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        drop(pool);
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    #[should_panic(expected = "submit called after worker pool shutdown")]
    fn submit_after_shutdown_panics() {
        let mut pool = WorkerPool::new(1, "test-pool-2");
        pool.shutdown();
        pool.submit(|| {});
    }
}
