//! Order-preserving worker pool.
//!
//! This module provides a fixed-size pool of worker threads that executes a
//! user-supplied function on submitted jobs and hands results back to the
//! consumer in exact submission order, even when workers finish out of order.
//!
//! # Architecture
//!
//! ```text
//! submit ──> ┌─────────┐  pull   ┌───────────┐  flush  ┌───────────┐ ──> poll_result
//!            │ pending │ ──────> │ in-flight │ ──────> │ completed │
//!            └─────────┘         └───────────┘         └───────────┘
//!                 ^                    ^
//!            FIFO of waiting      reorder buffer: a job's position is
//!            jobs                 fixed the instant it leaves pending
//! ```
//!
//! All three queues live behind a single mutex. A worker pops the head of
//! `pending` and appends it to the tail of `in-flight` in the same critical
//! section; since `pending` is FIFO and all dequeues are serialized by that
//! lock, the relative order of jobs in `in-flight` always equals their
//! submission order. The work function then runs with the lock released.
//! When it returns, the worker marks its slot done and moves the contiguous
//! done-prefix of `in-flight` to `completed`, so `completed` only ever holds
//! results in submission order.
//!
//! Idle workers poll on a timed sleep (default 10 ms) rather than blocking
//! on a condition variable; wakeup latency is bounded by the poll interval.
//!
//! # Head-of-line blocking
//!
//! A slow or hung work function holds back the results of every
//! later-submitted job, even ones that already finished. There is no
//! per-job timeout or cancellation; callers that need a failure policy must
//! implement it inside the work function or by inspecting payloads after
//! retrieval.
//!
//! # Example
//!
//! ```
//! use seqpool_lib::pool::OrderedPool;
//!
//! # fn main() -> seqpool_lib::errors::Result<()> {
//! let mut pool = OrderedPool::new(4, |_worker_id, n: &mut u64| *n *= 2)?;
//! pool.start()?;
//! for n in 0..100 {
//!     pool.submit(n)?;
//! }
//! pool.close();
//!
//! let mut results = Vec::new();
//! while !pool.is_complete() {
//!     match pool.poll_result() {
//!         Some(n) => results.push(n),
//!         None => std::thread::sleep(std::time::Duration::from_millis(1)),
//!     }
//! }
//! pool.shutdown()?;
//! assert_eq!(results, (0..100).map(|n| n * 2).collect::<Vec<_>>());
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::errors::{Result, SeqpoolError};

/// Sleep duration for idle workers between polls of the pending queue.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A job waiting to be picked up by a worker.
struct PendingJob<T> {
    seq: u64,
    payload: T,
}

/// A slot in the reorder buffer. The payload is taken out while the work
/// function runs and put back when the job completes.
struct InFlightSlot<T> {
    seq: u64,
    done: bool,
    payload: Option<T>,
}

/// Everything the lock guards: the three queues plus the lifecycle flags.
struct PoolState<T> {
    pending: VecDeque<PendingJob<T>>,
    in_flight: VecDeque<InFlightSlot<T>>,
    completed: VecDeque<T>,
    /// Set once by the controller when no more jobs will be submitted.
    closed: bool,
    /// Set once a worker observes `closed` with an empty in-flight queue.
    /// Monotonic: never cleared after being set.
    drained: bool,
    /// Sequence number assigned to the next submitted job.
    next_seq: u64,
    /// Idle-poll sleep duration, read by workers under the lock.
    poll_interval: Duration,
}

/// State shared between the controller and all workers.
struct Shared<T> {
    state: Mutex<PoolState<T>>,
    work_fn: Box<dyn Fn(usize, &mut T) + Send + Sync>,
}

/// Read-only snapshot of the pool's queues and flags, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of worker threads the pool was configured with.
    pub workers: usize,
    /// Jobs not yet picked up by a worker.
    pub pending: usize,
    /// Jobs executing or finished but held back by an earlier unfinished job.
    pub in_flight: usize,
    /// Results ready for retrieval.
    pub completed: usize,
    /// Whether submission has been closed.
    pub closed: bool,
    /// Whether all workers have finished and the in-flight queue is empty.
    pub drained: bool,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "workers={} pending={} in_flight={} completed={} closed={} drained={}",
            self.workers, self.pending, self.in_flight, self.completed, self.closed, self.drained
        )
    }
}

/// A fixed pool of worker threads that preserves submission order.
///
/// Jobs of type `T` are submitted by the controller, executed by workers via
/// the work function, and retrieved with [`poll_result`](Self::poll_result)
/// in submission order. Ownership of the payload moves into the pool at
/// submit and back out at retrieval.
///
/// Lifecycle: construct, [`start`](Self::start), submit any number of jobs
/// (before or after `start`), [`close`](Self::close), poll until
/// [`is_complete`](Self::is_complete), then [`shutdown`](Self::shutdown).
pub struct OrderedPool<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    workers: Vec<JoinHandle<()>>,
    worker_count: usize,
    started: bool,
}

impl<T: Send + 'static> OrderedPool<T> {
    /// Create a pool with `worker_count` threads running `work_fn`.
    ///
    /// The work function receives the worker index and a mutable reference
    /// to the job payload; it runs with no lock held and may block
    /// arbitrarily long. It must not panic: a panicking work function
    /// permanently stalls result delivery for all later jobs.
    ///
    /// No threads are spawned until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`SeqpoolError::InvalidParameter`] if `worker_count` is zero.
    pub fn new<F>(worker_count: usize, work_fn: F) -> Result<Self>
    where
        F: Fn(usize, &mut T) + Send + Sync + 'static,
    {
        if worker_count == 0 {
            return Err(SeqpoolError::InvalidParameter {
                parameter: "worker_count".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    pending: VecDeque::new(),
                    in_flight: VecDeque::new(),
                    completed: VecDeque::new(),
                    closed: false,
                    drained: false,
                    next_seq: 0,
                    poll_interval: DEFAULT_POLL_INTERVAL,
                }),
                work_fn: Box::new(work_fn),
            }),
            workers: Vec::new(),
            worker_count,
            started: false,
        })
    }

    /// Set the idle-poll sleep duration (default 10 ms).
    #[must_use]
    pub fn with_poll_interval(self, interval: Duration) -> Self {
        self.shared.state.lock().poll_interval = interval;
        self
    }

    /// Spawn the worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`SeqpoolError::PoolAlreadyStarted`] on a second call, or
    /// [`SeqpoolError::WorkerSpawn`] if the OS refuses a thread. Spawn
    /// failure is fatal: already-running workers are wound down (draining
    /// any jobs submitted so far) before the error is returned, and the
    /// pool cannot be restarted.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(SeqpoolError::PoolAlreadyStarted);
        }
        self.started = true;
        for worker_id in 0..self.worker_count {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("seqpool-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, &shared));
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(source) => {
                    self.close();
                    for handle in self.workers.drain(..) {
                        let _ = handle.join();
                    }
                    return Err(SeqpoolError::WorkerSpawn { source });
                }
            }
        }
        Ok(())
    }

    /// Append a job to the pending queue.
    ///
    /// May be called before or after [`start`](Self::start), from any
    /// thread holding a reference to the pool.
    ///
    /// # Errors
    ///
    /// Returns [`SeqpoolError::SubmitAfterClose`] once [`close`](Self::close)
    /// has been called.
    pub fn submit(&self, payload: T) -> Result<()> {
        let mut state = self.shared.state.lock();
        if state.closed {
            return Err(SeqpoolError::SubmitAfterClose);
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.pending.push_back(PendingJob { seq, payload });
        Ok(())
    }

    /// Declare that no more jobs will be submitted. Idempotent.
    pub fn close(&self) {
        self.shared.state.lock().closed = true;
    }

    /// Pop the next result in submission order, if one is ready.
    #[must_use]
    pub fn poll_result(&self) -> Option<T> {
        self.shared.state.lock().completed.pop_front()
    }

    /// Whether submission is closed and no job remains pending or in flight.
    ///
    /// Results may still be waiting in the completed queue; see
    /// [`is_complete`](Self::is_complete) for the consumer's termination test.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.shared.state.lock().drained
    }

    /// Whether the pool is drained *and* every result has been retrieved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let state = self.shared.state.lock();
        state.closed && state.drained && state.pending.is_empty() && state.completed.is_empty()
    }

    /// Number of jobs not yet picked up by a worker. Diagnostic only.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Number of results ready for retrieval. Diagnostic only.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.shared.state.lock().completed.len()
    }

    /// Capture a consistent snapshot of queue sizes and flags.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let state = self.shared.state.lock();
        PoolStatus {
            workers: self.worker_count,
            pending: state.pending.len(),
            in_flight: state.in_flight.len(),
            completed: state.completed.len(),
            closed: state.closed,
            drained: state.drained,
        }
    }

    /// Join all worker threads and release the pool's resources.
    ///
    /// # Errors
    ///
    /// Returns [`SeqpoolError::ShutdownBeforeDrain`] unless
    /// [`is_drained`](Self::is_drained) is already true; mid-flight
    /// cancellation is not supported.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.is_drained() {
            return Err(SeqpoolError::ShutdownBeforeDrain);
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        Ok(())
    }
}

impl<T: Send + 'static> Drop for OrderedPool<T> {
    fn drop(&mut self) {
        // Close submission so idle workers stop polling, then wait for them.
        // Workers finish any jobs still pending before exiting.
        self.close();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

/// The worker state machine: seek a job, run it, flush, repeat; terminate
/// once submission is closed and the pending queue is empty.
fn worker_loop<T: Send>(worker_id: usize, shared: &Shared<T>) {
    loop {
        let mut state = shared.state.lock();
        if let Some(PendingJob { seq, payload }) = state.pending.pop_front() {
            // The append below fixes this job's position in the output
            // order; it must happen under the same lock as the pop above.
            state.in_flight.push_back(InFlightSlot { seq, done: false, payload: None });
            drop(state);

            let mut payload = payload;
            (shared.work_fn)(worker_id, &mut payload);

            let mut state = shared.state.lock();
            mark_done(&mut state, seq, payload);
            flush_done_prefix(&mut state);
        } else if state.closed || state.drained {
            if state.in_flight.is_empty() {
                state.drained = true;
            }
            return;
        } else {
            let interval = state.poll_interval;
            drop(state);
            thread::sleep(interval);
        }
    }
}

/// Put a finished payload back into its in-flight slot and mark it done.
///
/// Caller must hold the state lock. In-flight sequence numbers are
/// contiguous (jobs enter in submission order and only leave from the
/// front), so the slot index is `seq - head_seq`.
fn mark_done<T>(state: &mut PoolState<T>, seq: u64, payload: T) {
    let head_seq = state
        .in_flight
        .front()
        .map(|slot| slot.seq)
        .expect("in-flight queue cannot be empty while a job is running");
    let index = usize::try_from(seq - head_seq).expect("in-flight queue index fits in usize");
    let slot = &mut state.in_flight[index];
    slot.payload = Some(payload);
    slot.done = true;
}

/// Move the contiguous done-prefix of the in-flight queue to the completed
/// queue. Caller must hold the state lock.
fn flush_done_prefix<T>(state: &mut PoolState<T>) {
    while state.in_flight.front().is_some_and(|slot| slot.done) {
        let slot = state.in_flight.pop_front().expect("front was just checked");
        let payload = slot.payload.expect("a done slot always holds its payload");
        state.completed.push_back(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    /// Drain the pool to completion, sleeping briefly between polls.
    fn drain<T: Send + 'static>(pool: &OrderedPool<T>) -> Vec<T> {
        let mut results = Vec::new();
        while !pool.is_complete() {
            match pool.poll_result() {
                Some(payload) => results.push(payload),
                None => thread::sleep(Duration::from_millis(1)),
            }
        }
        results
    }

    #[test]
    fn test_results_arrive_in_submission_order() {
        // Adversarial schedule: earlier jobs sleep longer, so later jobs
        // finish first and pile up in the reorder buffer.
        let mut pool = OrderedPool::new(4, |_id, job: &mut (usize, usize)| {
            thread::sleep(Duration::from_millis((9 - job.0) as u64));
            job.1 = job.0 * 10;
        })
        .unwrap();
        pool.start().unwrap();
        for id in 0..10 {
            pool.submit((id, 0)).unwrap();
        }
        pool.close();

        let results = drain(&pool);
        pool.shutdown().unwrap();

        let ids: Vec<usize> = results.iter().map(|job| job.0).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
        assert!(results.iter().all(|job| job.1 == job.0 * 10));
    }

    #[test]
    fn test_every_job_retrieved_exactly_once() {
        let mut pool = OrderedPool::new(4, |_id, n: &mut usize| *n += 1).unwrap();
        pool.start().unwrap();
        for n in 0..100 {
            pool.submit(n).unwrap();
        }
        pool.close();

        let results = drain(&pool);
        pool.shutdown().unwrap();

        assert_eq!(results.len(), 100);
        assert_eq!(results, (1..=100).collect::<Vec<_>>());
    }

    #[test]
    fn test_submit_before_start_is_queued() {
        let mut pool = OrderedPool::new(2, |_id, n: &mut u32| *n *= 3).unwrap();
        for n in 1..=5 {
            pool.submit(n).unwrap();
        }
        assert_eq!(pool.pending_count(), 5);

        pool.start().unwrap();
        pool.close();
        let results = drain(&pool);
        pool.shutdown().unwrap();
        assert_eq!(results, vec![3, 6, 9, 12, 15]);
    }

    #[test]
    fn test_drained_transitions_once_and_stays() {
        let release = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&release);
        let mut pool = OrderedPool::new(2, move |_id, _job: &mut ()| {
            while !gate.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap()
        .with_poll_interval(Duration::from_millis(1));
        pool.start().unwrap();
        pool.submit(()).unwrap();
        pool.close();

        // The job is held open by the gate, so the pool cannot be drained.
        thread::sleep(Duration::from_millis(20));
        assert!(!pool.is_drained());

        release.store(true, Ordering::Release);
        while !pool.is_drained() {
            thread::sleep(Duration::from_millis(1));
        }
        // Monotonic: once set, stays set.
        assert!(pool.is_drained());
        assert_eq!(pool.poll_result(), Some(()));
        assert!(pool.is_drained());
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_jobs_run_in_parallel() {
        // K jobs of duration T on K workers should take ~T, not K*T.
        let mut pool = OrderedPool::new(4, |_id, _job: &mut ()| {
            thread::sleep(Duration::from_millis(100));
        })
        .unwrap()
        .with_poll_interval(Duration::from_millis(1));
        pool.start().unwrap();

        let begin = Instant::now();
        for _ in 0..4 {
            pool.submit(()).unwrap();
        }
        pool.close();
        let results = drain(&pool);
        let elapsed = begin.elapsed();
        pool.shutdown().unwrap();

        assert_eq!(results.len(), 4);
        assert!(
            elapsed < Duration::from_millis(300),
            "4 x 100ms jobs on 4 workers took {elapsed:?}; expected ~100ms"
        );
    }

    #[test]
    fn test_slow_head_blocks_finished_successor() {
        let release = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&release);
        let mut pool = OrderedPool::new(2, move |_id, job: &mut usize| {
            if *job == 0 {
                while !gate.load(Ordering::Acquire) {
                    thread::sleep(Duration::from_millis(1));
                }
            }
        })
        .unwrap()
        .with_poll_interval(Duration::from_millis(1));
        pool.start().unwrap();
        pool.submit(0).unwrap();
        pool.submit(1).unwrap();
        pool.close();

        // Job 1 finishes almost immediately, but job 0 still gates the
        // completed queue.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(pool.completed_count(), 0);
        assert_eq!(pool.poll_result(), None);
        assert_eq!(pool.status().in_flight, 2);

        release.store(true, Ordering::Release);
        let results = drain(&pool);
        pool.shutdown().unwrap();
        assert_eq!(results, vec![0, 1]);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = OrderedPool::new(0, |_id, _n: &mut u8| {});
        assert!(matches!(result, Err(SeqpoolError::InvalidParameter { .. })));
    }

    #[test]
    fn test_submit_after_close_rejected() {
        let pool = OrderedPool::new(1, |_id, _n: &mut u8| {}).unwrap();
        pool.close();
        pool.close(); // idempotent
        assert!(matches!(pool.submit(1), Err(SeqpoolError::SubmitAfterClose)));
    }

    #[test]
    fn test_double_start_rejected() {
        let mut pool = OrderedPool::new(1, |_id, _n: &mut u8| {}).unwrap();
        pool.start().unwrap();
        assert!(matches!(pool.start(), Err(SeqpoolError::PoolAlreadyStarted)));
        pool.close();
        while !pool.is_drained() {
            thread::sleep(Duration::from_millis(1));
        }
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_before_drain_rejected() {
        let mut pool = OrderedPool::new(1, |_id, _n: &mut u8| {}).unwrap();
        pool.start().unwrap();
        assert!(matches!(pool.shutdown(), Err(SeqpoolError::ShutdownBeforeDrain)));
        // Drop closes and joins.
    }

    #[test]
    fn test_status_snapshot() {
        let mut pool = OrderedPool::new(3, |_id, _n: &mut u8| {}).unwrap();
        pool.submit(1).unwrap();
        pool.submit(2).unwrap();

        let status = pool.status();
        assert_eq!(status.workers, 3);
        assert_eq!(status.pending, 2);
        assert_eq!(status.in_flight, 0);
        assert_eq!(status.completed, 0);
        assert!(!status.closed);
        assert!(!status.drained);
        assert_eq!(
            status.to_string(),
            "workers=3 pending=2 in_flight=0 completed=0 closed=false drained=false"
        );

        pool.start().unwrap();
        pool.close();
        let results = drain(&pool);
        assert_eq!(results, vec![1, 2]);

        let status = pool.status();
        assert!(status.closed);
        assert!(status.drained);
        assert_eq!(status.pending + status.in_flight + status.completed, 0);
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_empty_pool_drains() {
        let mut pool = OrderedPool::new(2, |_id, _n: &mut u8| {})
            .unwrap()
            .with_poll_interval(Duration::from_millis(1));
        pool.start().unwrap();
        pool.close();
        while !pool.is_complete() {
            thread::sleep(Duration::from_millis(1));
        }
        pool.shutdown().unwrap();
    }
}
