//! Task execution backends for extraction work.
//!
//! The octree only needs two things from an executor: accept a job and hand
//! back a handle that can be polled without blocking. Results travel over a
//! one-slot channel, so a handle dropped early (octree destroyed) simply
//! leaves the worker's send unanswered.
//!
//! - [`RayonExecutor`]: `rayon::spawn` on the global pool (native, and WASM
//!   through wasm-bindgen-rayon)
//! - [`InlineExecutor`]: runs the job on the calling thread, ready at once
//!
//! # Usage
//!
//! ```ignore
//! let executor = RayonExecutor::new();
//!
//! // Queue work (non-blocking)
//! let mut handle = executor.submit(move || expensive_computation())?;
//!
//! // Poll for results each frame
//! if let TaskPoll::Ready(result) = handle.try_take() {
//!     // Use result
//! }
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{self as channel, Receiver, Sender, TryRecvError};

use crate::error::SubmitError;

/// Unique identifier for a submitted task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Result of polling a [`TaskHandle`].
#[derive(Debug, PartialEq, Eq)]
pub enum TaskPoll<T> {
  /// The task finished; its output is moved out of the handle.
  Ready(T),
  /// Still queued or running.
  Pending,
  /// The worker went away without producing a result (panic or dropped job).
  Lost,
}

/// Pollable handle to a submitted task.
pub struct TaskHandle<T> {
  id: TaskId,
  receiver: Receiver<T>,
}

/// Write side of a [`TaskHandle`], owned by whoever runs the job.
pub struct TaskCompleter<T> {
  id: TaskId,
  sender: Sender<T>,
}

impl<T> TaskHandle<T> {
  /// Create a connected completer/handle pair with a fresh [`TaskId`].
  ///
  /// Executor implementations move the completer into the job and return
  /// the handle to the caller.
  pub fn channel() -> (TaskCompleter<T>, TaskHandle<T>) {
    let id = TaskId::next();
    let (sender, receiver) = channel::bounded(1);
    (TaskCompleter { id, sender }, TaskHandle { id, receiver })
  }

  /// Handle whose result is already available.
  pub fn completed(value: T) -> Self {
    let (completer, handle) = Self::channel();
    completer.complete(value);
    handle
  }

  pub fn id(&self) -> TaskId {
    self.id
  }

  /// Check whether a result is waiting (non-blocking, does not consume it).
  pub fn is_ready(&self) -> bool {
    !self.receiver.is_empty()
  }

  /// Take the result if the task has finished (non-blocking).
  pub fn try_take(&mut self) -> TaskPoll<T> {
    match self.receiver.try_recv() {
      Ok(value) => TaskPoll::Ready(value),
      Err(TryRecvError::Empty) => TaskPoll::Pending,
      Err(TryRecvError::Disconnected) => TaskPoll::Lost,
    }
  }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TaskHandle")
      .field("id", &self.id)
      .field("ready", &self.is_ready())
      .finish()
  }
}

impl<T> TaskCompleter<T> {
  pub fn id(&self) -> TaskId {
    self.id
  }

  /// Publish the task's output.
  pub fn complete(self, value: T) {
    // Ignore send error (handle dropped = orphaned task)
    let _ = self.sender.send(value);
  }
}

/// Something that can run jobs in the background and hand back a
/// [`TaskHandle`].
pub trait TaskExecutor {
  /// Submit a job. Must not block waiting for it to run.
  fn submit<F, T>(&self, work: F) -> Result<TaskHandle<T>, SubmitError>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static;
}

impl<X: TaskExecutor> TaskExecutor for Arc<X> {
  fn submit<F, T>(&self, work: F) -> Result<TaskHandle<T>, SubmitError>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    (**self).submit(work)
  }
}

/// Task executor on rayon's global thread pool.
///
/// Cloning shares the pending counter, so clones see one combined capacity.
#[derive(Clone, Debug, Default)]
pub struct RayonExecutor {
  /// Jobs spawned but not yet finished.
  pending: Arc<AtomicUsize>,
  /// Maximum pending jobs (0 = unlimited).
  max_pending: usize,
}

impl RayonExecutor {
  /// Create an executor without a pending-job limit.
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  /// Create an executor that refuses work once `max_pending` jobs are in
  /// flight (0 = unlimited).
  pub fn with_capacity(max_pending: usize) -> Self {
    Self {
      pending: Arc::new(AtomicUsize::new(0)),
      max_pending,
    }
  }

  /// Get the number of jobs queued or running.
  pub fn pending_count(&self) -> usize {
    self.pending.load(Ordering::Acquire)
  }

  /// Get the number of worker threads in rayon's pool.
  pub fn num_threads(&self) -> usize {
    rayon::current_num_threads()
  }
}

/// Decrements the pending counter even if the job unwinds.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::AcqRel);
  }
}

impl TaskExecutor for RayonExecutor {
  fn submit<F, T>(&self, work: F) -> Result<TaskHandle<T>, SubmitError>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    // Reserve a slot atomically so clones sharing the counter cannot overshoot
    let max_pending = self.max_pending;
    self
      .pending
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |pending| {
        (max_pending == 0 || pending < max_pending).then_some(pending + 1)
      })
      .map_err(|_| SubmitError::Saturated {
        capacity: max_pending,
      })?;
    let guard = PendingGuard(Arc::clone(&self.pending));
    let (completer, handle) = TaskHandle::channel();

    rayon::spawn(move || {
      let outcome = panic::catch_unwind(AssertUnwindSafe(work));
      drop(guard);
      match outcome {
        Ok(result) => completer.complete(result),
        Err(_) => {
          // Dropping the completer disconnects the handle
          tracing::warn!(task = completer.id().raw(), "extraction task panicked");
        }
      }
    });

    Ok(handle)
  }
}

/// Runs every job immediately on the submitting thread.
///
/// For tests and for targets without worker threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl TaskExecutor for InlineExecutor {
  fn submit<F, T>(&self, work: F) -> Result<TaskHandle<T>, SubmitError>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    Ok(TaskHandle::completed(work()))
  }
}

// =============================================================================
// Tests
// =============================================================================
