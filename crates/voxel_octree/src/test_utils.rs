//! Test utilities for octree tests.
//!
//! Provides a hand-cranked executor, extractors and tree fixtures so the
//! scheduler can be driven step by step.

use std::sync::{Arc, Mutex};

use glam::IVec3;

use crate::error::SubmitError;
use crate::extraction::ExtractionRequest;
use crate::octree::{NodeId, OctreeNode, SparseOctree, Timestamp};
use crate::region::{ConstructionMode, Region};
use crate::threading::{InlineExecutor, TaskExecutor, TaskHandle, TaskId};

// =============================================================================
// Manual Executor
// =============================================================================

type Job = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct ManualState {
  jobs: Vec<Job>,
  refuse_with: Option<SubmitError>,
  submitted: usize,
}

/// Executor that queues jobs until the test runs (or drops) them.
///
/// Clones share the same queue, so a test can keep one clone while the
/// octree owns another.
#[derive(Clone, Default)]
pub struct ManualExecutor {
  state: Arc<Mutex<ManualState>>,
}

impl ManualExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run every queued job on the current thread. Returns how many ran.
  pub fn run_all(&self) -> usize {
    let jobs = std::mem::take(&mut self.state.lock().unwrap().jobs);
    let count = jobs.len();
    for job in jobs {
      job();
    }
    count
  }

  /// Drop every queued job without running it, disconnecting its handle.
  pub fn drop_all(&self) -> usize {
    let jobs = std::mem::take(&mut self.state.lock().unwrap().jobs);
    jobs.len()
  }

  /// Make subsequent submissions fail with `error` (or succeed with `None`).
  pub fn refuse_with(&self, error: Option<SubmitError>) {
    self.state.lock().unwrap().refuse_with = error;
  }

  pub fn queued(&self) -> usize {
    self.state.lock().unwrap().jobs.len()
  }

  /// Total jobs accepted since creation.
  pub fn submitted(&self) -> usize {
    self.state.lock().unwrap().submitted
  }
}

impl TaskExecutor for ManualExecutor {
  fn submit<F, T>(&self, work: F) -> Result<TaskHandle<T>, SubmitError>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    let mut state = self.state.lock().unwrap();
    if let Some(error) = state.refuse_with.clone() {
      return Err(error);
    }

    let (completer, handle) = TaskHandle::channel();
    state.jobs.push(Box::new(move || completer.complete(work())));
    state.submitted += 1;
    Ok(handle)
  }
}

// =============================================================================
// Extractors
// =============================================================================

/// Extractor that returns the request itself.
pub fn echo_extractor(request: ExtractionRequest) -> ExtractionRequest {
  request
}

pub type EchoFn = fn(ExtractionRequest) -> ExtractionRequest;

pub type EchoOctree<X> = SparseOctree<EchoFn, X>;

// =============================================================================
// Fixtures
// =============================================================================

/// Cube region at the origin with the given extent.
pub fn cube(extent: i32) -> Region {
  Region::cube(IVec3::ZERO, extent)
}

/// Octree with an inline executor over `region`.
pub fn inline_octree(region: Region, mode: ConstructionMode) -> EchoOctree<InlineExecutor> {
  SparseOctree::new(region, mode, echo_extractor as EchoFn, InlineExecutor).unwrap()
}

/// Octree driven by a manual executor; returns the tree and a shared
/// handle to its queue.
pub fn manual_octree(
  region: Region,
  mode: ConstructionMode,
) -> (EchoOctree<ManualExecutor>, ManualExecutor) {
  let executor = ManualExecutor::new();
  let octree =
    SparseOctree::new(region, mode, echo_extractor as EchoFn, executor.clone()).unwrap();
  (octree, executor)
}

/// Per-node state tuple used to compare trees before and after an operation.
pub type NodeSnapshot = (
  NodeId,
  Timestamp,
  Option<Timestamp>,
  Option<Timestamp>,
  Option<TaskId>,
);

pub fn snapshot<'a>(nodes: impl Iterator<Item = &'a OctreeNode>) -> Vec<NodeSnapshot> {
  nodes
    .map(|node| {
      (
        node.id(),
        node.last_modified(),
        node.last_scheduled(),
        node.last_extracted(),
        node.task(),
      )
    })
    .collect()
}
