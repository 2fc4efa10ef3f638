//! Extraction collaborators: the work the octree schedules, and what it
//! reports back.
//!
//! Flow: Request → Submit → Completions
//!
//! The octree never looks inside an extraction. It hands an
//! [`ExtractionRequest`] to the [`Extractor`] on a worker and, once the
//! task is reconciled, returns the output as an [`ExtractionCompletion`].

use std::sync::Arc;

use crate::error::SubmitError;
use crate::octree::{NodeId, Timestamp};
use crate::region::Region;
use crate::threading::TaskId;

/// Anything that can report the region it occupies.
pub trait VolumeSource {
  fn enclosing_region(&self) -> Region;
}

impl VolumeSource for Region {
  fn enclosing_region(&self) -> Region {
    *self
  }
}

impl<V: VolumeSource + ?Sized> VolumeSource for Arc<V> {
  fn enclosing_region(&self) -> Region {
    (**self).enclosing_region()
  }
}

/// Everything an extractor needs to re-derive one leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractionRequest {
  /// Leaf being extracted.
  pub node: NodeId,
  /// Leaf bounds, in the octree's construction mode.
  pub bounds: Region,
  /// Leaf depth.
  pub depth: i32,
  /// Latest change covered by this extraction.
  pub modified_at: Timestamp,
  /// When the request was submitted.
  pub scheduled_at: Timestamp,
}

/// Derives renderable content for a leaf. Runs on executor threads.
pub trait Extractor: Send + Sync + 'static {
  type Output: Send + 'static;

  fn extract(&self, request: ExtractionRequest) -> Self::Output;
}

impl<F, T> Extractor for F
where
  F: Fn(ExtractionRequest) -> T + Send + Sync + 'static,
  T: Send + 'static,
{
  type Output = T;

  fn extract(&self, request: ExtractionRequest) -> T {
    self(request)
  }
}

/// Reconciled extraction result.
#[derive(Debug)]
pub struct ExtractionCompletion<T> {
  /// Leaf the output belongs to.
  pub node: NodeId,
  /// Leaf bounds at extraction time.
  pub bounds: Region,
  /// When the extraction was submitted.
  pub scheduled_at: Timestamp,
  /// Extractor output.
  pub output: T,
}

/// Notable scheduler transitions, drained with
/// [`SparseOctree::drain_events`](crate::SparseOctree::drain_events).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OctreeEvent {
  /// A task was submitted for the leaf.
  Scheduled { node: NodeId, task: TaskId, at: Timestamp },
  /// The leaf's task finished and was reconciled.
  Completed { node: NodeId, task: TaskId },
  /// The executor refused the task; the leaf stays dirty.
  SubmitFailed { node: NodeId, error: SubmitError },
  /// The task's worker went away without a result; the leaf stays dirty.
  TaskLost { node: NodeId, task: TaskId },
}

impl OctreeEvent {
  /// Node the event refers to.
  pub fn node(&self) -> NodeId {
    match self {
      Self::Scheduled { node, .. }
      | Self::Completed { node, .. }
      | Self::SubmitFailed { node, .. }
      | Self::TaskLost { node, .. } => *node,
    }
  }
}
