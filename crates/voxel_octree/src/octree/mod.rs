//! Sparse region octree with per-node dirty tracking.
//!
//! The tree is an append-only arena of [`OctreeNode`]s indexed by
//! [`NodeId`]. Its shape is fixed at construction; afterwards only the
//! per-node timestamps and task slots change.
//!
//! # Lifecycle
//!
//! ```text
//! build (once) ──► mark_change* ──► update ──► drain_completions
//!                       ▲              │
//!                       └──────────────┘  every tick
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: `OctreeNode`, `NodeId`, `Timestamp`, `NodeState`
//! - [`config`]: `OctreeConfig`, `BASE_NODE_SIZE`
//! - [`budget`]: `SchedulingBudget`, `UpdateStats`
//! - `build`: bounds normalization and recursive subdivision
//! - `change`: dirty-region propagation
//! - `traverse`: pre-order visitor and point lookup
//! - `update`: extraction scheduling and reconciliation

use std::sync::Arc;

use web_time::Instant;

use crate::extraction::{ExtractionCompletion, Extractor, OctreeEvent};
use crate::region::Region;
use crate::threading::{RayonExecutor, TaskHandle};

pub mod budget;
pub mod config;
pub mod node;

mod build;
mod change;
mod traverse;
mod update;

// Re-exports
pub use budget::{SchedulingBudget, UpdateStats};
pub use build::OctreeLayout;
pub use config::{OctreeConfig, BASE_NODE_SIZE};
pub use node::{NodeId, NodeState, OctreeNode, Timestamp, CHILDREN_COUNT};
pub use traverse::TraverseControl;

/// An extraction task the octree is waiting on.
pub(crate) struct Outstanding<T> {
  pub(crate) node: NodeId,
  pub(crate) scheduled_at: Timestamp,
  pub(crate) handle: TaskHandle<T>,
}

/// Sparse octree over a volume's extent, scheduling extraction for stale
/// leaves.
///
/// `E` derives content for a leaf; `X` runs that work in the background.
pub struct SparseOctree<E: Extractor, X = RayonExecutor> {
  /// Node arena; index = `NodeId`.
  nodes: Vec<OctreeNode>,
  root: NodeId,
  /// Mode-normalized construction extent, used for pruning.
  bounds: Region,
  /// Cubic region covered by the root.
  octree_region: Region,
  max_depth: i32,
  config: OctreeConfig,

  extractor: Arc<E>,
  executor: X,
  outstanding: Vec<Outstanding<E::Output>>,
  completions: Vec<ExtractionCompletion<E::Output>>,
  events: Vec<OctreeEvent>,

  /// Origin of this tree's timestamps.
  epoch: Instant,
}

impl<E: Extractor, X> SparseOctree<E, X> {
  pub fn root_id(&self) -> NodeId {
    self.root
  }

  pub fn root(&self) -> &OctreeNode {
    self.node(self.root)
  }

  /// Look up a node.
  ///
  /// # Panics
  /// Panics if `id` does not belong to this tree.
  pub fn node(&self, id: NodeId) -> &OctreeNode {
    match self.nodes.get(id.index()) {
      Some(node) => node,
      None => panic!(
        "node {} out of range (octree has {} nodes)",
        id,
        self.nodes.len()
      ),
    }
  }

  /// Look up a node, returning `None` for ids outside the arena.
  pub fn get(&self, id: NodeId) -> Option<&OctreeNode> {
    self.nodes.get(id.index())
  }

  /// Construction extent after mode normalization.
  pub fn bounds(&self) -> Region {
    self.bounds
  }

  /// Cubic region covered by the root node.
  pub fn octree_region(&self) -> Region {
    self.octree_region
  }

  pub fn max_depth(&self) -> i32 {
    self.max_depth
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  /// All nodes in arena order (parents before their children).
  pub fn nodes(&self) -> impl Iterator<Item = &OctreeNode> {
    self.nodes.iter()
  }

  /// Leaf nodes in arena order.
  pub fn leaves(&self) -> impl Iterator<Item = &OctreeNode> {
    self.nodes.iter().filter(|node| node.is_leaf())
  }

  /// Number of extraction tasks not yet reconciled.
  pub fn outstanding_count(&self) -> usize {
    self.outstanding.len()
  }

  /// Current time on this tree's clock.
  pub fn now(&self) -> Timestamp {
    Timestamp::from_duration(self.epoch.elapsed())
  }

  pub fn extractor(&self) -> &Arc<E> {
    &self.extractor
  }

  pub fn executor(&self) -> &X {
    &self.executor
  }

  /// Take all reconciled extraction results.
  pub fn drain_completions(&mut self) -> Vec<ExtractionCompletion<E::Output>> {
    std::mem::take(&mut self.completions)
  }

  /// Take all scheduler events recorded since the last drain.
  pub fn drain_events(&mut self) -> Vec<OctreeEvent> {
    std::mem::take(&mut self.events)
  }
}

impl<E: Extractor, X> Drop for SparseOctree<E, X> {
  fn drop(&mut self) {
    if !self.outstanding.is_empty() {
      // Workers finish on their own; their results go nowhere
      tracing::debug!(
        abandoned = self.outstanding.len(),
        "dropping octree with outstanding extraction tasks"
      );
    }
  }
}


#[cfg(test)]
#[path = "change_test.rs"]
mod change_test;
