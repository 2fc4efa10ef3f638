//! OctreeNode - one cell of the sparse octree arena.
//!
//! Shape fields (bounds, depth, links) are fixed at construction. The three
//! state fields drive the extraction state machine:
//!
//! ```text
//!            mark_change                 submit ok
//! UpToDate ──────────────► Dirty ─────────────────► Running
//!     ▲                    ▲  │ submit err             │
//!     │                    │  └──────┘                 │ reconcile
//!     │                    └───── changed while ───────┤
//!     │                           running / lost       │
//!     └────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use crate::region::Region;
use crate::threading::TaskId;

/// Number of child slots per node.
pub const CHILDREN_COUNT: usize = 8;

/// Index of a node in the octree arena.
///
/// Stable for the lifetime of the tree. `NodeId(0)` is the root; absence is
/// expressed with `Option<NodeId>`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
  pub const fn new(index: u32) -> Self {
    Self(index)
  }

  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl std::fmt::Display for NodeId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Point in time relative to the owning octree's creation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
  /// The octree's creation instant.
  pub const ZERO: Self = Self(Duration::ZERO);

  pub const fn from_duration(since_epoch: Duration) -> Self {
    Self(since_epoch)
  }

  pub const fn from_millis(millis: u64) -> Self {
    Self(Duration::from_millis(millis))
  }

  pub const fn from_secs(secs: u64) -> Self {
    Self(Duration::from_secs(secs))
  }

  pub const fn as_duration(self) -> Duration {
    self.0
  }
}

/// Extraction state derived from a node's timestamps and task slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeState {
  /// Content changed since the last reconciled extraction (or never extracted).
  Dirty,
  /// An extraction task is outstanding.
  Running,
  /// Last reconciled extraction is not older than the last change.
  UpToDate,
}

/// A single cell of the sparse octree.
#[derive(Clone, Debug)]
pub struct OctreeNode {
  pub(crate) id: NodeId,
  pub(crate) parent: Option<NodeId>,
  pub(crate) children: [Option<NodeId>; CHILDREN_COUNT],
  pub(crate) bounds: Region,
  pub(crate) depth: i32,

  pub(crate) last_modified: Timestamp,
  pub(crate) last_scheduled: Option<Timestamp>,
  pub(crate) last_extracted: Option<Timestamp>,
  pub(crate) task: Option<TaskId>,
}

impl OctreeNode {
  pub(crate) fn new(id: NodeId, bounds: Region, parent: Option<NodeId>, depth: i32) -> Self {
    Self {
      id,
      parent,
      children: [None; CHILDREN_COUNT],
      bounds,
      depth,
      last_modified: Timestamp::ZERO,
      last_scheduled: None,
      last_extracted: None,
      task: None,
    }
  }

  pub fn id(&self) -> NodeId {
    self.id
  }

  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }

  /// Child slots indexed by octant (bit 0 = +X, bit 1 = +Y, bit 2 = +Z).
  pub fn children(&self) -> &[Option<NodeId>; CHILDREN_COUNT] {
    &self.children
  }

  /// Materialized children in octant order.
  pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
    self.children.iter().flatten().copied()
  }

  pub fn has_children(&self) -> bool {
    self.children.iter().any(Option::is_some)
  }

  pub fn is_leaf(&self) -> bool {
    !self.has_children()
  }

  pub fn bounds(&self) -> Region {
    self.bounds
  }

  pub fn depth(&self) -> i32 {
    self.depth
  }

  pub fn last_modified(&self) -> Timestamp {
    self.last_modified
  }

  /// Submission time of the outstanding extraction, if any.
  pub fn last_scheduled(&self) -> Option<Timestamp> {
    self.last_scheduled
  }

  /// Submission time of the most recently reconciled extraction.
  pub fn last_extracted(&self) -> Option<Timestamp> {
    self.last_extracted
  }

  pub fn task(&self) -> Option<TaskId> {
    self.task
  }

  pub fn is_task_running(&self) -> bool {
    self.task.is_some()
  }

  pub fn is_scheduled(&self) -> bool {
    self.last_scheduled.is_some()
  }

  pub fn is_up_to_date(&self) -> bool {
    !self.is_task_running()
      && self
        .last_extracted
        .is_some_and(|extracted| extracted >= self.last_modified)
  }

  /// Whether the update pass may submit an extraction for this node.
  pub fn needs_extraction(&self) -> bool {
    !self.is_up_to_date() && !self.is_scheduled() && !self.is_task_running()
  }

  pub fn state(&self) -> NodeState {
    if self.is_task_running() {
      NodeState::Running
    } else if self.is_up_to_date() {
      NodeState::UpToDate
    } else {
      NodeState::Dirty
    }
  }

  /// Record a change; timestamps never move backwards.
  pub(crate) fn touch(&mut self, timestamp: Timestamp) {
    self.last_modified = self.last_modified.max(timestamp);
  }

  pub(crate) fn begin_task(&mut self, task: TaskId, now: Timestamp) {
    debug_assert!(self.task.is_none(), "node {} already has a task", self.id);
    self.last_scheduled = Some(now);
    self.task = Some(task);
  }

  /// Reconcile a finished extraction. Returns the submission time.
  pub(crate) fn finish_task(&mut self) -> Option<Timestamp> {
    self.task = None;
    let scheduled = self.last_scheduled.take();
    if scheduled.is_some() {
      self.last_extracted = scheduled;
    }
    scheduled
  }

  /// Forget an outstanding task without a result.
  pub(crate) fn abandon_task(&mut self) {
    self.task = None;
    self.last_scheduled = None;
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
