//! Pre-order traversal and point lookup.

use glam::IVec3;
use smallvec::{smallvec, SmallVec};

use super::node::{NodeId, OctreeNode};
use super::SparseOctree;
use crate::extraction::Extractor;

/// What a traversal visitor wants to happen next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraverseControl {
  /// Descend into this node's children.
  Continue,
  /// Treat this node as a leaf for this traversal.
  Skip,
  /// Abort the whole traversal.
  Stop,
}

impl<E: Extractor, X> SparseOctree<E, X> {
  /// Visit nodes depth-first, parents before children, siblings in octant
  /// order.
  pub fn traverse<F>(&self, mut visitor: F)
  where
    F: FnMut(&OctreeNode) -> TraverseControl,
  {
    let mut stack: SmallVec<[NodeId; 64]> = smallvec![self.root];

    while let Some(id) = stack.pop() {
      let node = &self.nodes[id.index()];
      match visitor(node) {
        TraverseControl::Continue => {
          // Reversed so octant 0 is popped first
          stack.extend(node.children.iter().rev().flatten().copied());
        }
        TraverseControl::Skip => {}
        TraverseControl::Stop => return,
      }
    }
  }

  /// Find the leaf owning the unit at `point`.
  pub fn leaf_containing(&self, point: IVec3) -> Option<NodeId> {
    let mode = self.config.construction_mode;
    let mut current = self.root();
    if !mode.owns_point(&current.bounds, point) {
      return None;
    }

    loop {
      if current.is_leaf() {
        return Some(current.id);
      }
      let next = current
        .child_ids()
        .map(|child| &self.nodes[child.index()])
        .find(|child| mode.owns_point(&child.bounds, point))?;
      current = next;
    }
  }
}
