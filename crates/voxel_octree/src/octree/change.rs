//! Dirty-region propagation.

use glam::IVec3;

use super::node::{NodeId, Timestamp};
use super::SparseOctree;
use crate::extraction::Extractor;
use crate::region::Region;

impl<E: Extractor, X> SparseOctree<E, X> {
  /// Record that the unit at `point` changed at `timestamp`.
  ///
  /// Returns the number of nodes stamped (the owning leaf and its
  /// ancestors, or 0 if the point lies outside the tree).
  pub fn mark_change_at(&mut self, point: IVec3, timestamp: Timestamp) -> usize {
    let region = self.config.construction_mode.point_region(point);
    self.mark_change(region, timestamp)
  }

  /// Record that everything inside `region` changed at `timestamp`.
  ///
  /// Only nodes whose bounds intersect `region` are visited; disjoint
  /// subtrees are skipped entirely. Returns the number of nodes stamped.
  #[tracing::instrument(level = "trace", skip_all, name = "octree::mark_change")]
  pub fn mark_change(&mut self, region: Region, timestamp: Timestamp) -> usize {
    let touched = self.mark_change_from(self.root, &region, timestamp);
    tracing::trace!(?region, touched, "change marked");
    touched
  }

  fn mark_change_from(&mut self, index: NodeId, region: &Region, timestamp: Timestamp) -> usize {
    let mode = self.config.construction_mode;
    let node = &mut self.nodes[index.index()];
    if !mode.intersects(&node.bounds, region) {
      return 0;
    }

    node.touch(timestamp);
    let children = node.children;

    1 + children
      .iter()
      .flatten()
      .map(|&child| self.mark_change_from(child, region, timestamp))
      .sum::<usize>()
  }
}
