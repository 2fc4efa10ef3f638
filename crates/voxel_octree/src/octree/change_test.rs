use glam::IVec3;

use super::*;
use crate::region::{ConstructionMode, Region};
use crate::test_utils::{cube, inline_octree, EchoOctree};

/// Nodes whose last_modified moved off zero.
fn touched<X>(octree: &EchoOctree<X>) -> Vec<NodeId> {
  octree
    .nodes()
    .filter(|node| node.last_modified() > Timestamp::ZERO)
    .map(|node| node.id())
    .collect()
}

/// The leaf owning `point` and every ancestor up to the root, root first.
fn ancestor_chain<X>(octree: &EchoOctree<X>, point: IVec3) -> Vec<NodeId> {
  let mut chain = Vec::new();
  let mut current = octree.leaf_containing(point);
  while let Some(id) = current {
    chain.push(id);
    current = octree.node(id).parent();
  }
  chain.sort();
  chain
}

/// (id, last_modified) for every node, in traversal order.
fn traversal_timestamps<X>(octree: &EchoOctree<X>) -> Vec<(NodeId, Timestamp)> {
  let mut visited = Vec::new();
  octree.traverse(|node| {
    visited.push((node.id(), node.last_modified()));
    TraverseControl::Continue
  });
  visited
}

#[test]
fn test_point_marks_leaf_and_ancestors() {
  for mode in [ConstructionMode::BoundVoxels, ConstructionMode::BoundCells] {
    let mut octree = inline_octree(cube(64), mode);
    let point = IVec3::new(20, 5, 40);
    let ts = Timestamp::from_secs(3);

    let before = traversal_timestamps(&octree);
    let count = octree.mark_change_at(point, ts);
    let after = traversal_timestamps(&octree);

    let mut changed: Vec<_> = before
      .iter()
      .zip(&after)
      .filter(|(old, new)| old != new)
      .map(|(_, &(id, stamp))| {
        assert_eq!(stamp, ts);
        id
      })
      .collect();
    changed.sort();

    let chain = ancestor_chain(&octree, point);
    assert_eq!(chain.len(), 3, "{:?}", mode);
    assert_eq!(count, chain.len());
    assert_eq!(changed, chain);
    for (id, _) in after.iter().filter(|(id, _)| !chain.contains(id)) {
      assert!(!mode.owns_point(&octree.node(*id).bounds(), point));
    }
  }
}

/// A unit on a leaf boundary belongs to exactly one leaf.
#[test]
fn test_point_on_leaf_boundary_marks_one_leaf() {
  let mut octree = inline_octree(cube(64), ConstructionMode::BoundCells);
  assert_eq!(octree.mark_change_at(IVec3::new(16, 0, 0), Timestamp::from_secs(1)), 3);

  let leaves: Vec<_> = octree
    .leaves()
    .filter(|leaf| leaf.last_modified() > Timestamp::ZERO)
    .map(|leaf| leaf.bounds().lower())
    .collect();
  assert_eq!(leaves, vec![IVec3::new(16, 0, 0)]);
}

#[test]
fn test_region_spanning_leaves() {
  let mut octree = inline_octree(cube(64), ConstructionMode::BoundCells);
  let change = Region::new(8, 8, 8, 16, 1, 1);

  // root, the first octant, and the two leaves the strip crosses
  assert_eq!(octree.mark_change(change, Timestamp::from_secs(1)), 4);
  let dirty_leaves = octree
    .leaves()
    .filter(|leaf| leaf.last_modified() > Timestamp::ZERO)
    .count();
  assert_eq!(dirty_leaves, 2);
}

#[test]
fn test_whole_volume_marks_every_node() {
  let mut octree = inline_octree(cube(64), ConstructionMode::BoundCells);
  let count = octree.mark_change(cube(64), Timestamp::from_secs(1));
  assert_eq!(count, octree.node_count());
  assert!(octree.nodes().all(|node| node.last_modified() == Timestamp::from_secs(1)));
}

#[test]
fn test_change_outside_tree_is_ignored() {
  let mut octree = inline_octree(cube(32), ConstructionMode::BoundCells);
  assert_eq!(octree.mark_change_at(IVec3::new(100, 0, 0), Timestamp::from_secs(1)), 0);
  assert_eq!(octree.mark_change(Region::cube(IVec3::splat(-50), 10), Timestamp::from_secs(1)), 0);
  assert!(touched(&octree).is_empty());
}

/// Below the second level, each recursion step has to follow the child
/// it is visiting rather than re-enter the current node.
#[test]
fn test_deep_tree_marks_only_the_owning_branch() {
  for size in [64, 128, 256] {
    let mut octree = inline_octree(cube(size), ConstructionMode::BoundCells);
    let point = IVec3::new(size - 3, 7, size / 2 + 1);

    let count = octree.mark_change_at(point, Timestamp::from_secs(9));

    let chain = ancestor_chain(&octree, point);
    assert_eq!(chain.len() as i32, octree.max_depth() + 2, "W={}", size);
    assert_eq!(count, chain.len());
    assert_eq!(touched(&octree), chain);
  }
}

#[test]
fn test_older_timestamp_does_not_roll_back() {
  let mut octree = inline_octree(cube(32), ConstructionMode::BoundCells);
  let point = IVec3::new(1, 1, 1);

  octree.mark_change_at(point, Timestamp::from_secs(5));
  let touched_again = octree.mark_change_at(point, Timestamp::from_secs(2));

  assert_eq!(touched_again, 2);
  for id in touched(&octree) {
    assert_eq!(octree.node(id).last_modified(), Timestamp::from_secs(5));
  }
}

#[test]
fn test_voxel_change_across_leaf_seam() {
  // Voxel leaves [1..16] and [17..32] share no points; a change over 16..=17 reaches both
  let mut octree = inline_octree(cube(32), ConstructionMode::BoundVoxels);
  let change = Region::from_corners(IVec3::new(16, 4, 4), IVec3::new(17, 4, 4));

  assert_eq!(octree.mark_change(change, Timestamp::from_secs(1)), 3);
}

/// Changes at the far end of the i32 range are outside the tree, not an overflow.
#[test]
fn test_change_near_i32_limits_is_ignored() {
  for mode in [ConstructionMode::BoundVoxels, ConstructionMode::BoundCells] {
    let mut octree = inline_octree(cube(32), mode);
    let ts = Timestamp::from_secs(1);
    assert_eq!(octree.mark_change_at(IVec3::splat(i32::MAX), ts), 0);
    assert_eq!(octree.mark_change(Region::new(i32::MAX - 4, 0, 0, 10, 10, 10), ts), 0);
    assert_eq!(octree.mark_change(Region::new(i32::MIN, 0, 0, i32::MAX, 1, 1), ts), 0);
    assert!(touched(&octree).is_empty());
  }
}
