//! Octree construction: fit a cube around the source region, then
//! subdivide down to the base node size, skipping octants outside the
//! source extent.

use std::sync::Arc;

use glam::IVec3;
use web_time::Instant;

use super::node::{NodeId, OctreeNode, CHILDREN_COUNT};
use super::{OctreeConfig, SparseOctree};
use crate::error::OctreeError;
use crate::extraction::{Extractor, VolumeSource};
use crate::region::{ConstructionMode, Region};

/// Largest supported root edge length.
const MAX_TARGET_SIZE: u32 = 1 << 30;

/// Geometry derived from a source region before any node exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OctreeLayout {
  /// Source region after mode normalization.
  pub bounds: Region,
  /// Cube of `target_size` units enclosing `bounds`.
  pub octree_region: Region,
  /// Root edge length: a power of two, at least the base node size.
  pub target_size: i32,
  /// `log2(target_size / base_node_size) - 1`
  pub max_depth: i32,
}

impl OctreeLayout {
  /// Compute the root cube for `region` under `config`.
  pub fn compute(region: &Region, config: &OctreeConfig) -> Result<Self, OctreeError> {
    if !config.has_valid_base_node_size() {
      return Err(OctreeError::InvalidBaseNodeSize(config.base_node_size));
    }
    if region.width < 1 || region.height < 1 || region.depth < 1 {
      return Err(OctreeError::DegenerateRegion { region: *region });
    }

    let mode = config.construction_mode;

    // Size check first: everything below assumes extents of at most 2^30
    let mut largest_dimension = region.largest_extent();
    if mode == ConstructionMode::BoundCells {
      largest_dimension -= 1;
    }

    let target_size = (largest_dimension.max(1) as u32)
      .checked_next_power_of_two()
      .filter(|&size| size <= MAX_TARGET_SIZE)
      .ok_or(OctreeError::RegionTooLarge { largest_dimension })? as i32;

    let bounds = match mode {
      // Capture the cells enclosing the upper row of voxels
      ConstructionMode::BoundVoxels => region.shift_upper_corner(1, 1, 1),
      ConstructionMode::BoundCells => region
        .shift_upper_corner(-1, -1, -1)
        .shift_upper_corner(1, 1, 1),
    };
    let effective = mode.unit_extent(&bounds);

    let target_size = target_size.max(config.base_node_size);
    let max_depth = (target_size / config.base_node_size).trailing_zeros() as i32 - 1;

    // Pad every axis up to the cube, half on each side. An odd increment
    // is made even by dropping one unit from the upper side first, leaving
    // the lower corner where it was (not by moving the origin up one unit).
    // A voxel extent of exactly 2^k gives an increment of -2, so the root
    // shrinks by one unit on each side and the lower face of the volume
    // falls outside the tree.
    let mut octree_region = bounds;
    let mut increment = IVec3::splat(target_size) - effective;
    if increment.x % 2 != 0 {
      octree_region.width -= 1;
      increment.x += 1;
    }
    if increment.y % 2 != 0 {
      octree_region.height -= 1;
      increment.y += 1;
    }
    if increment.z % 2 != 0 {
      octree_region.depth -= 1;
      increment.z += 1;
    }
    let octree_region = octree_region.grow(increment.x / 2, increment.y / 2, increment.z / 2);

    debug_assert_eq!(
      mode.unit_extent(&octree_region),
      IVec3::splat(target_size),
      "octree region must be a cube of the target size"
    );

    Ok(Self {
      bounds,
      octree_region,
      target_size,
      max_depth,
    })
  }
}

/// Region of the child in `octant` (bit 0 = +X, bit 1 = +Y, bit 2 = +Z).
pub(crate) fn child_region(mode: ConstructionMode, parent: &Region, half: i32, octant: usize) -> Region {
  let offset = IVec3::new(
    (octant & 1) as i32,
    ((octant >> 1) & 1) as i32,
    ((octant >> 2) & 1) as i32,
  ) * half;
  mode.sized_region(parent.lower() + offset, half)
}

impl<E: Extractor, X> SparseOctree<E, X> {
  /// Build an octree over `region` with default settings for `mode`.
  pub fn new(
    region: Region,
    mode: ConstructionMode,
    extractor: E,
    executor: X,
  ) -> Result<Self, OctreeError> {
    Self::with_config(region, OctreeConfig::new(mode), extractor, executor)
  }

  /// Build an octree over a volume's enclosing region.
  pub fn from_volume<V: VolumeSource + ?Sized>(
    volume: &V,
    config: OctreeConfig,
    extractor: E,
    executor: X,
  ) -> Result<Self, OctreeError> {
    Self::with_config(volume.enclosing_region(), config, extractor, executor)
  }

  #[tracing::instrument(
    skip_all,
    name = "octree::build",
    fields(region = ?region, mode = ?config.construction_mode)
  )]
  pub fn with_config(
    region: Region,
    config: OctreeConfig,
    extractor: E,
    executor: X,
  ) -> Result<Self, OctreeError> {
    let layout = OctreeLayout::compute(&region, &config)?;

    let mut octree = Self {
      nodes: Vec::new(),
      root: NodeId::new(0),
      bounds: layout.bounds,
      octree_region: layout.octree_region,
      max_depth: layout.max_depth,
      config,
      extractor: Arc::new(extractor),
      executor,
      outstanding: Vec::new(),
      completions: Vec::new(),
      events: Vec::new(),
      epoch: Instant::now(),
    };

    octree.root = octree.create_node(layout.octree_region, None);
    octree.build_node(octree.root);

    tracing::debug!(
      nodes = octree.nodes.len(),
      leaves = octree.leaves().count(),
      target_size = layout.target_size,
      max_depth = layout.max_depth,
      "octree built"
    );

    Ok(octree)
  }

  fn create_node(&mut self, bounds: Region, parent: Option<NodeId>) -> NodeId {
    let id = NodeId::new(self.nodes.len() as u32);
    let depth = match parent {
      Some(parent) => self.nodes[parent.index()].depth + 1,
      None => self.max_depth - 1,
    };
    self.nodes.push(OctreeNode::new(id, bounds, parent, depth));
    id
  }

  fn build_node(&mut self, parent: NodeId) {
    let mode = self.config.construction_mode;
    let parent_bounds = self.nodes[parent.index()].bounds;
    let parent_size = mode.edge_length(&parent_bounds);

    if parent_size <= self.config.base_node_size {
      return;
    }

    let half = parent_size / 2;
    for octant in 0..CHILDREN_COUNT {
      let region = child_region(mode, &parent_bounds, half, octant);
      if !mode.intersects(&region, &self.bounds) {
        continue;
      }

      let child = self.create_node(region, Some(parent));
      self.nodes[parent.index()].children[octant] = Some(child);
      self.build_node(child);
    }
  }
}
