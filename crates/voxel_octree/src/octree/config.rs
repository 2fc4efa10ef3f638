//! OctreeConfig - construction and scheduling settings.

use super::SchedulingBudget;
use crate::region::ConstructionMode;

/// Minimum leaf edge length, in units of the construction mode.
pub const BASE_NODE_SIZE: i32 = 16;

/// Configuration for building and driving a sparse octree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OctreeConfig {
  /// How the source region's corners are interpreted.
  pub construction_mode: ConstructionMode,

  /// Leaf edge length. Must be a power of two.
  pub base_node_size: i32,

  /// Per-update limits on extraction submissions.
  pub budget: SchedulingBudget,
}

impl OctreeConfig {
  pub fn new(construction_mode: ConstructionMode) -> Self {
    Self {
      construction_mode,
      ..Self::default()
    }
  }

  pub fn with_base_node_size(mut self, base_node_size: i32) -> Self {
    self.base_node_size = base_node_size;
    self
  }

  pub fn with_budget(mut self, budget: SchedulingBudget) -> Self {
    self.budget = budget;
    self
  }

  /// True if `base_node_size` is a positive power of two.
  #[inline]
  pub fn has_valid_base_node_size(&self) -> bool {
    self.base_node_size > 0 && (self.base_node_size as u32).is_power_of_two()
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      construction_mode: ConstructionMode::BoundVoxels,
      base_node_size: BASE_NODE_SIZE,
      budget: SchedulingBudget::UNLIMITED,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
