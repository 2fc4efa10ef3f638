//! Error types for octree construction and task submission.

use thiserror::Error;

use crate::region::Region;

/// Errors raised while building a [`SparseOctree`](crate::SparseOctree).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OctreeError {
  #[error("Region {region:?} has a zero or negative dimension")]
  DegenerateRegion { region: Region },

  #[error("Base node size must be a positive power of two, got {0}")]
  InvalidBaseNodeSize(i32),

  #[error("Largest dimension {largest_dimension} exceeds the addressable octree size")]
  RegionTooLarge { largest_dimension: i32 },
}

/// Errors returned by a [`TaskExecutor`](crate::TaskExecutor) that could not
/// accept a job.
///
/// Always transient from the octree's point of view: the node stays dirty
/// and is offered again on the next update.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
  #[error("Executor saturated ({capacity} tasks pending)")]
  Saturated { capacity: usize },

  #[error("Executor rejected the task: {0}")]
  Rejected(String),
}
