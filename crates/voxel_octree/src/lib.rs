//! voxel_octree - sparse region octree with asynchronous extraction
//! scheduling
//!
//! This crate partitions a bounded integer volume into a static hierarchy of
//! axis-aligned boxes, tracks when each box's content last changed, and
//! keeps at most one background "extraction" task in flight per leaf until
//! every leaf is up to date.
//!
//! # Features
//!
//! - **Sparse construction**: a cubic power-of-two root fitted around the
//!   volume, with octants outside the volume never allocated
//! - **Two boundary conventions**: voxel sample points or cells
//!   ([`ConstructionMode`])
//! - **Dirty propagation**: `mark_change` stamps only the intersecting
//!   subtree
//! - **Non-blocking scheduling**: submit/poll through any [`TaskExecutor`]
//!   (rayon by default)
//!
//! # Example
//!
//! ```ignore
//! use voxel_octree::{ConstructionMode, ExtractionRequest, RayonExecutor, Region, SparseOctree};
//!
//! let region = Region::new(0, 0, 0, 127, 63, 127);
//! let mut octree = SparseOctree::new(
//!     region,
//!     ConstructionMode::BoundVoxels,
//!     |request: ExtractionRequest| build_mesh(request.bounds),
//!     RayonExecutor::new(),
//! )?;
//!
//! // Every tick
//! octree.mark_change_at(edited_voxel, octree.now());
//! octree.update(camera_position);
//! for completion in octree.drain_completions() {
//!     upload(completion.node, completion.output);
//! }
//! ```

pub mod error;
pub mod extraction;
pub mod octree;
pub mod region;

// Cross-platform task execution
pub mod threading;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used items
pub use error::{OctreeError, SubmitError};
pub use extraction::{
  ExtractionCompletion, ExtractionRequest, Extractor, OctreeEvent, VolumeSource,
};
pub use octree::{
  NodeId, NodeState, OctreeConfig, OctreeLayout, OctreeNode, SchedulingBudget, SparseOctree,
  Timestamp, TraverseControl, UpdateStats, BASE_NODE_SIZE,
};
pub use region::{ConstructionMode, Region};
pub use threading::{
  InlineExecutor, RayonExecutor, TaskCompleter, TaskExecutor, TaskHandle, TaskId, TaskPoll,
};
