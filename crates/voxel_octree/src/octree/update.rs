//! Extraction scheduling and reconciliation.
//!
//! One pass per tick:
//!
//! 1. walk the tree and submit a task for every leaf that is stale, not
//!    scheduled and not running (subject to the [`SchedulingBudget`]);
//! 2. poll each outstanding handle once and reconcile the finished ones.
//!
//! Nothing here blocks: a task that finishes between passes is picked up by
//! the next call.
//!
//! [`SchedulingBudget`]: super::SchedulingBudget

use std::sync::Arc;

use glam::DVec3;

use super::node::{NodeId, Timestamp};
use super::traverse::TraverseControl;
use super::{Outstanding, SparseOctree, UpdateStats};
use crate::error::SubmitError;
use crate::extraction::{ExtractionCompletion, ExtractionRequest, Extractor, OctreeEvent};
use crate::threading::{TaskExecutor, TaskPoll};

impl<E: Extractor, X: TaskExecutor> SparseOctree<E, X> {
  /// Run one update pass at the tree's current time.
  ///
  /// The view position is carried into diagnostics only; the core applies
  /// no view-dependent priority. Always returns `true`.
  pub fn update(&mut self, view_position: DVec3) -> bool {
    let now = self.now();
    self.update_at(view_position, now);
    true
  }

  /// Run one update pass with an explicit `now`.
  #[tracing::instrument(skip_all, name = "octree::update", fields(view = ?view_position))]
  pub fn update_at(&mut self, view_position: DVec3, now: Timestamp) -> UpdateStats {
    let mut stats = UpdateStats::default();

    self.schedule_stale_leaves(now, &mut stats);
    self.reconcile_tasks(&mut stats);
    stats.outstanding = self.outstanding.len();

    if !stats.is_idle() || stats.submit_failures > 0 {
      tracing::debug!(
        scheduled = stats.scheduled,
        completed = stats.completed,
        lost = stats.lost,
        deferred = stats.deferred,
        outstanding = stats.outstanding,
        "update pass"
      );
    }

    stats
  }

  fn schedule_stale_leaves(&mut self, now: Timestamp, stats: &mut UpdateStats) {
    let mut stale = Vec::new();
    self.traverse(|node| {
      if node.has_children() {
        return TraverseControl::Continue;
      }
      if node.needs_extraction() {
        stale.push(node.id());
      }
      TraverseControl::Skip
    });

    let budget = self.config.budget;
    for (position, &id) in stale.iter().enumerate() {
      if !budget.can_submit(stats.scheduled, self.outstanding.len()) {
        stats.deferred = stale.len() - position;
        break;
      }

      if let Err(error) = self.submit_extraction(id, now) {
        // Executor is full or gone; everything left waits for the next pass
        stats.submit_failures += 1;
        stats.deferred = stale.len() - position - 1;
        tracing::warn!(node = %id, %error, "extraction submit failed, retrying next update");
        self.events.push(OctreeEvent::SubmitFailed { node: id, error });
        break;
      }
      stats.scheduled += 1;
    }
  }

  fn submit_extraction(&mut self, id: NodeId, now: Timestamp) -> Result<(), SubmitError> {
    let node = &self.nodes[id.index()];
    let request = ExtractionRequest {
      node: id,
      bounds: node.bounds,
      depth: node.depth,
      modified_at: node.last_modified,
      scheduled_at: now,
    };

    let extractor = Arc::clone(&self.extractor);
    let handle = self.executor.submit(move || extractor.extract(request))?;
    let task = handle.id();

    self.nodes[id.index()].begin_task(task, now);
    self.outstanding.push(Outstanding {
      node: id,
      scheduled_at: now,
      handle,
    });
    self.events.push(OctreeEvent::Scheduled { node: id, task, at: now });
    tracing::trace!(node = %id, task = task.raw(), "extraction scheduled");

    Ok(())
  }

  fn reconcile_tasks(&mut self, stats: &mut UpdateStats) {
    let outstanding = std::mem::take(&mut self.outstanding);

    for mut entry in outstanding {
      let task = entry.handle.id();
      match entry.handle.try_take() {
        TaskPoll::Pending => self.outstanding.push(entry),
        TaskPoll::Ready(output) => {
          let node = &mut self.nodes[entry.node.index()];
          debug_assert_eq!(node.task, Some(task));
          node.finish_task();

          self.completions.push(ExtractionCompletion {
            node: entry.node,
            bounds: node.bounds,
            scheduled_at: entry.scheduled_at,
            output,
          });
          self.events.push(OctreeEvent::Completed {
            node: entry.node,
            task,
          });
          tracing::trace!(node = %entry.node, task = task.raw(), "extraction complete");
          stats.completed += 1;
        }
        TaskPoll::Lost => {
          self.nodes[entry.node.index()].abandon_task();
          self.events.push(OctreeEvent::TaskLost {
            node: entry.node,
            task,
          });
          tracing::warn!(node = %entry.node, task = task.raw(), "extraction task lost, retrying next update");
          stats.lost += 1;
        }
      }
    }
  }
}
