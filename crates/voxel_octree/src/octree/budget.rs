//! Rate limiting for extraction scheduling.
//!
//! Keeps a single update pass from flooding the executor when a large
//! region is marked dirty at once.

/// Per-update limits on extraction submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulingBudget {
	/// Maximum tasks submitted per update (0 = unlimited).
	pub max_submissions_per_update: usize,
	/// Maximum tasks outstanding across updates (0 = unlimited).
	pub max_outstanding: usize,
}

impl SchedulingBudget {
	/// Submit every stale leaf on every update.
	pub const UNLIMITED: Self = Self {
		max_submissions_per_update: 0,
		max_outstanding: 0,
	};

	/// Reasonable limits for a per-frame update loop.
	pub const FRAME_LIMITED: Self = Self {
		max_submissions_per_update: 32,
		max_outstanding: 256,
	};

	/// Check if another task may be submitted.
	#[inline]
	pub fn can_submit(&self, submitted_this_update: usize, outstanding: usize) -> bool {
		(self.max_submissions_per_update == 0 || submitted_this_update < self.max_submissions_per_update)
			&& (self.max_outstanding == 0 || outstanding < self.max_outstanding)
	}
}

impl Default for SchedulingBudget {
	fn default() -> Self {
		Self::UNLIMITED
	}
}

/// Statistics from one update pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
	/// Leaves submitted for extraction.
	pub scheduled: usize,
	/// Tasks reconciled as complete.
	pub completed: usize,
	/// Tasks whose worker vanished without a result.
	pub lost: usize,
	/// Submissions refused by the executor.
	pub submit_failures: usize,
	/// Eligible leaves left for a later pass by the budget.
	pub deferred: usize,
	/// Tasks still outstanding after the pass.
	pub outstanding: usize,
}

impl UpdateStats {
	/// True if the pass neither submitted nor reconciled anything.
	#[inline]
	pub fn is_idle(&self) -> bool {
		self.scheduled == 0 && self.completed == 0 && self.lost == 0
	}
}
