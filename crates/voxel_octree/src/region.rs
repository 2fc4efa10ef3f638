//! Integer axis-aligned regions and the two boundary conventions.

use glam::IVec3;

/// Integer axis-aligned box.
///
/// The lower corner is `(x, y, z)` and the upper corner is
/// `lower + (width, height, depth)`. Both corners are inclusive; how many
/// units the box spans depends on the [`ConstructionMode`] reading it.
/// Corner arithmetic saturates at the `i32` range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
	pub x: i32,
	pub y: i32,
	pub z: i32,
	pub width: i32,
	pub height: i32,
	pub depth: i32,
}

impl Region {
	/// Create a region from its lower corner and extents.
	///
	/// # Panics
	/// Debug-asserts that all extents are non-negative.
	pub const fn new(x: i32, y: i32, z: i32, width: i32, height: i32, depth: i32) -> Self {
		debug_assert!(width >= 0 && height >= 0 && depth >= 0, "Region extents must be >= 0");
		Self {
			x,
			y,
			z,
			width,
			height,
			depth,
		}
	}

	/// Create a region from inclusive lower and upper corners.
	pub fn from_corners(lower: IVec3, upper: IVec3) -> Self {
		let extent = upper.saturating_sub(lower);
		Self::new(lower.x, lower.y, lower.z, extent.x, extent.y, extent.z)
	}

	/// Cube with the given lower corner and extent on every axis.
	pub const fn cube(lower: IVec3, extent: i32) -> Self {
		Self::new(lower.x, lower.y, lower.z, extent, extent, extent)
	}

	#[inline]
	pub fn lower(&self) -> IVec3 {
		IVec3::new(self.x, self.y, self.z)
	}

	#[inline]
	pub fn upper(&self) -> IVec3 {
		self.lower().saturating_add(self.extent())
	}

	#[inline]
	pub fn extent(&self) -> IVec3 {
		IVec3::new(self.width, self.height, self.depth)
	}

	/// Largest of the three extents.
	#[inline]
	pub fn largest_extent(&self) -> i32 {
		self.width.max(self.height).max(self.depth)
	}

	/// Check if two regions share at least one point.
	///
	/// Touching faces count as intersecting.
	#[inline]
	pub fn intersects(&self, other: &Region) -> bool {
		let (a_lo, a_hi) = (self.lower(), self.upper());
		let (b_lo, b_hi) = (other.lower(), other.upper());
		a_lo.cmple(b_hi).all() && b_lo.cmple(a_hi).all()
	}

	/// Check if two regions share at least one unit cell.
	///
	/// Regions that only touch along a face, edge or corner do not.
	#[inline]
	pub fn shares_cells(&self, other: &Region) -> bool {
		let (a_lo, a_hi) = (self.lower(), self.upper());
		let (b_lo, b_hi) = (other.lower(), other.upper());
		a_lo.cmplt(b_hi).all() && b_lo.cmplt(a_hi).all()
	}

	/// Check if a point lies inside the region (boundary inclusive).
	#[inline]
	pub fn contains_point(&self, point: IVec3) -> bool {
		self.lower().cmple(point).all() && point.cmple(self.upper()).all()
	}

	/// Check if `other` lies entirely inside this region.
	#[inline]
	pub fn contains_region(&self, other: &Region) -> bool {
		self.contains_point(other.lower()) && self.contains_point(other.upper())
	}

	/// Move the upper corner, leaving the lower corner in place.
	pub fn shift_upper_corner(&self, dx: i32, dy: i32, dz: i32) -> Self {
		Self {
			width: self.width.saturating_add(dx),
			height: self.height.saturating_add(dy),
			depth: self.depth.saturating_add(dz),
			..*self
		}
	}

	/// Expand symmetrically: the lower corner moves by `-d` and the upper
	/// corner by `+d` on each axis. Negative amounts shrink.
	pub fn grow(&self, dx: i32, dy: i32, dz: i32) -> Self {
		Self {
			x: self.x.saturating_sub(dx),
			y: self.y.saturating_sub(dy),
			z: self.z.saturating_sub(dz),
			width: self.width.saturating_add(dx.saturating_mul(2)),
			height: self.height.saturating_add(dy.saturating_mul(2)),
			depth: self.depth.saturating_add(dz.saturating_mul(2)),
		}
	}
}

/// How a region's corners map onto the units the octree subdivides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConstructionMode {
	/// Corners are voxel sample points; a region spans `extent + 1` voxels.
	#[default]
	BoundVoxels,
	/// Corners are cell boundaries; a region spans `extent` cells.
	BoundCells,
}

impl ConstructionMode {
	/// Number of units a region spans along X under this mode.
	#[inline]
	pub fn edge_length(self, region: &Region) -> i32 {
		self.unit_extent(region).x
	}

	/// Units spanned on every axis.
	#[inline]
	pub fn unit_extent(self, region: &Region) -> IVec3 {
		match self {
			Self::BoundVoxels => region.extent().saturating_add(IVec3::ONE),
			Self::BoundCells => region.extent(),
		}
	}

	/// Intersection test matching this mode's boundary convention.
	#[inline]
	pub fn intersects(self, a: &Region, b: &Region) -> bool {
		match self {
			Self::BoundVoxels => a.intersects(b),
			Self::BoundCells => a.shares_cells(b),
		}
	}

	/// Region owning exactly the unit at `point`.
	#[inline]
	pub fn point_region(self, point: IVec3) -> Region {
		match self {
			Self::BoundVoxels => Region::cube(point, 0),
			Self::BoundCells => Region::cube(point, 1),
		}
	}

	/// Region of `size` units per axis starting at `lower`.
	#[inline]
	pub fn sized_region(self, lower: IVec3, size: i32) -> Region {
		match self {
			Self::BoundVoxels => Region::cube(lower, size - 1),
			Self::BoundCells => Region::cube(lower, size),
		}
	}

	/// Check if the unit at `point` belongs to `region`.
	#[inline]
	pub fn owns_point(self, region: &Region, point: IVec3) -> bool {
		self.intersects(region, &self.point_region(point))
	}
}
