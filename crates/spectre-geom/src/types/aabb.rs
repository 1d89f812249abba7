// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Axis, Vec3};

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Values are `f32` metres in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// # Panics
    /// Panics if any component of `min` is greater than its counterpart in
    /// `max` (this includes NaN components).
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let a = min.to_array();
        let b = max.to_array();
        assert!(a[0] <= b[0] && a[1] <= b[1] && a[2] <= b[2], "invalid AABB: min > max");
        Self { min, max }
    }

    /// Builds an AABB centred at `center` with half-extents `he`.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, he: Vec3) -> Self {
        Self::new(center - he, center + he)
    }

    /// Builds the minimal AABB containing every point.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-extents along each axis.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// `(min, max)` interval along `axis`.
    #[must_use]
    pub fn axis_range(&self, axis: Axis) -> (f32, f32) {
        (self.min.axis(axis), self.max.axis(axis))
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        // Inclusive so touching faces pair up, matching the sweep's endpoint order.
        Axis::ALL.iter().all(|&axis| {
            let (a_min, a_max) = self.axis_range(axis);
            let (b_min, b_max) = other.axis_range(axis);
            a_min <= b_max && b_min <= a_max
        })
    }

    /// Returns `true` if `point` lies inside or on the box.
    #[must_use]
    pub fn contains_point(&self, point: &Vec3) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let (lo, hi) = self.axis_range(axis);
            let v = point.axis(axis);
            lo <= v && v <= hi
        })
    }

    /// Inflates the box by a uniform margin `m` in all directions.
    ///
    /// Negative margins are clamped so the box never inverts.
    #[must_use]
    pub fn inflate(&self, m: f32) -> Self {
        let min = self.min - Vec3::splat(m);
        let max = self.max + Vec3::splat(m);
        let center = self.center();
        Self { min: min.min(&center), max: max.max(&center) }
    }
}
