// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Mat4, Vec3};
use crate::types::aabb::Aabb;
use crate::types::sphere::Sphere;

/// Oriented box tracked by its world-space axis-aligned hull.
///
/// The box is described locally by a centre offset and half-extents around
/// the owner's origin. Whenever the pose changes the eight local corners are
/// rotated by pitch/yaw/roll, translated to `position`, and the world bounds
/// become their componentwise min/max.
///
/// Invariant: `aabb()` is always the hull of the eight posed corners. The
/// bounds are only changed through [`translate`](Self::translate),
/// [`rotate`](Self::rotate), [`set_pose`](Self::set_pose) or
/// [`update_aabb`](Self::update_aabb).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingVolume {
    position: Vec3,
    pitch: f32,
    yaw: f32,
    roll: f32,
    rotation: Mat4,
    axes: [Vec3; 3],
    local_center: Vec3,
    extents: Vec3,
    bounds: Aabb,
}

impl BoundingVolume {
    /// Creates a volume at `position` from bounds expressed in the owner's
    /// local frame (e.g. a mesh AABB).
    pub fn new(position: Vec3, local: &Aabb) -> Self {
        let mut volume = Self {
            position,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            rotation: Mat4::identity(),
            axes: [Vec3::UNIT_X, Vec3::UNIT_Y, Vec3::UNIT_Z],
            local_center: local.center(),
            extents: local.half_extents(),
            bounds: Aabb::from_center_half_extents(position, Vec3::ZERO),
        };
        volume.update_aabb();
        volume
    }

    /// Axis-aligned cube of half-extent `half` centred on `position`.
    pub fn cube(position: Vec3, half: f32) -> Self {
        let half = half.abs();
        Self::new(position, &Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(half)))
    }

    /// Rebuilds the rotation matrix from pitch/yaw/roll and re-derives the
    /// principal axes.
    pub fn update_rotation(&mut self) {
        self.rotation = Mat4::from_pitch_yaw_roll(self.pitch, self.yaw, self.roll);
        self.axes = [self.rotation.column(0), self.rotation.column(1), self.rotation.column(2)];
    }

    /// Moves the volume by `delta` and recomputes the bounds.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.update_aabb();
    }

    /// Adds the given angles (degrees) and recomputes rotation and bounds.
    pub fn rotate(&mut self, d_pitch: f32, d_yaw: f32, d_roll: f32) {
        self.pitch += d_pitch;
        self.yaw += d_yaw;
        self.roll += d_roll;
        self.update_rotation();
        self.update_aabb();
    }

    /// Applies an absolute pose: rotation first, then translation, then the
    /// hull recompute.
    ///
    /// Returns `false` without touching anything when the pose is unchanged.
    pub fn set_pose(&mut self, position: Vec3, pitch: f32, yaw: f32, roll: f32) -> bool {
        let angles_changed = self.pitch != pitch || self.yaw != yaw || self.roll != roll;
        if !angles_changed && self.position == position {
            return false;
        }
        if angles_changed {
            self.pitch = pitch;
            self.yaw = yaw;
            self.roll = roll;
            self.update_rotation();
        }
        self.position = position;
        self.update_aabb();
        true
    }

    /// Recomputes the world bounds from the eight posed corners.
    ///
    /// Idempotent: calling it again without a pose change yields identical
    /// bounds.
    pub fn update_aabb(&mut self) {
        let [ex, ey, ez] = self.extents.to_array();
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for sx in [-1.0_f32, 1.0] {
            for sy in [-1.0_f32, 1.0] {
                for sz in [-1.0_f32, 1.0] {
                    let local = self.local_center + Vec3::new(sx * ex, sy * ey, sz * ez);
                    let world = self.rotation.transform_direction(&local) + self.position;
                    min = min.min(&world);
                    max = max.max(&world);
                }
            }
        }
        self.bounds = Aabb::new(min, max);
    }

    /// Padded overlap test: reports volumes separated by a gap of at most
    /// `padding` on every axis.
    ///
    /// Used for trigger proximity, not for broad-phase pairing.
    pub fn intersects(&self, other: &Self, padding: f32) -> bool {
        self.bounds.inflate(padding).overlaps(&other.bounds)
    }

    /// Point-in-box test against the world bounds.
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.bounds.contains_point(point)
    }

    /// Sphere centred on the bounds with radius reaching the max corner.
    pub fn bounding_sphere(&self) -> Sphere {
        let center = self.bounds.center();
        Sphere::new(center, center.distance(&self.bounds.max()))
    }

    /// World-space bounds.
    pub fn aabb(&self) -> Aabb {
        self.bounds
    }

    /// World position of the owner's origin.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// `(pitch, yaw, roll)` in degrees.
    pub fn angles(&self) -> (f32, f32, f32) {
        (self.pitch, self.yaw, self.roll)
    }

    /// Current rotation matrix.
    pub fn rotation(&self) -> Mat4 {
        self.rotation
    }

    /// Rotated local axes (right, up, forward).
    pub fn axes(&self) -> [Vec3; 3] {
        self.axes
    }

    /// Local half-extents.
    pub fn extents(&self) -> Vec3 {
        self.extents
    }
}
