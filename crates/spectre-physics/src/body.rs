// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Simulated bodies, their handles, and the descriptions they are built from.

use std::fmt;

use serde::{Deserialize, Serialize};
use spectre_geom::{Aabb, BoundingVolume, Vec3};

use crate::ports::Pose;

/// Stable handle of a body in a [`PhysicsWorld`](crate::PhysicsWorld).
///
/// Allocated monotonically and never reused, so the same value doubles as
/// the broad-phase owner key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(u64);

impl BodyId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id, as used by the broad phase.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Handle of an externally owned renderable model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RenderableId(pub u32);

/// Handle of an externally owned camera.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CameraId(pub u32);

/// What a body is; drives pair classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// Ordinary model body (dynamic or not).
    Dynamic,
    /// Gravity-free fast body removed after it hits something.
    Bullet,
    /// Body that drives a camera.
    Camera,
    /// Static walkable surface other bodies can rest on.
    Plane,
}

/// Presentation target a body pushes its pose to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// A renderable model.
    Renderable(RenderableId),
    /// A camera.
    Camera(CameraId),
}

/// Horizontal extent of a plane body around its position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Footprint {
    /// Half size along X.
    pub half_width: f32,
    /// Half size along Z.
    pub half_depth: f32,
    /// Slab depth below the walkable top.
    pub thickness: f32,
}

impl Footprint {
    /// Returns `true` if `(x, z)` lies over the plane centred at `center`.
    pub fn covers(&self, center: Vec3, x: f32, z: f32) -> bool {
        (x - center.x()).abs() <= self.half_width && (z - center.z()).abs() <= self.half_depth
    }
}

/// A simulated entity.
///
/// Owns its bounding volume (and one volume per sub-part when built from
/// several local bounds). References to other bodies and presentation
/// targets are handles resolved at use.
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) id: BodyId,
    pub(crate) kind: BodyKind,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) force: Vec3,
    pub(crate) mass: f32,
    pub(crate) gravity: f32,
    pub(crate) pitch: f32,
    pub(crate) yaw: f32,
    pub(crate) roll: f32,
    pub(crate) is_dynamic: bool,
    pub(crate) is_static: bool,
    pub(crate) is_trigger: bool,
    pub(crate) grounded: bool,
    pub(crate) height: f32,
    pub(crate) plane: Option<BodyId>,
    pub(crate) footprint: Option<Footprint>,
    pub(crate) volume: BoundingVolume,
    pub(crate) parts: Vec<BoundingVolume>,
    pub(crate) presentation: Option<Presentation>,
    pub(crate) dirty: bool,
}

impl Body {
    /// Builds a body whose volume is the hull of `bounds` (local frame).
    ///
    /// With more than one bound each is also kept as its own sub-volume.
    /// Returns `None` when `bounds` is empty.
    pub(crate) fn new(id: BodyId, kind: BodyKind, position: Vec3, bounds: &[Aabb]) -> Option<Self> {
        let corners: Vec<Vec3> = bounds.iter().flat_map(|b| [b.min(), b.max()]).collect();
        let hull = Aabb::from_points(&corners)?;
        let parts = if bounds.len() > 1 {
            bounds.iter().map(|b| BoundingVolume::new(position, b)).collect()
        } else {
            Vec::new()
        };
        Some(Self {
            id,
            kind,
            position,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            mass: 1.0,
            gravity: 1.0,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            is_dynamic: false,
            is_static: false,
            is_trigger: false,
            grounded: false,
            height: 0.0,
            plane: None,
            footprint: None,
            volume: BoundingVolume::new(position, &hull),
            parts,
            presentation: None,
            dirty: false,
        })
    }

    /// Handle.
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Kind tag.
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// World position of the origin.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Linear velocity.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Force accumulated since the last tick.
    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Mass in kilograms.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Gravity scale.
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// `(pitch, yaw, roll)` in degrees.
    pub fn angles(&self) -> (f32, f32, f32) {
        (self.pitch, self.yaw, self.roll)
    }

    /// Integrated by the tick.
    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    /// Never moved by integration or collision response.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Reports proximity to cameras instead of colliding.
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Drives a camera.
    pub fn is_camera(&self) -> bool {
        self.kind == BodyKind::Camera
    }

    /// Resting on terrain or a plane.
    pub fn grounded(&self) -> bool {
        self.grounded
    }

    /// Vertical offset from the ground contact point to the origin.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Plane the body currently rests on, if any.
    pub fn plane(&self) -> Option<BodyId> {
        self.plane
    }

    /// Walkable extent, for plane bodies.
    pub fn footprint(&self) -> Option<Footprint> {
        self.footprint
    }

    /// Whole-body bounding volume.
    pub fn volume(&self) -> &BoundingVolume {
        &self.volume
    }

    /// Per-part volumes; empty when the body has a single volume.
    pub fn parts(&self) -> &[BoundingVolume] {
        &self.parts
    }

    /// Presentation target, if any.
    pub fn presentation(&self) -> Option<Presentation> {
        self.presentation
    }

    /// Current pose.
    pub fn pose(&self) -> Pose {
        Pose { position: self.position, pitch: self.pitch, yaw: self.yaw, roll: self.roll }
    }

    /// Bodies that collision response must leave untouched.
    pub fn is_immovable(&self) -> bool {
        self.is_static || !self.is_dynamic
    }

    /// `1 / mass`, or zero for immovable bodies.
    pub fn inverse_mass(&self) -> f32 {
        if self.is_immovable() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Point test against the sub-volumes, or the whole volume when there
    /// are none.
    pub fn contains_point(&self, point: &Vec3) -> bool {
        if self.parts.is_empty() {
            self.volume.contains_point(point)
        } else {
            self.parts.iter().any(|part| part.contains_point(point))
        }
    }

    /// World boxes tracked by the broad phase, one per sweep proxy.
    pub(crate) fn sweep_boxes(&self) -> Vec<Aabb> {
        if self.parts.is_empty() {
            vec![self.volume.aabb()]
        } else {
            self.parts.iter().map(BoundingVolume::aabb).collect()
        }
    }

    /// Pushes the body pose into its volumes. Marks the body dirty and
    /// returns `true` only if a volume actually moved.
    pub(crate) fn sync_volume(&mut self) -> bool {
        let (position, pitch, yaw, roll) = (self.position, self.pitch, self.yaw, self.roll);
        let mut changed = self.volume.set_pose(position, pitch, yaw, roll);
        for part in &mut self.parts {
            changed |= part.set_pose(position, pitch, yaw, roll);
        }
        self.dirty |= changed;
        changed
    }
}

/// Description of a model body.
#[derive(Debug, Clone)]
pub struct ModelDesc {
    pub(crate) renderable: Option<RenderableId>,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) angles: (f32, f32, f32),
    pub(crate) bounds: Vec<Aabb>,
    pub(crate) is_dynamic: bool,
    pub(crate) is_static: bool,
    pub(crate) is_trigger: bool,
    pub(crate) height: f32,
    pub(crate) mass: f32,
    pub(crate) gravity: f32,
}

impl ModelDesc {
    /// A dynamic, unit-mass model at `position` with one local bound per
    /// mesh part.
    pub fn new(position: Vec3, bounds: Vec<Aabb>) -> Self {
        Self {
            renderable: None,
            position,
            velocity: Vec3::ZERO,
            angles: (0.0, 0.0, 0.0),
            bounds,
            is_dynamic: true,
            is_static: false,
            is_trigger: false,
            height: 0.0,
            mass: 1.0,
            gravity: 1.0,
        }
    }

    /// Axis-aligned cube model of half extent `half`.
    pub fn cube(position: Vec3, half: f32) -> Self {
        let half = Vec3::splat(half.abs());
        Self::new(position, vec![Aabb::new(-half, half)])
    }

    /// Renderable that receives this body's pose.
    pub fn renderable(mut self, id: RenderableId) -> Self {
        self.renderable = Some(id);
        self
    }

    /// Initial velocity.
    pub fn velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Initial pitch/yaw/roll in degrees.
    pub fn angles(mut self, pitch: f32, yaw: f32, roll: f32) -> Self {
        self.angles = (pitch, yaw, roll);
        self
    }

    /// Whether the tick integrates the body.
    pub fn dynamic(mut self, on: bool) -> Self {
        self.is_dynamic = on;
        self
    }

    /// Whether the body is static (never moved by the simulation).
    pub fn fixed(mut self, on: bool) -> Self {
        self.is_static = on;
        self
    }

    /// Whether the body is a trigger.
    pub fn trigger(mut self, on: bool) -> Self {
        self.is_trigger = on;
        self
    }

    /// Ground-to-origin offset.
    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Mass in kilograms.
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Gravity scale.
    pub fn gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }
}

/// Description of a camera body. Its volume is a cube of the configured
/// camera half extent.
#[derive(Debug, Clone)]
pub struct CameraDesc {
    pub(crate) camera: CameraId,
    pub(crate) position: Vec3,
    pub(crate) is_dynamic: bool,
    pub(crate) is_static: bool,
    pub(crate) is_trigger: bool,
    pub(crate) height: Option<f32>,
    pub(crate) mass: f32,
    pub(crate) gravity: f32,
}

impl CameraDesc {
    /// A kinematic camera at `position`.
    pub fn new(camera: CameraId, position: Vec3) -> Self {
        Self {
            camera,
            position,
            is_dynamic: false,
            is_static: false,
            is_trigger: false,
            height: None,
            mass: 1.0,
            gravity: 1.0,
        }
    }

    /// Whether the tick integrates the camera.
    pub fn dynamic(mut self, on: bool) -> Self {
        self.is_dynamic = on;
        self
    }

    /// Whether the camera is static.
    pub fn fixed(mut self, on: bool) -> Self {
        self.is_static = on;
        self
    }

    /// Whether the camera is a trigger.
    pub fn trigger(mut self, on: bool) -> Self {
        self.is_trigger = on;
        self
    }

    /// Eye height above ground; defaults to the configured camera height.
    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    /// Mass in kilograms.
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Gravity scale.
    pub fn gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn multi_part_body_tracks_hull_and_parts() {
        let bounds = vec![
            Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
            Aabb::new(Vec3::new(-0.25, 1.0, -0.25), Vec3::new(0.25, 3.0, 0.25)),
        ];
        let body = Body::new(BodyId::from_raw(1), BodyKind::Dynamic, Vec3::new(5.0, 0.0, 0.0), &bounds)
            .expect("non-empty bounds");
        assert_eq!(body.parts().len(), 2);
        assert_eq!(body.volume().aabb().min().to_array(), [4.0, 0.0, -1.0]);
        assert_eq!(body.volume().aabb().max().to_array(), [6.0, 3.0, 1.0]);
        assert_eq!(body.sweep_boxes().len(), 2);
        // Inside the hull but outside both parts.
        assert!(!body.contains_point(&Vec3::new(5.9, 2.5, 0.9)));
        assert!(body.contains_point(&Vec3::new(5.0, 2.5, 0.0)));
    }

    #[test]
    fn sync_volume_marks_dirty_only_on_change() {
        let mut body = Body::new(BodyId::from_raw(1), BodyKind::Dynamic, Vec3::ZERO, &[Aabb::new(
            Vec3::splat(-0.5),
            Vec3::splat(0.5),
        )])
        .expect("bounds");
        assert!(!body.sync_volume());
        assert!(!body.dirty);
        body.position = Vec3::UNIT_X;
        assert!(body.sync_volume());
        assert!(body.dirty);
        assert_eq!(body.volume().aabb().min().to_array(), [0.5, -0.5, -0.5]);
    }

    #[test]
    fn immovable_bodies_have_zero_inverse_mass() {
        let mut body = Body::new(BodyId::from_raw(1), BodyKind::Dynamic, Vec3::ZERO, &[Aabb::new(
            Vec3::splat(-0.5),
            Vec3::splat(0.5),
        )])
        .expect("bounds");
        assert_eq!(body.inverse_mass(), 0.0);
        body.is_dynamic = true;
        body.mass = 4.0;
        assert_eq!(body.inverse_mass(), 0.25);
        body.is_static = true;
        assert_eq!(body.inverse_mass(), 0.0);
        assert!(Body::new(BodyId::from_raw(2), BodyKind::Dynamic, Vec3::ZERO, &[]).is_none());
    }
}
