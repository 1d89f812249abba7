// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::Vec3;

/// Bounding sphere used by the narrow phase as a cheap stand-in for a box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Creates a sphere; negative radii are stored as their magnitude.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius: radius.abs() }
    }

    /// Centre point.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Radius in metres.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Depth of overlap with `other`; positive when the spheres interpenetrate.
    pub fn penetration(&self, other: &Self) -> f32 {
        (self.radius + other.radius) - self.center.distance(&other.center)
    }

    /// Returns `true` when the spheres touch or overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.penetration(other) >= 0.0
    }
}
