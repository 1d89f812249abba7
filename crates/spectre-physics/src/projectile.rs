// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Point projectiles advanced by multi-sampled ray marching.

use std::collections::BTreeMap;

use spectre_geom::Vec3;

use crate::body::{Body, BodyId};

/// Stable handle of a live projectile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectileId(u64);

impl ProjectileId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A massless point travelling in a straight line.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projectile {
    id: ProjectileId,
    position: Vec3,
    velocity: Vec3,
    lifetime: f32,
}

/// A projectile that struck a body this tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectileHit {
    /// The projectile, already removed from the live list.
    pub projectile: ProjectileId,
    /// The body it struck.
    pub target: BodyId,
    /// First sample point found inside the target.
    pub point: Vec3,
}

impl Projectile {
    pub(crate) fn new(id: ProjectileId, position: Vec3, velocity: Vec3, lifetime: f32) -> Self {
        Self { id, position, velocity, lifetime }
    }

    /// Handle.
    pub fn id(&self) -> ProjectileId {
        self.id
    }

    /// Current position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Velocity.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Seconds left before expiry.
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Samples `substeps` evenly spaced points along this tick's path and
    /// returns the first one inside a non-camera body. Bodies are tested in
    /// id order, so ties go to the lowest id.
    ///
    /// Advances position (to the hit point on a hit) and spends `dt` of
    /// lifetime.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn advance(&mut self, dt: f32, substeps: u32, bodies: &BTreeMap<BodyId, Body>) -> Option<ProjectileHit> {
        let step = dt / substeps as f32;
        self.lifetime -= dt;
        for k in 1..=substeps {
            let point = self.position + self.velocity * (step * k as f32);
            let target = bodies.values().find(|body| !body.is_camera() && body.contains_point(&point));
            if let Some(body) = target {
                self.position = point;
                return Some(ProjectileHit { projectile: self.id, target: body.id(), point });
            }
        }
        self.position += self.velocity * dt;
        None
    }

    /// Returns `true` once lifetime is spent.
    pub fn expired(&self) -> bool {
        self.lifetime <= 0.0
    }
}
