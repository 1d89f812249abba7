// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Broad-phase queries and narrow-phase impulse resolution.

use std::collections::BTreeMap;

use spectre_geom::{BroadPair, SweepAndPrune, Vec3};
use tracing::{trace, warn};

use crate::body::{Body, BodyId, BodyKind};
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;

/// How a candidate pair is handled, decided by [`classify`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PairResponse {
    /// Solid contact: impulse plus penetration correction.
    Impulse,
    /// A trigger overlapping a camera.
    Trigger {
        /// The trigger body.
        trigger: BodyId,
        /// The camera body.
        camera: BodyId,
    },
    /// A dynamic body landing on a plane from above.
    Ground {
        /// The plane.
        plane: BodyId,
        /// The body that rests on it.
        body: BodyId,
    },
    /// A bullet striking a non-bullet.
    Hit {
        /// The bullet.
        bullet: BodyId,
        /// What it struck.
        target: BodyId,
    },
    /// No response.
    Ignore,
}

/// A pair whose response is handled outside impulse resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Contact {
    /// The broad-phase pair.
    pub pair: BroadPair,
    /// Its classification.
    pub response: PairResponse,
}

/// Dispatch table over body kinds and flags.
///
/// Trigger rules come first: a trigger only ever reports cameras. Bullets
/// hit everything but other bullets. Planes only catch movable bodies whose
/// origin is above the plane top. A camera volume is never solid. Two
/// static bodies never interact.
pub fn classify(a: &Body, b: &Body) -> PairResponse {
    if a.is_trigger || b.is_trigger {
        return if a.is_trigger && b.is_camera() {
            PairResponse::Trigger { trigger: a.id, camera: b.id }
        } else if b.is_trigger && a.is_camera() {
            PairResponse::Trigger { trigger: b.id, camera: a.id }
        } else {
            PairResponse::Ignore
        };
    }
    match (a.kind, b.kind) {
        (BodyKind::Bullet, BodyKind::Bullet) | (BodyKind::Plane, BodyKind::Plane) => PairResponse::Ignore,
        (BodyKind::Bullet, _) => PairResponse::Hit { bullet: a.id, target: b.id },
        (_, BodyKind::Bullet) => PairResponse::Hit { bullet: b.id, target: a.id },
        (BodyKind::Plane, _) => landing(a, b),
        (_, BodyKind::Plane) => landing(b, a),
        (BodyKind::Camera, _) | (_, BodyKind::Camera) => PairResponse::Ignore,
        _ if a.is_static && b.is_static => PairResponse::Ignore,
        _ => PairResponse::Impulse,
    }
}

fn landing(plane: &Body, body: &Body) -> PairResponse {
    if !body.is_immovable() && body.position.y() > plane.position.y() {
        PairResponse::Ground { plane: plane.id, body: body.id }
    } else {
        PairResponse::Ignore
    }
}

/// Velocity and position changes for one impulse pair.
struct Response {
    dv_a: Vec3,
    dp_a: Vec3,
    dv_b: Vec3,
    dp_b: Vec3,
}

/// Runs the broad phase for one body and resolves candidate pairs.
///
/// Holds only tuning values; the broad phase and bodies are passed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    restitution: f32,
    correction_percent: f32,
    penetration_slop: f32,
}

impl Default for Collider {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl Collider {
    /// Takes the response tunables from `config`.
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            restitution: config.restitution,
            correction_percent: config.correction_percent,
            penetration_slop: config.penetration_slop,
        }
    }

    /// Re-sweeps `body` if its volume moved since the last sweep, then
    /// returns every true collision involving it.
    pub fn broad_collide(&self, sweep: &mut SweepAndPrune, body: &mut Body) -> Result<Vec<BroadPair>, PhysicsError> {
        if body.dirty {
            sweep.update_object(body.id.raw(), &body.sweep_boxes())?;
            body.dirty = false;
        }
        Ok(sweep.collisions_of(body.id.raw()))
    }

    /// Resolves `pairs` against `bodies`.
    ///
    /// Impulse pairs are approximated by bounding spheres; pairs that are
    /// separating, or whose spheres do not overlap, are skipped. Every other
    /// classified pair is returned for the world to route.
    pub fn resolve_collisions(&self, pairs: &[BroadPair], bodies: &mut BTreeMap<BodyId, Body>) -> Vec<Contact> {
        let mut routed = Vec::new();
        for &pair in pairs {
            let ids = (BodyId::from_raw(pair.a()), BodyId::from_raw(pair.b()));
            let found = bodies.get(&ids.0).zip(bodies.get(&ids.1));
            debug_assert!(found.is_some(), "pair {pair:?} references a removed body");
            let Some((a, b)) = found else {
                warn!(?pair, "skipping pair with a removed body");
                continue;
            };
            match classify(a, b) {
                PairResponse::Impulse => {
                    let Some(response) = self.impulse(a, b) else {
                        continue;
                    };
                    trace!(a = %a.id, b = %b.id, "resolved impulse pair");
                    if let Some(a) = bodies.get_mut(&ids.0) {
                        a.velocity += response.dv_a;
                        a.position += response.dp_a;
                        a.sync_volume();
                    }
                    if let Some(b) = bodies.get_mut(&ids.1) {
                        b.velocity += response.dv_b;
                        b.position += response.dp_b;
                        b.sync_volume();
                    }
                }
                PairResponse::Ignore => {}
                response => routed.push(Contact { pair, response }),
            }
        }
        routed
    }

    fn impulse(&self, a: &Body, b: &Body) -> Option<Response> {
        let inv_a = a.inverse_mass();
        let inv_b = b.inverse_mass();
        let inv_sum = inv_a + inv_b;
        if inv_sum <= 0.0 {
            return None;
        }
        let sa = a.volume.bounding_sphere();
        let sb = b.volume.bounding_sphere();
        let penetration = sa.penetration(&sb);
        if penetration < 0.0 {
            return None;
        }
        let normal = (sb.center() - sa.center()).normalize();
        let rv = (b.velocity - a.velocity).dot(&normal);
        if rv >= 0.0 {
            return None;
        }
        let j = -(1.0 + self.restitution) * rv / inv_sum;
        let impulse = normal * j;
        let correction = normal * ((penetration - self.penetration_slop).max(0.0) / inv_sum * self.correction_percent);
        Some(Response {
            dv_a: -impulse * inv_a,
            dp_a: -correction * inv_a,
            dv_b: impulse * inv_b,
            dp_b: correction * inv_b,
        })
    }
}
