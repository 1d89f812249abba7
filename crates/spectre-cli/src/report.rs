// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON summary of a headless run.

use serde::Serialize;
use spectre_physics::{Body, BodyKind, PhysicsWorld, Pose, PoseRecorder};

/// Everything a run produced.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Ticks stepped.
    pub ticks: u64,
    /// Final state of every live body, in id order.
    pub bodies: Vec<BodyReport>,
    /// Per-tick events, in the order they happened.
    pub events: Vec<Event>,
    /// Last pose pushed to each renderable.
    pub renderables: Vec<PresentedPose>,
    /// Last pose pushed to each camera.
    pub cameras: Vec<PresentedPose>,
    /// Projectiles still in flight.
    pub projectiles_in_flight: usize,
}

/// Final state of one body.
#[derive(Debug, Serialize)]
pub struct BodyReport {
    pub id: u64,
    pub kind: BodyKind,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub grounded: bool,
    pub plane: Option<u64>,
}

impl From<&Body> for BodyReport {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id().raw(),
            kind: body.kind(),
            position: body.position().to_array(),
            velocity: body.velocity().to_array(),
            grounded: body.grounded(),
            plane: body.plane().map(spectre_physics::BodyId::raw),
        }
    }
}

/// Something observable that happened during one tick.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A trigger fired.
    Trigger { tick: u64, trigger: u64 },
    /// A bullet body struck another body and was removed.
    BulletHit { tick: u64, bullet: u64, target: u64 },
    /// A point projectile struck a body.
    ProjectileHit { tick: u64, projectile: u64, target: u64, point: [f32; 3] },
}

/// Pose recorded for a presentation id.
#[derive(Debug, Serialize)]
pub struct PresentedPose {
    pub id: u32,
    pub position: [f32; 3],
    /// Pitch, yaw, roll in degrees.
    pub angles: [f32; 3],
}

impl PresentedPose {
    fn new(id: u32, pose: &Pose) -> Self {
        Self { id, position: pose.position.to_array(), angles: [pose.pitch, pose.yaw, pose.roll] }
    }
}

impl RunReport {
    /// Appends the events `world` reported for the tick it just stepped.
    pub fn record_tick(&mut self, world: &PhysicsWorld) {
        let tick = world.ticks();
        self.events.extend(world.triggers().iter().map(|id| Event::Trigger { tick, trigger: id.raw() }));
        self.events.extend(
            world
                .hits()
                .iter()
                .map(|hit| Event::BulletHit { tick, bullet: hit.bullet.raw(), target: hit.target.raw() }),
        );
        self.events.extend(world.projectile_hits().iter().map(|hit| Event::ProjectileHit {
            tick,
            projectile: hit.projectile.raw(),
            target: hit.target.raw(),
            point: hit.point.to_array(),
        }));
    }

    /// Fills the final snapshot from the world and the presentation log.
    pub fn finish(&mut self, world: &PhysicsWorld, presented: &PoseRecorder) {
        self.ticks = world.ticks();
        self.bodies = world.bodies().map(BodyReport::from).collect();
        self.renderables = presented.renderables().map(|(id, pose)| PresentedPose::new(id.0, pose)).collect();
        self.cameras = presented.cameras().map(|(id, pose)| PresentedPose::new(id.0, pose)).collect();
        self.projectiles_in_flight = world.projectiles().len();
    }
}
