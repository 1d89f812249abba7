// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Explicit simulation context and the per-frame entry point.

use crate::error::PhysicsError;
use crate::ports::PresentationPort;
use crate::terrain::HeightField;
use crate::world::PhysicsWorld;

/// Everything one simulation step touches.
///
/// Input handling lives outside the core and talks to `world` through
/// `apply_force`, `fire_projectile`, and `update_pyr` between updates.
#[derive(Debug)]
pub struct SimContext<T, P> {
    /// The simulated world.
    pub world: PhysicsWorld,
    /// Ground height source.
    pub terrain: T,
    /// Pose sink for renderables and cameras.
    pub presentation: P,
}

impl<T, P> SimContext<T, P> {
    /// Bundles a world with its collaborators.
    pub fn new(world: PhysicsWorld, terrain: T, presentation: P) -> Self {
        Self { world, terrain, presentation }
    }
}

/// Advances `ctx` by one tick of `dt` seconds.
pub fn update<T, P>(ctx: &mut SimContext<T, P>, dt: f32) -> Result<(), PhysicsError>
where
    T: HeightField,
    P: PresentationPort,
{
    ctx.world.tick(dt, &ctx.terrain, &mut ctx.presentation)
}
