// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON scenario files: a config, a terrain, and the bodies to spawn.

use anyhow::{Context, Result};
use serde::Deserialize;
use spectre_geom::{Aabb, Vec3};
use spectre_physics::{
    CameraDesc, CameraId, FlatGround, HeightField, Heightmap, ModelDesc, PhysicsConfig, PhysicsWorld,
    RenderableId,
};

/// A whole scenario as read from disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    /// Overrides on top of [`PhysicsConfig::default`].
    pub config: PhysicsConfig,
    /// Ground the bodies settle on.
    pub terrain: TerrainSpec,
    /// Bodies spawned in listed order; ids follow that order.
    pub bodies: Vec<BodySpec>,
    /// Projectiles fired before the first tick.
    pub projectiles: Vec<ProjectileSpec>,
}

/// Terrain description.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum TerrainSpec {
    /// Constant height everywhere.
    Flat {
        /// Ground height.
        #[serde(default)]
        height: f32,
    },
    /// Square grid of height samples, row-major along z.
    Heightmap {
        /// Samples per side.
        size: usize,
        /// World distance between neighbouring samples.
        spacing: f32,
        /// World `(x, z)` of sample `(0, 0)`.
        #[serde(default)]
        origin: [f32; 2],
        /// `size * size` samples.
        heights: Vec<f32>,
    },
}

impl Default for TerrainSpec {
    fn default() -> Self {
        Self::Flat { height: 0.0 }
    }
}

impl TerrainSpec {
    /// Builds the described height field.
    pub fn build(&self) -> Result<Box<dyn HeightField>> {
        Ok(match self {
            Self::Flat { height } => Box::new(FlatGround(*height)),
            Self::Heightmap { size, spacing, origin, heights } => Box::new(
                Heightmap::new(*size, *spacing, (origin[0], origin[1]), heights.clone())
                    .context("invalid heightmap terrain")?,
            ),
        })
    }
}

/// Local bound of one model part.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundSpec {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Maximum corner.
    pub max: [f32; 3],
}

/// One body to spawn.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum BodySpec {
    /// A model with one bound per mesh part.
    Model {
        /// World position of the body origin.
        position: [f32; 3],
        /// Per-part local bounds. Takes precedence over `half_extent`.
        #[serde(default)]
        bounds: Vec<BoundSpec>,
        /// Shorthand for a single cube part.
        half_extent: Option<f32>,
        /// Initial velocity.
        #[serde(default)]
        velocity: [f32; 3],
        /// Pitch, yaw, roll in degrees.
        #[serde(default)]
        angles: [f32; 3],
        /// Renderable that receives the body's pose.
        renderable: Option<u32>,
        /// Integrates forces; defaults to `!static`.
        dynamic: Option<bool>,
        /// Never moved by collisions.
        #[serde(default, rename = "static")]
        fixed: bool,
        /// Reports cameras instead of colliding.
        #[serde(default)]
        trigger: bool,
        /// Origin offset above the ground contact point.
        height: Option<f32>,
        /// Mass of a dynamic body.
        mass: Option<f32>,
        /// Gravity scale.
        gravity: Option<f32>,
    },
    /// A camera rig.
    Camera {
        /// Camera that receives the body's pose.
        camera: u32,
        /// World position of the camera.
        position: [f32; 3],
        /// Falls under gravity and rests on the ground.
        #[serde(default)]
        dynamic: bool,
        /// Reports other cameras instead of colliding.
        #[serde(default)]
        trigger: bool,
        /// Eye height above the ground; defaults to `camera_height`.
        height: Option<f32>,
        /// Mass of a dynamic camera.
        mass: Option<f32>,
        /// Gravity scale.
        gravity: Option<f32>,
    },
    /// A thin static platform whose top face sits at `position.y`.
    Plane {
        /// Centre of the top face.
        position: [f32; 3],
        /// Extent along X.
        width: f32,
        /// Extent along Z.
        depth: f32,
    },
    /// A small dynamic box that is removed on its first hit.
    Bullet {
        /// Start position.
        position: [f32; 3],
        /// Constant velocity; bullets ignore gravity.
        velocity: [f32; 3],
    },
}

/// A point projectile fired before the first tick.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectileSpec {
    /// Start point.
    pub origin: [f32; 3],
    /// Travel direction; normalized on fire.
    pub direction: [f32; 3],
    /// Speed in units per second.
    pub speed: f32,
}

impl Scenario {
    /// Parses a scenario from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse scenario JSON")
    }

    /// Builds a world holding every listed body and projectile.
    pub fn build_world(&self) -> Result<PhysicsWorld> {
        let mut world = PhysicsWorld::new(self.config.clone()).context("invalid physics config")?;
        for (index, spec) in self.bodies.iter().enumerate() {
            spawn(&mut world, spec).with_context(|| format!("failed to spawn body #{index}"))?;
        }
        for p in &self.projectiles {
            world.fire_projectile(p.origin.into(), p.direction.into(), p.speed);
        }
        Ok(world)
    }
}

fn spawn(world: &mut PhysicsWorld, spec: &BodySpec) -> Result<()> {
    match spec {
        BodySpec::Model {
            position,
            bounds,
            half_extent,
            velocity,
            angles,
            renderable,
            dynamic,
            fixed,
            trigger,
            height,
            mass,
            gravity,
        } => {
            let position = Vec3::from(*position);
            let mut desc = if bounds.is_empty() {
                let half = half_extent.context("model needs `bounds` or `half_extent`")?;
                ModelDesc::cube(position, half)
            } else {
                let parts = bounds.iter().map(|b| Aabb::new(b.min.into(), b.max.into())).collect();
                ModelDesc::new(position, parts)
            };
            desc = desc
                .velocity((*velocity).into())
                .angles(angles[0], angles[1], angles[2])
                .dynamic(dynamic.unwrap_or(!*fixed))
                .fixed(*fixed)
                .trigger(*trigger);
            if let Some(id) = renderable {
                desc = desc.renderable(RenderableId(*id));
            }
            if let Some(h) = height {
                desc = desc.height(*h);
            }
            if let Some(m) = mass {
                desc = desc.mass(*m);
            }
            if let Some(g) = gravity {
                desc = desc.gravity(*g);
            }
            world.add_model(desc)?;
        }
        BodySpec::Camera { camera, position, dynamic, trigger, height, mass, gravity } => {
            let mut desc =
                CameraDesc::new(CameraId(*camera), (*position).into()).dynamic(*dynamic).trigger(*trigger);
            if let Some(h) = height {
                desc = desc.height(*h);
            }
            if let Some(m) = mass {
                desc = desc.mass(*m);
            }
            if let Some(g) = gravity {
                desc = desc.gravity(*g);
            }
            world.add_camera(desc)?;
        }
        BodySpec::Plane { position, width, depth } => {
            world.add_plane((*position).into(), *width, *depth)?;
        }
        BodySpec::Bullet { position, velocity } => {
            world.add_bullet((*position).into(), (*velocity).into())?;
        }
    }
    Ok(())
}
