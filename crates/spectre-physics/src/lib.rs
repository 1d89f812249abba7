// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Real-time collision and rigid-body core for Spectre.

A [`PhysicsWorld`] owns every body and an incremental sweep-and-prune. Each
tick advances projectiles, integrates forces, grounds bodies against terrain
or resting planes, re-sweeps moved volumes, resolves each colliding pair once
with a sphere-approximated impulse, and pushes final poses to a
[`PresentationPort`].

Collaborators are ports: terrain is a [`HeightField`], renderables and
cameras are reached through [`PresentationPort`], and callers drive the
simulation through [`update`] on a [`SimContext`].

Design notes:
- Deterministic: bodies are processed in id order and pair lists are sorted.
- Ids are monotonic handles; removing a body purges every broad-phase entry
  and every reference other bodies hold to it.
- Invariant violations assert in debug builds and skip the pair in release.
"]

/// Bodies, handles, and body descriptions.
pub mod body;
/// Pair classification and impulse resolution.
pub mod collider;
/// Tuning constants.
pub mod config;
/// Simulation context and entry point.
pub mod context;
/// Presentation port and in-memory recorders.
pub mod ports;
/// Projectiles.
pub mod projectile;
/// Height fields.
pub mod terrain;
/// The world and tick pipeline.
pub mod world;

mod error;

pub use body::{Body, BodyId, BodyKind, CameraDesc, CameraId, Footprint, ModelDesc, Presentation, RenderableId};
pub use collider::{classify, Collider, Contact, PairResponse};
pub use config::PhysicsConfig;
pub use context::{update, SimContext};
pub use error::PhysicsError;
pub use ports::{NullPresentation, Pose, PoseRecorder, PresentationPort};
pub use projectile::{Projectile, ProjectileHit, ProjectileId};
pub use terrain::{FlatGround, HeightField, Heightmap};
pub use world::{BulletHit, PhysicsWorld};
