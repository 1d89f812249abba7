// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use spectre_geom::SweepError;
use thiserror::Error;

use crate::body::BodyId;

/// Errors emitted by the physics world.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// The body id does not name a live body.
    #[error("unknown body: {0}")]
    UnknownBody(BodyId),
    /// Dynamic bodies need a positive, finite mass.
    #[error("dynamic body mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    /// A body description was rejected at construction.
    #[error("invalid body: {0}")]
    InvalidBody(String),
    /// The height field has no sample at this position.
    #[error("no terrain height at ({x}, {z})")]
    HeightUnavailable {
        /// World x.
        x: f32,
        /// World z.
        z: f32,
    },
    /// A position, velocity, force, angle or scale was NaN or infinite.
    #[error("non-finite {0}")]
    NonFinite(&'static str),
    /// The timestep is negative or not finite.
    #[error("invalid timestep: {0}")]
    InvalidTimestep(f32),
    /// A tuning value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Heightmap dimensions or samples are unusable.
    #[error("invalid heightmap: {0}")]
    InvalidHeightmap(String),
    /// The broad phase rejected an operation.
    #[error(transparent)]
    Sweep(#[from] SweepError),
}
