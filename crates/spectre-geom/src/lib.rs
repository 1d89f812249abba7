// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry for the Spectre physics core.

This crate provides:
- Float32 vector and column-major matrix math (`Vec3`, `Mat4`).
- Axis-aligned bounding boxes (`Aabb`) and bounding spheres (`Sphere`).
- Oriented bounding volumes that track their world-space hull (`BoundingVolume`).
- A broad-phase trait, an incremental three-axis sweep-and-prune, and an
  all-pairs reference it is tested against.

Design notes:
- Deterministic: no ambient RNG; pair output is canonical and sorted.
- Overlap is inclusive on faces everywhere, so touching boxes pair up.
- Rustdoc is treated as part of the contract; public items are documented.
"]

/// Broad-phase pairing.
pub mod broad;
/// Vectors, matrices, and axes.
pub mod math;
/// Foundational geometric types.
pub mod types;

mod error;

pub use broad::sweep_prune::{AxisSet, ProxyId, SweepAndPrune};
pub use broad::{BroadPair, BroadPhase};
pub use error::SweepError;
pub use math::{Axis, Mat4, Vec3};
pub use types::aabb::Aabb;
pub use types::bounding_volume::BoundingVolume;
pub use types::sphere::Sphere;
