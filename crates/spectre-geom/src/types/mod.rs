// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by the physics core (AABB, oriented bounding
//! volume, bounding sphere).
//!
//! Determinism notes:
//! - Overlap semantics are inclusive on faces to avoid pair churn on contact
//!   boundaries; the sweep-and-prune endpoint order follows the same rule.
//! - Hull recomputation uses plain `f32` ops so identical poses give
//!   identical bounds.

#[doc = "Axis-aligned bounding boxes (world space)."]
pub mod aabb;
#[doc = "Oriented boxes tracked by their axis-aligned world hull."]
pub mod bounding_volume;
#[doc = "Bounding spheres for narrow-phase approximation."]
pub mod sphere;
