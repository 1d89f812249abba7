// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Float32 math used by the physics core: vectors, column-major matrices,
//! and the world axes the broad phase sweeps along.
//!
//! All operations round to `f32`; nothing here uses fused multiply-add so a
//! given input sequence produces the same bounds on every target.

use core::f32::consts::TAU;

mod mat4;
mod vec3;

pub use mat4::Mat4;
pub use vec3::Vec3;

/// Degeneracy threshold shared by normalisation and zero-snapping helpers.
pub const EPSILON: f32 = 1e-6;

/// Converts degrees to radians with float32 precision.
pub fn deg_to_rad(value: f32) -> f32 {
    value * (TAU / 360.0)
}

/// One of the three world axes.
///
/// The broad phase keeps one endpoint list per axis and processes them in
/// the fixed order `X → Y → Z`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    /// World +X.
    X,
    /// World +Y (up).
    Y,
    /// World +Z.
    Z,
}

impl Axis {
    /// All axes in sweep order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Array index of the axis (`X = 0`, `Y = 1`, `Z = 2`).
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deg_to_rad_quarter_turn() {
        assert!((deg_to_rad(90.0) - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn axis_indices_follow_sweep_order() {
        let idx: Vec<usize> = Axis::ALL.iter().map(|a| a.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
