// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ground height queries consumed by the grounding step.

use crate::error::PhysicsError;

/// Single-valued ground height over world `x`/`z`.
///
/// Implementations must be continuous; the grounding step clamps bodies to
/// this surface every tick. `None` means the position is off the field and
/// aborts the tick with [`PhysicsError::HeightUnavailable`].
pub trait HeightField {
    /// Ground height at `(x, z)`.
    fn height_at(&self, x: f32, z: f32) -> Option<f32>;
}

impl<T: HeightField + ?Sized> HeightField for Box<T> {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        (**self).height_at(x, z)
    }
}

impl<T: HeightField + ?Sized> HeightField for &T {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        (**self).height_at(x, z)
    }
}

/// Infinite horizontal plane at a fixed height.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlatGround(pub f32);

impl HeightField for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.0)
    }
}

/// Square grid of height samples, bilinearly interpolated.
///
/// Sample `(i, j)` sits at world `(origin_x + i * spacing, origin_z + j * spacing)`
/// and is stored at `heights[j * size + i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    size: usize,
    spacing: f32,
    origin_x: f32,
    origin_z: f32,
    heights: Vec<f32>,
}

impl Heightmap {
    /// Builds a heightmap, validating dimensions and samples.
    pub fn new(
        size: usize,
        spacing: f32,
        origin: (f32, f32),
        heights: Vec<f32>,
    ) -> Result<Self, PhysicsError> {
        if size < 2 {
            return Err(PhysicsError::InvalidHeightmap(format!("size must be at least 2, got {size}")));
        }
        if heights.len() != size * size {
            return Err(PhysicsError::InvalidHeightmap(format!(
                "expected {} samples for a {size}x{size} grid, got {}",
                size * size,
                heights.len()
            )));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(PhysicsError::InvalidHeightmap(format!("spacing must be positive, got {spacing}")));
        }
        if !(origin.0.is_finite() && origin.1.is_finite()) || heights.iter().any(|h| !h.is_finite()) {
            return Err(PhysicsError::InvalidHeightmap("non-finite origin or sample".to_owned()));
        }
        Ok(Self { size, spacing, origin_x: origin.0, origin_z: origin.1, heights })
    }

    /// Samples per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// World-space extent of one side.
    #[allow(clippy::cast_precision_loss)]
    pub fn extent(&self) -> f32 {
        (self.size - 1) as f32 * self.spacing
    }

    fn sample(&self, i: usize, j: usize) -> f32 {
        self.heights[j * self.size + i]
    }
}

impl HeightField for Heightmap {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let gx = (x - self.origin_x) / self.spacing;
        let gz = (z - self.origin_z) / self.spacing;
        let last = (self.size - 1) as f32;
        if !(0.0..=last).contains(&gx) || !(0.0..=last).contains(&gz) {
            return None;
        }
        // Clamp the cell so the far edge interpolates inside the last cell.
        let i = (gx.floor() as usize).min(self.size - 2);
        let j = (gz.floor() as usize).min(self.size - 2);
        let fx = gx - i as f32;
        let fz = gz - j as f32;
        let near = self.sample(i, j) * (1.0 - fx) + self.sample(i + 1, j) * fx;
        let far = self.sample(i, j + 1) * (1.0 - fx) + self.sample(i + 1, j + 1) * fx;
        Some(near * (1.0 - fz) + far * fz)
    }
}
