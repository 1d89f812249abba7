// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tuning constants for the world pipeline.

use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Every tunable the tick pipeline reads.
///
/// Missing fields deserialize to their defaults, so a scenario file only
/// lists what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical acceleration applied to ungrounded dynamic bodies (m/s²).
    pub gravity: f32,
    /// Per-tick velocity multiplier applied during integration.
    pub damping: f32,
    /// Per-tick velocity multiplier applied in post-step cleanup.
    pub decay: f32,
    /// Velocity components below this magnitude snap to zero after a tick.
    pub velocity_epsilon: f32,
    /// Coefficient of restitution for impulse resolution.
    pub restitution: f32,
    /// Fraction of penetration removed per resolution.
    pub correction_percent: f32,
    /// Penetration tolerated without positional correction.
    pub penetration_slop: f32,
    /// Height above the contact surface a grounded body must exceed before
    /// it is considered airborne.
    pub ground_hysteresis: f32,
    /// Largest gap between a trigger and a camera (or query box) that still
    /// counts as contact.
    pub trigger_padding: f32,
    /// Half extent of the cube tracked around a camera body.
    pub camera_half_extent: f32,
    /// Default eye height of a camera body above the ground.
    pub camera_height: f32,
    /// Seconds a projectile lives before it expires.
    pub projectile_lifetime: f32,
    /// Point samples taken along a projectile's path each tick.
    pub projectile_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.8,
            damping: 0.93,
            decay: 0.9,
            velocity_epsilon: 1e-4,
            restitution: 1.0,
            correction_percent: 0.8,
            penetration_slop: 0.01,
            ground_hysteresis: 0.05,
            trigger_padding: 0.1,
            camera_half_extent: 5.0,
            camera_height: 20.0,
            projectile_lifetime: 10.0,
            projectile_substeps: 16,
        }
    }
}

impl PhysicsConfig {
    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let finite = [
            ("gravity", self.gravity),
            ("damping", self.damping),
            ("decay", self.decay),
            ("velocity_epsilon", self.velocity_epsilon),
            ("restitution", self.restitution),
            ("correction_percent", self.correction_percent),
            ("penetration_slop", self.penetration_slop),
            ("ground_hysteresis", self.ground_hysteresis),
            ("trigger_padding", self.trigger_padding),
            ("camera_half_extent", self.camera_half_extent),
            ("camera_height", self.camera_height),
            ("projectile_lifetime", self.projectile_lifetime),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite")));
        }
        for (name, value) in [("damping", self.damping), ("decay", self.decay)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must lie in [0, 1], got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(invalid(format!("restitution must lie in [0, 1], got {}", self.restitution)));
        }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(invalid(format!(
                "correction_percent must lie in [0, 1], got {}",
                self.correction_percent
            )));
        }
        let non_negative = [
            ("velocity_epsilon", self.velocity_epsilon),
            ("penetration_slop", self.penetration_slop),
            ("ground_hysteresis", self.ground_hysteresis),
            ("trigger_padding", self.trigger_padding),
            ("camera_half_extent", self.camera_half_extent),
            ("camera_height", self.camera_height),
            ("projectile_lifetime", self.projectile_lifetime),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(invalid(format!("{name} must not be negative, got {value}")));
        }
        if self.projectile_substeps == 0 {
            return Err(invalid("projectile_substeps must be at least 1".to_owned()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> PhysicsError {
    PhysicsError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: PhysicsConfig =
            serde_json::from_str(r#"{ "gravity": 0.0, "damping": 1.0 }"#).expect("parse");
        assert_eq!(cfg.gravity, 0.0);
        assert_eq!(cfg.damping, 1.0);
        assert_eq!(cfg.decay, 0.9);
        assert_eq!(cfg.projectile_substeps, 16);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cfg = PhysicsConfig { damping: 1.5, ..PhysicsConfig::default() };
        assert!(matches!(cfg.validate(), Err(PhysicsError::InvalidConfig(_))));
        let cfg = PhysicsConfig { projectile_substeps: 0, ..PhysicsConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = PhysicsConfig { gravity: f32::NAN, ..PhysicsConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = PhysicsConfig { trigger_padding: -0.1, ..PhysicsConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
