use serde::{Deserialize, Serialize};

use crate::{
    collision::{Aabb, Vec3},
    error::PhysicsError,
};

/// Per-actor movement tunables.
///
/// Deserializes with every field optional; missing fields take the values from
/// [`PhysicsConfig::defaults`]. Speeds are in units/s, accelerations in units/s².
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Target walk speed.
    pub speed: f32,
    /// Rate toward the target velocity while grounded with input held.
    pub ground_accel: f32,
    /// Rate toward rest while grounded with no input (friction).
    pub ground_decel: f32,
    /// Rate toward the target velocity while airborne with input held.
    pub air_accel: f32,
    /// Rate toward rest while airborne with no input (drag).
    pub air_decel: f32,
    /// Downward acceleration magnitude.
    pub gravity: f32,
    /// Upward velocity set when jumping from the ground.
    pub jump_impulse: f32,
    /// Tallest ledge climbed automatically while grounded. Zero disables step-up.
    pub step_height: f32,
    /// Actor box width (X and Z).
    pub width: f32,
    /// Actor box height.
    pub height: f32,
    pub sprint_multiplier: f32,
    pub sneak_multiplier: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl PhysicsConfig {
    /// Player-like defaults in a one-unit voxel world.
    pub const fn defaults() -> Self {
        Self {
            speed: 4.317,
            ground_accel: 40.0,
            ground_decel: 50.0,
            air_accel: 10.0,
            air_decel: 2.0,
            gravity: 32.0,
            jump_impulse: 9.0,
            step_height: 0.6,
            width: 0.6,
            height: 1.8,
            sprint_multiplier: 1.3,
            sneak_multiplier: 0.3,
        }
    }

    /// Every field must be finite and non-negative; the actor box must have volume.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let fields = [
            ("speed", self.speed),
            ("ground_accel", self.ground_accel),
            ("ground_decel", self.ground_decel),
            ("air_accel", self.air_accel),
            ("air_decel", self.air_decel),
            ("gravity", self.gravity),
            ("jump_impulse", self.jump_impulse),
            ("step_height", self.step_height),
            ("width", self.width),
            ("height", self.height),
            ("sprint_multiplier", self.sprint_multiplier),
            ("sneak_multiplier", self.sneak_multiplier),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(PhysicsError::InvalidConfig { field, value });
            }
        }
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if value <= 0.0 {
                return Err(PhysicsError::InvalidConfig { field, value });
            }
        }
        Ok(())
    }

    /// Actor box with feet at `position`.
    #[inline]
    pub fn actor_box(&self, position: Vec3) -> Aabb {
        Aabb::from_feet(position.x, position.y, position.z, self.width, self.height)
    }

    /// Walk speed after sprint/sneak multipliers.
    #[inline]
    pub fn target_speed(&self, sprint: bool, sneak: bool) -> f32 {
        let mut speed = self.speed;
        if sprint {
            speed *= self.sprint_multiplier;
        }
        if sneak {
            speed *= self.sneak_multiplier;
        }
        speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(PhysicsConfig::defaults().validate(), Ok(()));
        assert_eq!(PhysicsConfig::default(), PhysicsConfig::defaults());
    }

    #[test]
    fn rejects_negative_and_non_finite_fields() {
        let cfg = PhysicsConfig {
            gravity: -1.0,
            ..PhysicsConfig::defaults()
        };
        assert_eq!(
            cfg.validate(),
            Err(PhysicsError::InvalidConfig {
                field: "gravity",
                value: -1.0
            })
        );

        let cfg = PhysicsConfig {
            width: 0.0,
            ..PhysicsConfig::defaults()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PhysicsError::InvalidConfig { field: "width", .. })
        ));

        let cfg = PhysicsConfig {
            speed: f32::INFINITY,
            ..PhysicsConfig::defaults()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: PhysicsConfig =
            serde_json::from_str(r#"{ "speed": 6.0, "step_height": 0.0 }"#).unwrap();
        assert_eq!(cfg.speed, 6.0);
        assert_eq!(cfg.step_height, 0.0);
        assert_eq!(cfg.gravity, PhysicsConfig::defaults().gravity);
        assert_eq!(cfg.height, 1.8);
    }

    #[test]
    fn sprint_and_sneak_scale_speed() {
        let cfg = PhysicsConfig::defaults();
        assert!((cfg.target_speed(true, false) - 4.317 * 1.3).abs() < 1.0e-5);
        assert!((cfg.target_speed(false, true) - 4.317 * 0.3).abs() < 1.0e-5);
        assert_eq!(cfg.target_speed(false, false), 4.317);
    }

    #[test]
    fn actor_box_is_feet_anchored() {
        let b = PhysicsConfig::defaults().actor_box(Vec3::new(1.0, 2.0, 3.0));
        assert!((b.min.x - 0.7).abs() < 1.0e-6);
        assert_eq!(b.min.y, 2.0);
        assert!((b.max.y - 3.8).abs() < 1.0e-6);
    }
}
