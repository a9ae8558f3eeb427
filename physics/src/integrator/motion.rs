use nalgebra as na;

use crate::{constants::WISH_EPS, integrator::ActorInput};

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let max_delta = max_delta.max(0.0);
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Planar (XZ) version of [`move_toward`]: steps along the difference vector, so both
/// components arrive at the same time.
#[inline]
pub fn move_toward_planar(
    current: na::Vector2<f32>,
    target: na::Vector2<f32>,
    max_delta: f32,
) -> na::Vector2<f32> {
    let max_delta = max_delta.max(0.0);
    let diff = target - current;
    let dist = diff.norm();
    if dist <= max_delta || dist <= WISH_EPS {
        target
    } else {
        current + diff * (max_delta / dist)
    }
}

/// World-space (x, z) unit direction requested by `input`, or zero when no movement key is held.
///
/// Forward at yaw 0 is +Z and at yaw -90 it is +X. At yaw 0, strafing right moves toward -X.
#[inline]
pub fn wish_direction(input: &ActorInput) -> na::Vector2<f32> {
    let (forward, strafe) = input.axes();
    if forward == 0.0 && strafe == 0.0 {
        return na::Vector2::zeros();
    }

    let (sin, cos) = input.normalized_yaw().to_radians().sin_cos();
    let dir = na::Vector2::new(-sin * forward - cos * strafe, cos * forward - sin * strafe);
    let len = dir.norm();
    if len <= WISH_EPS {
        na::Vector2::zeros()
    } else {
        dir / len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_at(yaw: f32) -> ActorInput {
        ActorInput {
            forward: true,
            yaw,
            ..Default::default()
        }
    }

    #[test]
    fn move_toward_clamps_without_overshoot() {
        assert_eq!(move_toward(0.0, 10.0, 3.0), 3.0);
        assert_eq!(move_toward(0.0, 2.0, 3.0), 2.0);
        assert_eq!(move_toward(5.0, -5.0, 4.0), 1.0);
        assert_eq!(move_toward(1.0, 2.0, -1.0), 1.0);
    }

    #[test]
    fn planar_move_toward_follows_the_difference() {
        let out = move_toward_planar(na::Vector2::zeros(), na::Vector2::new(3.0, 4.0), 2.5);
        assert!((out - na::Vector2::new(1.5, 2.0)).norm() < 1.0e-6);

        let out = move_toward_planar(na::Vector2::new(1.0, 1.0), na::Vector2::zeros(), 10.0);
        assert_eq!(out, na::Vector2::zeros());
    }

    #[test]
    fn facing_convention() {
        let dir = wish_direction(&forward_at(0.0));
        assert!((dir - na::Vector2::new(0.0, 1.0)).norm() < 1.0e-6);

        let dir = wish_direction(&forward_at(-90.0));
        assert!((dir - na::Vector2::new(1.0, 0.0)).norm() < 1.0e-6);

        let dir = wish_direction(&forward_at(90.0));
        assert!((dir - na::Vector2::new(-1.0, 0.0)).norm() < 1.0e-6);
    }

    #[test]
    fn strafe_is_perpendicular_and_diagonals_are_unit() {
        let right = ActorInput {
            right: true,
            ..Default::default()
        };
        let dir = wish_direction(&right);
        assert!((dir - na::Vector2::new(-1.0, 0.0)).norm() < 1.0e-6);

        let diagonal = ActorInput {
            forward: true,
            left: true,
            yaw: 30.0,
            ..Default::default()
        };
        assert!((wish_direction(&diagonal).norm() - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn no_keys_no_direction() {
        assert_eq!(wish_direction(&ActorInput::default()), na::Vector2::zeros());
    }
}
