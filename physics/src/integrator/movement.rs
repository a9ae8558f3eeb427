use nalgebra as na;

use crate::{
    collision::{ObstacleSource, Vec3, resolve},
    constants::MAX_STEP_DT,
    error::PhysicsError,
    integrator::{
        ActorInput, ActorState, PhysicsConfig,
        motion::{move_toward_planar, wish_direction},
    },
};

/// Advance one actor by `dt` seconds against `obstacles`.
///
/// Behavior
/// - Target planar velocity comes from the held keys rotated by yaw, at walk speed scaled by
///   sprint/sneak.
/// - Planar velocity moves toward the target at the ground or air rate (accelerate when keys are
///   held, decelerate otherwise) without overshooting.
/// - Jumping sets the vertical velocity to the jump impulse, only from the ground. Gravity is
///   applied after.
/// - The displacement `velocity * dt` is resolved against the obstacles. Step-up is offered only
///   while grounded.
/// - Velocity is zeroed on every axis the resolver clipped. `on_ground` is the resolver's landing
///   result for this tick.
///
/// `dt <= 0` (or NaN) returns `prev` unchanged; `dt` above [`MAX_STEP_DT`] is clamped.
/// Non-finite state or input is not checked here; see [`try_step`].
pub fn step<O: ObstacleSource + ?Sized>(
    prev: &ActorState,
    input: &ActorInput,
    config: &PhysicsConfig,
    obstacles: &O,
    dt: f32,
) -> ActorState {
    if !(dt > 0.0) {
        return *prev;
    }
    let dt = dt.min(MAX_STEP_DT);

    // 1) Planar velocity toward the wish velocity.
    let wish = wish_direction(input);
    let has_input = wish != na::Vector2::zeros();
    let target = wish * config.target_speed(input.sprint, input.sneak);
    let rate = match (prev.on_ground, has_input) {
        (true, true) => config.ground_accel,
        (true, false) => config.ground_decel,
        (false, true) => config.air_accel,
        (false, false) => config.air_decel,
    };
    let planar = move_toward_planar(
        na::Vector2::new(prev.vel_x, prev.vel_z),
        target,
        rate * dt,
    );

    // 2) Vertical velocity.
    let mut vel_y = prev.vel_y;
    if prev.on_ground && input.jump {
        vel_y = config.jump_impulse;
    }
    vel_y -= config.gravity * dt;

    // 3) Resolve the displacement.
    let velocity = Vec3::new(planar.x, vel_y, planar.y);
    let mover = config.actor_box(prev.position());
    let step_height = if prev.on_ground {
        config.step_height
    } else {
        0.0
    };
    let res = resolve(&mover, velocity * dt, obstacles, step_height);

    log::trace!(
        "step: requested {:?} resolved {:?} (stepped: {}, landed: {})",
        velocity * dt,
        res.displacement,
        res.stepped,
        res.landed
    );

    let zero_if = |hit: bool, v: f32| if hit { 0.0 } else { v };
    ActorState {
        x: prev.x + res.displacement.x,
        y: prev.y + res.displacement.y,
        z: prev.z + res.displacement.z,
        vel_x: zero_if(res.hit_x, velocity.x),
        // A step lands on the ledge top, so any fall speed is gone; a jump keeps rising.
        vel_y: zero_if(res.hit_y || (res.stepped && velocity.y < 0.0), velocity.y),
        vel_z: zero_if(res.hit_z, velocity.z),
        on_ground: res.landed,
        colliding_horizontally: res.colliding_horizontally,
    }
}

/// [`step`] with boundary validation: rejects invalid config and non-finite state, look angles
/// or `dt` instead of letting a NaN into the state.
pub fn try_step<O: ObstacleSource + ?Sized>(
    prev: &ActorState,
    input: &ActorInput,
    config: &PhysicsConfig,
    obstacles: &O,
    dt: f32,
) -> Result<ActorState, PhysicsError> {
    if !dt.is_finite() {
        return Err(PhysicsError::NonFiniteDt(dt));
    }
    if !prev.is_finite() {
        return Err(PhysicsError::NonFiniteState);
    }
    if !input.is_finite() {
        return Err(PhysicsError::NonFiniteInput { seq: input.seq });
    }
    config.validate()?;

    Ok(step(prev, input, config, obstacles, dt))
}
