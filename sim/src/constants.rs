//! Simulation tick constants.
//!
//! Centralizes tick rates, dt clamps and queue bounds so the registry and its hosts agree on
//! them.

/// Fixed simulation tick frequency (Hz).
pub const TICK_HZ: u32 = 20;

/// Fixed tick length (seconds) matching [`TICK_HZ`].
pub const FIXED_DT_S: f32 = 1.0 / TICK_HZ as f32;

/// Max dt (seconds) for one tick.
///
/// Longer gaps (stalls, paused hosts) are clamped rather than caught up.
pub const MAX_TICK_DT_S: f32 = 0.25;

/// Ticks the last input keeps being replayed when no new input arrives.
///
/// After this many idle ticks the actor lets go of movement and jump keys.
pub const INPUT_DECAY_TICKS: u32 = 6;

/// Pending inputs kept per actor; the oldest is dropped beyond this.
pub const MAX_PENDING_INPUTS: usize = 64;

/// Largest accepted model extent (world units, any axis) for collision decomposition.
pub const MAX_MODEL_EXTENT: f32 = 256.0;
