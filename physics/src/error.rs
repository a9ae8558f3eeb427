use thiserror::Error;

/// Inputs rejected at the integrator boundary.
///
/// A NaN that reaches velocity integration never washes out, so these are refused up front by
/// [`try_step`](crate::integrator::try_step) rather than clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("actor state has a non-finite position or velocity")]
    NonFiniteState,
    #[error("input sample {seq} has a non-finite look angle")]
    NonFiniteInput { seq: u64 },
    #[error("timestep {0} is not finite")]
    NonFiniteDt(f32),
    #[error("config field `{field}` has invalid value {value}")]
    InvalidConfig { field: &'static str, value: f32 },
}
