use physics::PhysicsError;
use thiserror::Error;

use crate::actors::ActorId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),
    #[error("actor {0} already exists")]
    DuplicateActor(ActorId),
    #[error("input {seq} is not newer than last processed input {last}")]
    StaleInput { seq: u64, last: u64 },
    #[error("input sequence numbers start at 1")]
    InvalidSequence,
    #[error("unknown model `{0}`")]
    UnknownModel(String),
    #[error("mesh for model `{model}` is empty or exceeds {max_extent} units")]
    UnreasonableMesh { model: String, max_extent: f32 },
    #[error("placement of model `{0}` has a non-finite transform")]
    InvalidPlacement(String),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}
