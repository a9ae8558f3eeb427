pub mod actors;
pub mod constants;
pub mod error;
pub mod library;
pub mod world;

pub use actors::{ActorId, ActorSnapshot, MovementSim, SimActor};
pub use error::SimError;
pub use library::{DecomposeMode, ModelCollision, ModelLibrary};
pub use world::{PlacedModel, StaticWorld};
