pub mod adapter;
pub mod bitmask_flags;
pub mod collision;
pub mod constants;
pub mod decompose;
pub mod error;
pub mod integrator;
pub mod mesh;
pub mod rapier;
pub mod rapier_world;
pub mod voxel;

pub use adapter::{EnclosingLimits, ModelTransform, adapt, enclosing_box};
pub use collision::{
    Aabb, Layered, MovementResult, Obb, ObstacleSource, Quat, StaticBoxes, Vec3, resolve,
};
pub use decompose::{SurfaceOptions, decompose, decompose_surface};
pub use error::PhysicsError;
pub use integrator::{
    ActorInput, ActorState, InputFlag, InputFlags, PhysicsConfig, step, try_step,
};
pub use mesh::CollisionMesh;
pub use rapier::{ColliderShapeDef, WorldStaticDef, collider_from_def, static_defs_from_boxes};
pub use rapier_world::RapierQueryWorld;
pub use voxel::VoxelGrid;
