/*!
Collision root module.

Box-world collision for character movement. Everything the resolver sees is an axis-aligned
box, whatever the geometry came from. The code is split for clarity:

- types:     shared data types (Aabb, Obb, Axis, MovementResult)
- settings:  tolerances and step-up constants
- obstacles: the `ObstacleSource` capability and the plain box sources
- sweep:     per-axis clipping, depenetration and step-up
*/

pub mod obstacles;
pub mod settings;
pub mod sweep;
pub mod types;

// Re-export commonly used types and functions.
pub use obstacles::{Layered, ObstacleSource, StaticBoxes, overlaps_closed};
pub use sweep::{clip_axis, depenetrate, is_supported, resolve, resolve_against};
pub use types::{Aabb, Axis, MovementResult, Obb, Quat, Vec3};
