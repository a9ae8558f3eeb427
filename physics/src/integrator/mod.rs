/*!
Character integrator.

Turns one input sample into one tick of actor motion:

- config:   per-actor tunables (`PhysicsConfig`), serde-loadable with defaults
- actor:    `ActorState`, `ActorInput` and the packed `InputFlags`
- motion:   move-toward helpers and the yaw-relative wish direction
- movement: `step` / `try_step`, the tick itself
*/

pub mod actor;
pub mod config;
pub mod motion;
pub mod movement;

pub use actor::{ActorInput, ActorState, InputFlag, InputFlags, normalize_yaw_deg};
pub use config::PhysicsConfig;
pub use motion::{move_toward, move_toward_planar, wish_direction};
pub use movement::{step, try_step};
