// Domain layer: the entity runtime and its collision rules.

pub mod animator;
pub mod behavior;
pub mod collider;
pub mod entity;
pub mod errors;
pub mod ids;
pub mod math;
pub mod snapshot;
pub mod timer;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use animator::{Animator, SpriteAnimator};
pub use behavior::{Behavior, Capability, Context, Phase};
pub use collider::{BoxCollider, CheckMode, Collision, CollisionTag, is_ignored_by_tags};
pub use entity::{Entity, EntityBuilder, Unit};
pub use errors::RuntimeError;
pub use ids::{EntityId, UnitId, same_unit};
pub use math::{Rect, Vector2, move_towards, move_towards_scalar};
pub use snapshot::{EntitySnapshot, WorldSnapshot};
pub use timer::{TimerId, TimerService};
pub use world::{RuntimeConfig, World};
