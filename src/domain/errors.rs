use super::ids::{EntityId, UnitId};
use std::fmt;

// Domain-level errors raised by world operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A second animation driver was attached to an entity that already has one.
    AnimatorConflict { entity: EntityId },
    /// The entity does not exist (never created, or already destroyed).
    UnknownEntity(EntityId),
    /// The unit is not attached to any live entity.
    UnknownUnit(UnitId),
    /// A parent reference points at a missing entity, or the chain loops.
    BrokenParentChain(EntityId),
    /// A collider is still registered but its owner no longer holds it.
    DetachedCollider(UnitId),
    /// A collider operation was asked of a unit that is not a collider.
    NotACollider(UnitId),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnimatorConflict { entity } => {
                write!(f, "entity {entity} already has an animation driver")
            }
            Self::UnknownEntity(id) => write!(f, "unknown entity {id}"),
            Self::UnknownUnit(id) => write!(f, "unit {id} is not attached to a live entity"),
            Self::BrokenParentChain(id) => write!(f, "entity {id} has a broken parent chain"),
            Self::DetachedCollider(id) => write!(f, "collider {id} has no owning entity"),
            Self::NotACollider(id) => write!(f, "unit {id} is not a collider"),
        }
    }
}

impl std::error::Error for RuntimeError {}
