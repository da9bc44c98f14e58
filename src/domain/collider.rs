// Collision tags, the tag-ignore matrix, box colliders and the collider registry.

use super::ids::{EntityId, UnitId};
use super::math::{Rect, Vector2};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Closed set of collision tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionTag {
    Default,
    Player,
    Enemy,
    PlayerMissile,
    EnemyMissile,
    Pickup,
    Wall,
}

impl CollisionTag {
    /// Tags this tag never collides with. Tags without an entry ignore nothing.
    pub fn ignored(self) -> &'static [CollisionTag] {
        use CollisionTag::*;
        match self {
            Player => &[PlayerMissile],
            Enemy => &[Enemy, EnemyMissile],
            PlayerMissile => &[Player, PlayerMissile, EnemyMissile, Pickup],
            EnemyMissile => &[Enemy, EnemyMissile, Pickup],
            Pickup => &[Enemy, Wall],
            Default | Wall => &[],
        }
    }
}

/// True if either side lists the other in its ignore set.
pub fn is_ignored_by_tags(a: CollisionTag, b: CollisionTag) -> bool {
    a.ignored().contains(&b) || b.ignored().contains(&a)
}

/// When a collider runs its pairwise pass on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CheckMode {
    /// Every simulation tick, as part of the owner's unit updates.
    EveryFrame,
    /// Whenever the owning entity's position setter moves it.
    #[default]
    OnMoved,
    /// Only through explicit `update_collision` calls.
    Manual,
}

/// The partner side of a collision, as delivered to callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub entity: EntityId,
    pub collider: UnitId,
    pub tag: CollisionTag,
    pub trigger: bool,
}

/// Axis-aligned box collider centered on its owner's position.
#[derive(Debug, Clone)]
pub struct BoxCollider {
    pub tag: CollisionTag,
    pub is_trigger: bool,
    pub mode: CheckMode,
    pub size: Vector2,
    pub offset: Vector2,
    /// Multiply size and offset by the owning entity's size.
    pub scale_with_parent: bool,
    // Partners currently overlapping, with what was known about them on entry.
    pub(crate) overlaps: BTreeMap<UnitId, Collision>,
}

impl BoxCollider {
    pub fn new(tag: CollisionTag, size: Vector2) -> Self {
        Self {
            tag,
            is_trigger: false,
            mode: CheckMode::default(),
            size,
            offset: Vector2::ZERO,
            scale_with_parent: false,
            overlaps: BTreeMap::new(),
        }
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn mode(mut self, mode: CheckMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn offset(mut self, offset: Vector2) -> Self {
        self.offset = offset;
        self
    }

    pub fn scale_with_parent(mut self) -> Self {
        self.scale_with_parent = true;
        self
    }

    /// World-space bounds for an owner at `position` with size `entity_size`.
    pub fn bounds(&self, position: Vector2, entity_size: Vector2) -> Rect {
        let (size, offset) = if self.scale_with_parent {
            (self.size * entity_size, self.offset * entity_size)
        } else {
            (self.size, self.offset)
        };
        Rect::from_center(position + offset, size)
    }

    /// Colliders currently recorded as overlapping this one.
    pub fn overlaps(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.overlaps.keys().copied()
    }

    pub fn is_overlapping(&self, other: UnitId) -> bool {
        self.overlaps.contains_key(&other)
    }
}

/// Ordered, duplicate-free list of live colliders with their owners.
#[derive(Debug, Default)]
pub struct ColliderRegistry {
    order: Vec<UnitId>,
    owners: HashMap<UnitId, EntityId>,
}

impl ColliderRegistry {
    /// Returns false if the collider was already registered.
    pub fn register(&mut self, collider: UnitId, owner: EntityId) -> bool {
        if self.owners.contains_key(&collider) {
            return false;
        }
        self.owners.insert(collider, owner);
        self.order.push(collider);
        true
    }

    pub fn unregister(&mut self, collider: UnitId) -> Option<EntityId> {
        let owner = self.owners.remove(&collider)?;
        self.order.retain(|id| *id != collider);
        Some(owner)
    }

    pub fn owner(&self, collider: UnitId) -> Option<EntityId> {
        self.owners.get(&collider).copied()
    }

    pub fn contains(&self, collider: UnitId) -> bool {
        self.owners.contains_key(&collider)
    }

    /// Copy of the registration order, safe to iterate while the registry changes.
    pub fn snapshot(&self) -> Vec<UnitId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.owners.clear();
    }
}
