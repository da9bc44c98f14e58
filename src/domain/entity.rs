// Entity data: transform, render descriptor and attached units.

use super::behavior::{Behavior, Capability, NoScript};
use super::collider::BoxCollider;
use super::ids::{EntityId, UnitId};
use super::math::{Rect, Vector2};

/// Something that can be attached to an entity.
pub enum Unit {
    Script(Box<dyn Behavior>),
    Collider(BoxCollider),
}

impl Unit {
    pub fn script(behavior: impl Behavior) -> Self {
        Self::Script(Box::new(behavior))
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        match self {
            Unit::Collider(_) => capability == Capability::Collider,
            Unit::Script(behavior) => is_capable(behavior.as_ref(), capability),
        }
    }

    pub fn as_collider(&self) -> Option<&BoxCollider> {
        match self {
            Unit::Collider(collider) => Some(collider),
            Unit::Script(_) => None,
        }
    }

    /// Downcasts a script unit to its concrete behavior type.
    pub fn downcast<T: Behavior>(self) -> Option<Box<T>> {
        match self {
            Unit::Script(behavior) => {
                let any: Box<dyn std::any::Any> = behavior;
                any.downcast().ok()
            }
            Unit::Collider(_) => None,
        }
    }
}

impl From<BoxCollider> for Unit {
    fn from(collider: BoxCollider) -> Self {
        Unit::Collider(collider)
    }
}

pub(crate) fn is_capable(behavior: &dyn Behavior, capability: Capability) -> bool {
    behavior.capabilities().contains(&capability)
        || (capability == Capability::Animator && behavior.animator().is_some())
}

/// Storage for one attached unit.
pub(crate) enum SlotBody {
    /// `None` while the behavior is running one of its hooks.
    Script(Option<Box<dyn Behavior>>),
    Collider(BoxCollider),
}

pub(crate) struct UnitSlot {
    pub(crate) id: UnitId,
    pub(crate) enabled: bool,
    pub(crate) body: SlotBody,
}

impl UnitSlot {
    pub(crate) fn new(id: UnitId, unit: Unit) -> Self {
        let body = match unit {
            Unit::Script(behavior) => SlotBody::Script(Some(behavior)),
            Unit::Collider(collider) => SlotBody::Collider(collider),
        };
        Self {
            id,
            enabled: true,
            body,
        }
    }

    pub(crate) fn collider(&self) -> Option<&BoxCollider> {
        match &self.body {
            SlotBody::Collider(collider) => Some(collider),
            SlotBody::Script(_) => None,
        }
    }

    pub(crate) fn collider_mut(&mut self) -> Option<&mut BoxCollider> {
        match &mut self.body {
            SlotBody::Collider(collider) => Some(collider),
            SlotBody::Script(_) => None,
        }
    }

    pub(crate) fn behavior(&self) -> Option<&dyn Behavior> {
        match &self.body {
            SlotBody::Script(Some(behavior)) => Some(behavior.as_ref()),
            _ => None,
        }
    }

    /// True while the behavior is lent out to one of its own hooks.
    pub(crate) fn is_running(&self) -> bool {
        matches!(self.body, SlotBody::Script(None))
    }

    pub(crate) fn has_capability(&self, capability: Capability) -> bool {
        match &self.body {
            SlotBody::Collider(_) => capability == Capability::Collider,
            SlotBody::Script(Some(behavior)) => is_capable(behavior.as_ref(), capability),
            SlotBody::Script(None) => false,
        }
    }

    pub(crate) fn into_unit(self) -> Option<Unit> {
        match self.body {
            SlotBody::Script(behavior) => behavior.map(Unit::Script),
            SlotBody::Collider(collider) => Some(Unit::Collider(collider)),
        }
    }
}

/// A positioned, renderable object composed of behavior units.
pub struct Entity {
    pub(crate) id: EntityId,
    /// Slot for the entity's own hooks; its id is the entity's unit id.
    pub(crate) own: UnitSlot,
    pub(crate) local_position: Vector2,
    pub(crate) parent: Option<EntityId>,
    pub(crate) size: Vector2,
    pub(crate) sprite: Option<String>,
    pub(crate) sprite_rect: Option<Rect>,
    pub(crate) flip_x: bool,
    pub(crate) flip_y: bool,
    pub(crate) alpha: f32,
    pub(crate) hidden: bool,
    pub(crate) layer: Option<i32>,
    pub(crate) units: Vec<UnitSlot>,
    pub(crate) animator: Option<UnitId>,
    pub(crate) colliders: Vec<UnitId>,
    /// Set once a destroy has been requested and is waiting for the pass to end.
    pub(crate) doomed: bool,
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn enabled(&self) -> bool {
        self.own.enabled
    }

    pub fn layer(&self) -> Option<i32> {
        self.layer
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn local_position(&self) -> Vector2 {
        self.local_position
    }

    pub fn size(&self) -> Vector2 {
        self.size
    }

    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Attached unit ids in attachment order.
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().map(|slot| slot.id)
    }

    pub fn collider_ids(&self) -> &[UnitId] {
        &self.colliders
    }

    pub fn animator_id(&self) -> Option<UnitId> {
        self.animator
    }

    pub(crate) fn slot(&self, unit: UnitId) -> Option<&UnitSlot> {
        if unit == self.own.id {
            return Some(&self.own);
        }
        self.units.iter().find(|slot| slot.id == unit)
    }

    pub(crate) fn slot_mut(&mut self, unit: UnitId) -> Option<&mut UnitSlot> {
        if unit == self.own.id {
            return Some(&mut self.own);
        }
        self.units.iter_mut().find(|slot| slot.id == unit)
    }
}

/// Describes an entity before it is created in a world.
pub struct EntityBuilder {
    script: Box<dyn Behavior>,
    position: Vector2,
    parent: Option<EntityId>,
    size: Vector2,
    sprite: Option<String>,
    sprite_rect: Option<Rect>,
    enabled: bool,
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self {
            script: Box::new(NoScript),
            position: Vector2::ZERO,
            parent: None,
            size: Vector2::ONE,
            sprite: None,
            sprite_rect: None,
            enabled: true,
        }
    }

    /// Behavior that receives the entity's own hooks.
    pub fn with_script(mut self, script: impl Behavior) -> Self {
        self.script = Box::new(script);
        self
    }

    /// Local position, relative to the parent when one is set.
    pub fn with_position(mut self, position: Vector2) -> Self {
        self.position = position;
        self
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_size(mut self, size: Vector2) -> Self {
        self.size = size;
        self
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    pub fn with_sprite_rect(mut self, rect: Rect) -> Self {
        self.sprite_rect = Some(rect);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub(crate) fn build(self) -> Entity {
        let id = EntityId::next();
        let mut own = UnitSlot::new(id.as_unit(), Unit::Script(self.script));
        own.enabled = self.enabled;
        Entity {
            id,
            own,
            local_position: self.position,
            parent: self.parent,
            size: self.size,
            sprite: self.sprite,
            sprite_rect: self.sprite_rect,
            flip_x: false,
            flip_y: false,
            alpha: 1.0,
            hidden: false,
            layer: None,
            units: Vec::new(),
            animator: None,
            colliders: Vec::new(),
            doomed: false,
        }
    }
}
