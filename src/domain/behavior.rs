// Behavior units: the lifecycle hooks gameplay code plugs into entities.

use super::animator::Animator;
use super::collider::Collision;
use super::errors::RuntimeError;
use super::ids::{EntityId, UnitId};
use super::math::Vector2;
use super::timer::TimerId;
use super::world::World;
use std::any::Any;

/// Lookup key for `World::get_component` style queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Collider,
    Animator,
    Named(&'static str),
}

/// A unit of behavior attached to an entity.
///
/// Every hook defaults to a no-op. Hooks run synchronously on the simulation
/// thread and may freely mutate the world through the [`Context`]; structural
/// changes they cause (destroys in particular) are applied once the outermost
/// pass finishes.
#[allow(unused_variables)]
pub trait Behavior: Any + Send {
    fn capabilities(&self) -> &'static [Capability] {
        &[]
    }

    /// The animation-driver facet, if this unit is one.
    fn animator(&self) -> Option<&dyn Animator> {
        None
    }

    fn start(&mut self, ctx: &mut Context<'_>) {}
    fn update(&mut self, ctx: &mut Context<'_>, tick: u64) {}
    fn on_enabled(&mut self, ctx: &mut Context<'_>) {}
    fn on_disabled(&mut self, ctx: &mut Context<'_>) {}
    fn on_destroy(&mut self, ctx: &mut Context<'_>) {}

    fn on_collision_enter(&mut self, ctx: &mut Context<'_>, other: Collision) {}
    fn on_collision_stay(&mut self, ctx: &mut Context<'_>, other: Collision) {}
    fn on_collision_exit(&mut self, ctx: &mut Context<'_>, other: Collision) {}

    fn on_trigger_enter(&mut self, ctx: &mut Context<'_>, other: Collision) {}
    fn on_trigger_stay(&mut self, ctx: &mut Context<'_>, other: Collision) {}
    fn on_trigger_exit(&mut self, ctx: &mut Context<'_>, other: Collision) {}
}

/// Behavior for entities built without a script of their own.
pub(crate) struct NoScript;

impl Behavior for NoScript {}

/// World access handed to a hook, scoped to the unit being invoked.
pub struct Context<'w> {
    world: &'w mut World,
    entity: EntityId,
    unit: UnitId,
}

impl<'w> Context<'w> {
    pub(crate) fn new(world: &'w mut World, entity: EntityId, unit: UnitId) -> Self {
        Self {
            world,
            entity,
            unit,
        }
    }

    /// The entity the invoked unit is attached to.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn tick(&self) -> u64 {
        self.world.tick()
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    pub fn position(&self) -> Result<Vector2, RuntimeError> {
        self.world.position(self.entity)
    }

    /// Moves the owning entity, resolving collisions on the way.
    pub fn set_position(&mut self, target: Vector2) -> Result<Vector2, RuntimeError> {
        self.world.set_position(self.entity, target)
    }

    pub fn translate(&mut self, delta: Vector2) -> Result<Vector2, RuntimeError> {
        self.world.translate(self.entity, delta)
    }

    /// Destroys the owning entity after `delay` ticks.
    pub fn destroy(&mut self, delay: u64) {
        self.world.destroy(self.entity, delay);
    }

    pub fn schedule_once(
        &mut self,
        callback: impl FnOnce(&mut World) + Send + 'static,
        delay: u64,
    ) -> TimerId {
        self.world.schedule_once(callback, delay)
    }

    pub fn schedule_repeating(
        &mut self,
        callback: impl FnMut(&mut World) + Send + 'static,
        period: u64,
    ) -> TimerId {
        self.world.schedule_repeating(callback, period)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Stay,
    Exit,
}

/// A hook invocation, queued when its target unit is busy.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Hook {
    Start,
    Update(u64),
    Enabled,
    Disabled,
    Destroy,
    Collision(Phase, Collision),
    Trigger(Phase, Collision),
}

impl Hook {
    pub(crate) fn call(self, behavior: &mut dyn Behavior, ctx: &mut Context<'_>) {
        match self {
            Hook::Start => behavior.start(ctx),
            Hook::Update(tick) => behavior.update(ctx, tick),
            Hook::Enabled => behavior.on_enabled(ctx),
            Hook::Disabled => behavior.on_disabled(ctx),
            Hook::Destroy => behavior.on_destroy(ctx),
            Hook::Collision(Phase::Enter, other) => behavior.on_collision_enter(ctx, other),
            Hook::Collision(Phase::Stay, other) => behavior.on_collision_stay(ctx, other),
            Hook::Collision(Phase::Exit, other) => behavior.on_collision_exit(ctx, other),
            Hook::Trigger(Phase::Enter, other) => behavior.on_trigger_enter(ctx, other),
            Hook::Trigger(Phase::Stay, other) => behavior.on_trigger_stay(ctx, other),
            Hook::Trigger(Phase::Exit, other) => behavior.on_trigger_exit(ctx, other),
        }
    }

    /// Collision hooks only reach enabled units; lifecycle hooks always land.
    pub(crate) fn requires_enabled(self) -> bool {
        matches!(self, Hook::Update(_) | Hook::Collision(..) | Hook::Trigger(..))
    }
}
