//! The runtime state object.
//!
//! A [`World`] owns everything the simulation mutates: the tick counter, the
//! timer tables, the layer populations, entity storage and the collider
//! registry. Nothing here is a process-wide singleton, so every test can build
//! its own world.
//!
//! All mutation happens on one thread. Hooks run synchronously and may call
//! back into the world; a destroy requested while a pass is running is
//! applied once the outermost pass returns (see `dispatch.rs`).

mod collision;
mod dispatch;
mod movement;

use super::animator::Animator;
use super::behavior::{Behavior, Capability, Hook};
use super::collider::{BoxCollider, CheckMode, ColliderRegistry};
use super::entity::{Entity, EntityBuilder, SlotBody, Unit, UnitSlot};
use super::errors::RuntimeError;
use super::ids::{EntityId, UnitId};
use super::math::{Rect, Vector2};
use super::snapshot::{EntitySnapshot, WorldSnapshot};
use super::timer::{DueCallback, TimerId, TimerService};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::{debug, warn};

/// Simulation constants that are not gameplay tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeConfig {
    /// Equal sub-steps a position change is split into for collision resolution.
    pub collision_iterations: u32,
    /// Gap below which two box colliders count as touching.
    pub collision_epsilon: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            collision_iterations: 1,
            collision_epsilon: 0.4,
        }
    }
}

pub struct World {
    config: RuntimeConfig,
    tick: u64,
    timers: TimerService<World>,
    layers: BTreeMap<i32, Vec<EntityId>>,
    entities: HashMap<EntityId, Entity>,
    // Every unit id (including each entity's own) mapped to its entity.
    unit_owners: HashMap<UnitId, EntityId>,
    colliders: ColliderRegistry,
    destroy_timers: HashMap<EntityId, TimerId>,
    // Re-entrancy bookkeeping, see dispatch.rs.
    nesting: u32,
    settling: bool,
    queued_hooks: VecDeque<(EntityId, UnitId, Hook)>,
    doomed: VecDeque<EntityId>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl World {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            tick: 0,
            timers: TimerService::new(),
            layers: BTreeMap::new(),
            entities: HashMap::new(),
            unit_owners: HashMap::new(),
            colliders: ColliderRegistry::default(),
            destroy_timers: HashMap::new(),
            nesting: 0,
            settling: false,
            queued_hooks: VecDeque::new(),
            doomed: VecDeque::new(),
        }
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Simulation ticks elapsed since creation or the last reset.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Drops every entity, timer and registration and rewinds the tick counter.
    pub fn reset(&mut self) {
        self.tick = 0;
        self.timers.clear();
        self.layers.clear();
        self.entities.clear();
        self.unit_owners.clear();
        self.colliders.clear();
        self.destroy_timers.clear();
        self.queued_hooks.clear();
        self.doomed.clear();
    }

    // ── Population ───────────────────────────────────────────────────

    /// Creates an entity and runs its own `start` hook.
    ///
    /// The entity is neither ticked nor drawn until [`World::init`] puts it in a layer.
    pub fn create_entity(&mut self, builder: EntityBuilder) -> EntityId {
        let entity = builder.build();
        let id = entity.id;
        self.unit_owners.insert(id.as_unit(), id);
        self.entities.insert(id, entity);
        self.invoke(id, id.as_unit(), Hook::Start);
        id
    }

    /// Puts an entity into `layer`, moving it out of any previous one.
    pub fn init(&mut self, entity: EntityId, layer: i32) -> Result<EntityId, RuntimeError> {
        let record = self
            .entities
            .get_mut(&entity)
            .filter(|record| !record.doomed)
            .ok_or(RuntimeError::UnknownEntity(entity))?;
        let previous = record.layer.replace(layer);
        if let Some(previous) = previous {
            remove_from_layer(&mut self.layers, previous, entity);
        }
        self.layers.entry(layer).or_default().push(entity);
        debug!(entity_id = %entity, layer, "entity initialized");
        Ok(entity)
    }

    /// Destroys an entity now (`delay == 0`) or after `delay` ticks.
    ///
    /// A new call supersedes any destroy still pending for the same entity.
    /// Destroying an unknown or already destroyed entity does nothing.
    pub fn destroy(&mut self, entity: EntityId, delay: u64) {
        if let Some(timer) = self.destroy_timers.remove(&entity) {
            self.timers.cancel_once(timer);
        }
        match self.entities.get(&entity) {
            Some(record) if !record.doomed => {}
            _ => return,
        }
        if delay == 0 {
            self.destroy_now(entity);
            return;
        }
        let timer = self.timers.schedule_once(
            move |world: &mut World| {
                world.destroy_timers.remove(&entity);
                world.destroy_now(entity);
            },
            delay,
        );
        self.destroy_timers.insert(entity, timer);
        debug!(entity_id = %entity, delay, "destroy scheduled");
    }

    /// Destroys the entity owning `unit`.
    pub fn destroy_unit(&mut self, unit: UnitId, delay: u64) {
        if let Some(owner) = self.unit_owners.get(&unit).copied() {
            self.destroy(owner, delay);
        }
    }

    /// True while a destroy timer is pending for the entity.
    pub fn is_destroy_pending(&self, entity: EntityId) -> bool {
        self.destroy_timers.contains_key(&entity)
    }

    /// True for live entities, including ones whose destroy is waiting for the pass to end.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entity(&self, entity: EntityId) -> Option<&Entity> {
        self.entities.get(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn layer_of(&self, entity: EntityId) -> Option<i32> {
        self.entities.get(&entity).and_then(|record| record.layer)
    }

    pub fn entities_in_layer(&self, layer: i32) -> &[EntityId] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every initialized entity in update order: ascending layer, then insertion.
    pub fn update_order(&self) -> Vec<EntityId> {
        self.layers.values().flatten().copied().collect()
    }

    pub fn owner_of(&self, unit: UnitId) -> Option<EntityId> {
        self.unit_owners.get(&unit).copied()
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attaches a unit to an entity and runs its `start` hook.
    ///
    /// Colliders are registered for collision checks here. A second animation
    /// driver is refused and the first one stays attached.
    pub fn add_component(
        &mut self,
        entity: EntityId,
        unit: impl Into<Unit>,
    ) -> Result<UnitId, RuntimeError> {
        let unit = unit.into();
        let record = self
            .entities
            .get_mut(&entity)
            .filter(|record| !record.doomed)
            .ok_or(RuntimeError::UnknownEntity(entity))?;
        let is_animator = unit.has_capability(Capability::Animator);
        if is_animator && record.animator.is_some() {
            return Err(RuntimeError::AnimatorConflict { entity });
        }

        let id = UnitId::next();
        let is_collider = unit.as_collider().is_some();
        record.units.push(UnitSlot::new(id, unit));
        if is_animator {
            record.animator = Some(id);
        }
        if is_collider {
            record.colliders.push(id);
            self.colliders.register(id, entity);
        }
        self.unit_owners.insert(id, entity);
        debug!(entity_id = %entity, unit_id = %id, is_collider, is_animator, "component attached");

        self.invoke(entity, id, Hook::Start);
        Ok(id)
    }

    /// Detaches a unit without destroying it.
    ///
    /// A removed collider stays in the collision registry; call
    /// [`World::unregister_collider`] first if it should stop taking part in
    /// collision passes. Returns `None` for unknown units, an entity's own
    /// unit, or a behavior that is running one of its hooks.
    pub fn remove_component(&mut self, unit: UnitId) -> Option<Unit> {
        let owner = self.unit_owners.get(&unit).copied()?;
        if owner.as_unit() == unit {
            return None;
        }
        let record = self.entities.get_mut(&owner)?;
        let index = record.units.iter().position(|slot| slot.id == unit)?;
        if record.units[index].is_running() {
            warn!(entity_id = %owner, unit_id = %unit, "refusing to detach a running behavior");
            return None;
        }
        let slot = record.units.remove(index);
        record.colliders.retain(|id| *id != unit);
        if record.animator == Some(unit) {
            record.animator = None;
        }
        self.unit_owners.remove(&unit);
        slot.into_unit()
    }

    /// First attached unit with the capability, in attachment order.
    pub fn get_component(&self, entity: EntityId, capability: Capability) -> Option<UnitId> {
        self.entities
            .get(&entity)?
            .units
            .iter()
            .find(|slot| slot.has_capability(capability))
            .map(|slot| slot.id)
    }

    /// Every attached unit with the capability, in attachment order.
    pub fn get_components(&self, entity: EntityId, capability: Capability) -> Vec<UnitId> {
        self.entities
            .get(&entity)
            .map(|record| {
                record
                    .units
                    .iter()
                    .filter(|slot| slot.has_capability(capability))
                    .map(|slot| slot.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Typed access to a script unit. `None` while the unit is running a hook.
    pub fn behavior<T: Behavior>(&self, unit: UnitId) -> Option<&T> {
        let any: &dyn std::any::Any = self.slot(unit)?.behavior()?;
        any.downcast_ref::<T>()
    }

    pub fn behavior_mut<T: Behavior>(&mut self, unit: UnitId) -> Option<&mut T> {
        match &mut self.slot_mut(unit)?.body {
            SlotBody::Script(Some(behavior)) => {
                let any: &mut dyn std::any::Any = behavior.as_mut();
                any.downcast_mut::<T>()
            }
            _ => None,
        }
    }

    pub fn collider(&self, unit: UnitId) -> Option<&BoxCollider> {
        self.slot(unit)?.collider()
    }

    /// Mutable access to collider shape and flags. Overlap records are kept.
    pub fn collider_mut(&mut self, unit: UnitId) -> Option<&mut BoxCollider> {
        self.slot_mut(unit)?.collider_mut()
    }

    pub fn is_enabled(&self, unit: UnitId) -> Option<bool> {
        self.slot(unit).map(|slot| slot.enabled)
    }

    /// Enables or disables a unit (an entity id disables the entity itself).
    ///
    /// `on_disabled` runs before the flag clears; `on_enabled` runs after it is
    /// set. Setting the current value does nothing. Disabling a collider, or
    /// the entity holding it, ends all of its overlaps.
    pub fn set_enabled(&mut self, unit: impl Into<UnitId>, enabled: bool) -> Result<(), RuntimeError> {
        let unit = unit.into();
        let owner = self
            .unit_owners
            .get(&unit)
            .copied()
            .ok_or(RuntimeError::UnknownUnit(unit))?;
        let current = self.slot(unit).ok_or(RuntimeError::UnknownUnit(unit))?.enabled;
        if current == enabled {
            return Ok(());
        }

        self.begin_pass();
        if enabled {
            self.set_slot_enabled(unit, true);
            self.invoke(owner, unit, Hook::Enabled);
        } else {
            self.invoke(owner, unit, Hook::Disabled);
            self.set_slot_enabled(unit, false);
            let colliders = if unit == owner.as_unit() {
                self.entities
                    .get(&owner)
                    .map(|record| record.colliders.clone())
                    .unwrap_or_default()
            } else if self.collider(unit).is_some() {
                vec![unit]
            } else {
                Vec::new()
            };
            for collider in colliders {
                self.end_overlaps(collider, true);
            }
        }
        self.end_pass();
        Ok(())
    }

    fn set_slot_enabled(&mut self, unit: UnitId, enabled: bool) {
        if let Some(slot) = self.slot_mut(unit) {
            slot.enabled = enabled;
        }
    }

    pub(crate) fn slot(&self, unit: UnitId) -> Option<&UnitSlot> {
        let owner = self.unit_owners.get(&unit)?;
        self.entities.get(owner)?.slot(unit)
    }

    pub(crate) fn slot_mut(&mut self, unit: UnitId) -> Option<&mut UnitSlot> {
        let owner = self.unit_owners.get(&unit)?;
        self.entities.get_mut(owner)?.slot_mut(unit)
    }

    // ── Render descriptor ────────────────────────────────────────────

    /// Sprite sheet id, taken from an enabled animation driver when one is attached.
    pub fn sprite(&self, entity: EntityId) -> Option<&str> {
        let record = self.entities.get(&entity)?;
        if let Some(sprite) = active_animator(record).and_then(|animator| animator.sprite()) {
            return Some(sprite);
        }
        record.sprite.as_deref()
    }

    /// Sprite sheet region, taken from an enabled animation driver when one is attached.
    pub fn sprite_rect(&self, entity: EntityId) -> Option<Rect> {
        let record = self.entities.get(&entity)?;
        active_animator(record)
            .and_then(|animator| animator.sprite_rect())
            .or(record.sprite_rect)
    }

    /// Sets the entity's own sprite. An attached animation driver still wins on read.
    pub fn set_sprite(
        &mut self,
        entity: EntityId,
        sprite: Option<String>,
    ) -> Result<(), RuntimeError> {
        self.entity_mut(entity)?.sprite = sprite;
        Ok(())
    }

    pub fn set_sprite_rect(
        &mut self,
        entity: EntityId,
        rect: Option<Rect>,
    ) -> Result<(), RuntimeError> {
        self.entity_mut(entity)?.sprite_rect = rect;
        Ok(())
    }

    pub fn set_flip(&mut self, entity: EntityId, x: bool, y: bool) -> Result<(), RuntimeError> {
        let record = self.entity_mut(entity)?;
        record.flip_x = x;
        record.flip_y = y;
        Ok(())
    }

    pub fn set_alpha(&mut self, entity: EntityId, alpha: f32) -> Result<(), RuntimeError> {
        self.entity_mut(entity)?.alpha = alpha.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_hidden(&mut self, entity: EntityId, hidden: bool) -> Result<(), RuntimeError> {
        self.entity_mut(entity)?.hidden = hidden;
        Ok(())
    }

    /// Entity size, returned by value.
    pub fn size(&self, entity: EntityId) -> Result<Vector2, RuntimeError> {
        self.entities
            .get(&entity)
            .map(|record| record.size)
            .ok_or(RuntimeError::UnknownEntity(entity))
    }

    pub fn set_size(&mut self, entity: EntityId, size: Vector2) -> Result<(), RuntimeError> {
        self.entity_mut(entity)?.size = size;
        Ok(())
    }

    fn entity_mut(&mut self, entity: EntityId) -> Result<&mut Entity, RuntimeError> {
        self.entities
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))
    }

    /// Renderer view of every visible entity (initialized, enabled, not hidden), in layer order.
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut entities = Vec::new();
        for (layer, ids) in &self.layers {
            for id in ids {
                let Some(record) = self.entities.get(id) else {
                    continue;
                };
                if record.hidden || !record.own.enabled || record.doomed {
                    continue;
                }
                let position = match self.position(*id) {
                    Ok(position) => position,
                    Err(error) => {
                        warn!(entity_id = %id, %error, "skipping entity in snapshot");
                        continue;
                    }
                };
                entities.push(EntitySnapshot {
                    id: *id,
                    layer: *layer,
                    position,
                    size: record.size,
                    sprite: self.sprite(*id).map(str::to_owned),
                    sprite_rect: self.sprite_rect(*id),
                    flip_x: record.flip_x,
                    flip_y: record.flip_y,
                    alpha: record.alpha,
                });
            }
        }
        WorldSnapshot {
            tick: self.tick,
            entities,
        }
    }

    // ── Timers ───────────────────────────────────────────────────────

    pub fn schedule_once(
        &mut self,
        callback: impl FnOnce(&mut World) + Send + 'static,
        delay: u64,
    ) -> TimerId {
        self.timers.schedule_once(callback, delay)
    }

    pub fn cancel_once(&mut self, id: TimerId) {
        self.timers.cancel_once(id);
    }

    pub fn schedule_repeating(
        &mut self,
        callback: impl FnMut(&mut World) + Send + 'static,
        period: u64,
    ) -> TimerId {
        self.timers.schedule_repeating(callback, period)
    }

    pub fn cancel_repeating(&mut self, id: TimerId) {
        self.timers.cancel_repeating(id);
    }

    pub fn is_timer_scheduled(&self, id: TimerId) -> bool {
        self.timers.is_scheduled(id)
    }

    fn advance_timers(&mut self) {
        for id in self.timers.collect_due() {
            match self.timers.take_callback(id) {
                Some(DueCallback::Once(callback)) => callback(self),
                Some(DueCallback::Repeating(mut callback)) => {
                    callback(self);
                    self.timers.restore_callback(id, callback);
                }
                None => {}
            }
        }
    }

    // ── Loop ─────────────────────────────────────────────────────────

    /// Runs the entity's own `update`, then each enabled unit's, in attachment order.
    ///
    /// Colliders in `EveryFrame` mode run their collision pass at their position in that order.
    pub fn tick_entity(&mut self, entity: EntityId) {
        self.begin_pass();
        self.tick_entity_inner(entity);
        self.end_pass();
    }

    fn tick_entity_inner(&mut self, entity: EntityId) {
        let units: Vec<UnitId> = match self.entities.get(&entity) {
            Some(record) if record.own.enabled && !record.doomed => record.unit_ids().collect(),
            _ => return,
        };
        let tick = self.tick;
        self.invoke(entity, entity.as_unit(), Hook::Update(tick));
        for unit in units {
            let every_frame = match self.slot(unit) {
                Some(slot) if slot.enabled => slot
                    .collider()
                    .map(|collider| collider.mode == CheckMode::EveryFrame),
                _ => continue,
            };
            match every_frame {
                Some(true) => {
                    if let Err(error) = self.collision_pass(unit) {
                        warn!(unit_id = %unit, %error, "collision pass failed");
                    }
                }
                Some(false) => {}
                None => self.invoke(entity, unit, Hook::Update(tick)),
            }
        }
    }

    /// Advances one simulation tick.
    ///
    /// Ticks every enabled, initialized entity by ascending layer, fires due
    /// timers, then applies destroys requested along the way.
    pub fn step(&mut self) -> u64 {
        self.tick += 1;
        self.begin_pass();
        for entity in self.update_order() {
            self.tick_entity_inner(entity);
        }
        self.advance_timers();
        self.end_pass();
        self.tick
    }
}

fn active_animator(record: &Entity) -> Option<&dyn Animator> {
    let slot = record.slot(record.animator?)?;
    if !slot.enabled {
        return None;
    }
    slot.behavior()?.animator()
}

fn remove_from_layer(layers: &mut BTreeMap<i32, Vec<EntityId>>, layer: i32, entity: EntityId) {
    if let Some(members) = layers.get_mut(&layer) {
        members.retain(|id| *id != entity);
        if members.is_empty() {
            layers.remove(&layer);
        }
    }
}
