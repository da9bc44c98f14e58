// Hook dispatch and deferred structural changes.
//
// Every hook call and every structural pass (movement, collision, tick) runs
// between `begin_pass` and `end_pass`. While nesting is non-zero:
// - a destroy marks the entity doomed (it leaves its layer and stops
//   colliding at once) and is applied when the outermost pass ends;
// - a hook aimed at a behavior that is currently running is queued and
//   delivered after it returns.

use super::World;
use crate::domain::behavior::{Context, Hook};
use crate::domain::entity::SlotBody;
use crate::domain::ids::{EntityId, UnitId};
use tracing::debug;

impl World {
    pub(crate) fn begin_pass(&mut self) {
        self.nesting += 1;
    }

    pub(crate) fn end_pass(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
        if self.nesting == 0 && !self.settling {
            self.settle();
        }
    }

    fn is_busy(&self) -> bool {
        self.nesting > 0 || self.settling
    }

    // Drains queued hooks, then pending destroys, until both are empty.
    fn settle(&mut self) {
        self.settling = true;
        loop {
            if let Some((entity, unit, hook)) = self.queued_hooks.pop_front() {
                self.invoke(entity, unit, hook);
                continue;
            }
            if let Some(entity) = self.doomed.pop_front() {
                self.finish_destroy(entity);
                continue;
            }
            break;
        }
        self.settling = false;
    }

    /// Runs `hook` on a script unit, lending it a [`Context`] over the whole world.
    pub(crate) fn invoke(&mut self, entity: EntityId, unit: UnitId, hook: Hook) {
        let Some(slot) = self
            .entities
            .get_mut(&entity)
            .and_then(|record| record.slot_mut(unit))
        else {
            return;
        };
        if hook.requires_enabled() && !slot.enabled {
            return;
        }
        let SlotBody::Script(body) = &mut slot.body else {
            return;
        };
        // Running right now: queue behind the hook in progress.
        let Some(mut behavior) = body.take() else {
            self.queued_hooks.push_back((entity, unit, hook));
            return;
        };

        self.begin_pass();
        hook.call(behavior.as_mut(), &mut Context::new(self, entity, unit));
        let slot = self
            .entities
            .get_mut(&entity)
            .and_then(|record| record.slot_mut(unit));
        if let Some(SlotBody::Script(body)) = slot.map(|slot| &mut slot.body) {
            body.get_or_insert(behavior);
        }
        // Hooks that arrived while it ran go out now, ahead of anything later in the pass.
        while let Some(hook) = self.take_queued(entity, unit) {
            self.invoke(entity, unit, hook);
        }
        self.end_pass();
    }

    fn take_queued(&mut self, entity: EntityId, unit: UnitId) -> Option<Hook> {
        let index = self
            .queued_hooks
            .iter()
            .position(|(owner, target, _)| *owner == entity && *target == unit)?;
        self.queued_hooks.remove(index).map(|(_, _, hook)| hook)
    }

    /// Destroys right away when nothing is running, otherwise defers to the end of the pass.
    pub(crate) fn destroy_now(&mut self, entity: EntityId) {
        let busy = self.is_busy();
        let Some(record) = self.entities.get_mut(&entity) else {
            return;
        };
        if record.doomed {
            return;
        }
        if !busy {
            self.finish_destroy(entity);
            return;
        }
        record.doomed = true;
        if let Some(layer) = record.layer {
            super::remove_from_layer(&mut self.layers, layer, entity);
        }
        self.doomed.push_back(entity);
        debug!(entity_id = %entity, "destroy deferred to end of pass");
    }

    // Removes the entity from its layer, ends its colliders' overlaps and runs
    // `on_destroy` on every unit and then on the entity itself.
    fn finish_destroy(&mut self, entity: EntityId) {
        let Some(record) = self.entities.get_mut(&entity) else {
            return;
        };
        // Out of the layer first so no later lookup renders or ticks it.
        record.doomed = true;
        let layer = record.layer.take();
        let units: Vec<(UnitId, bool)> = record
            .units
            .iter()
            .map(|slot| (slot.id, slot.collider().is_some()))
            .collect();
        if let Some(layer) = layer {
            super::remove_from_layer(&mut self.layers, layer, entity);
        }
        if let Some(timer) = self.destroy_timers.remove(&entity) {
            self.timers.cancel_once(timer);
        }

        // Colliders end their overlaps; scripts get on_destroy, the entity last.
        self.begin_pass();
        for (unit, is_collider) in &units {
            if *is_collider {
                self.end_overlaps(*unit, false);
                self.colliders.unregister(*unit);
            } else {
                self.invoke(entity, *unit, Hook::Destroy);
            }
        }
        self.invoke(entity, entity.as_unit(), Hook::Destroy);

        // Forget every id the entity owned.
        self.entities.remove(&entity);
        self.unit_owners.remove(&entity.as_unit());
        for (unit, _) in units {
            self.unit_owners.remove(&unit);
            self.colliders.unregister(unit);
        }
        debug!(entity_id = %entity, "entity destroyed");
        self.end_pass();
    }
}
