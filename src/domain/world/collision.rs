// Tag-filtered pairwise collision passes and the enter/stay/exit transitions.

use super::World;
use crate::domain::behavior::{Hook, Phase};
use crate::domain::collider::{Collision, CollisionTag, is_ignored_by_tags};
use crate::domain::errors::RuntimeError;
use crate::domain::ids::UnitId;
use crate::domain::math::Rect;
use std::collections::BTreeSet;
use tracing::trace;

impl World {
    /// Runs one collider's pass against every other registered collider.
    ///
    /// Fires enter/stay/exit hooks on the collider's entity for its own side of
    /// each pair and returns true if any current overlap is blocking (neither
    /// side is a trigger).
    pub fn update_collision(&mut self, collider: UnitId) -> Result<bool, RuntimeError> {
        if self.slot(collider).is_none() {
            return Err(RuntimeError::UnknownUnit(collider));
        }
        if self.collider(collider).is_none() {
            return Err(RuntimeError::NotACollider(collider));
        }
        self.begin_pass();
        let result = self.collision_pass(collider);
        self.end_pass();
        result
    }

    pub(crate) fn collision_pass(&mut self, collider: UnitId) -> Result<bool, RuntimeError> {
        let Some(owner) = self.colliders.owner(collider) else {
            return Ok(false);
        };
        let mut blocking = false;

        // Ids copied up front; hooks below may register or drop colliders.
        for other in self.colliders.snapshot() {
            if other == collider {
                continue;
            }
            // A hook may have unregistered either side mid-pass.
            if !self.colliders.contains(collider) {
                break;
            }
            let Some(other_owner) = self.colliders.owner(other) else {
                continue;
            };
            // Units of the same entity never collide.
            if other_owner == owner {
                continue;
            }

            let hit = self.can_collide(collider, other) && self.collides(collider, other)?;
            let was_overlapping = self
                .collider(collider)
                .is_some_and(|state| state.is_overlapping(other));

            if hit {
                // Record on this side only; the other side records on its own pass.
                let Some(partner) = self.collision_info(other) else {
                    continue;
                };
                if !self.is_trigger(collider) && !partner.trigger {
                    blocking = true;
                }
                if let Some(state) = self.collider_mut(collider) {
                    state.overlaps.insert(other, partner);
                }
                let phase = if was_overlapping {
                    Phase::Stay
                } else {
                    Phase::Enter
                };
                self.notify(collider, partner, phase);
            } else if was_overlapping {
                // Separated since the last pass.
                self.end_pair(collider, other, true);
            }
        }

        Ok(blocking)
    }

    /// Both colliders active (enabled, on a live enabled entity, registered) and not tag-ignored.
    pub fn can_collide(&self, a: UnitId, b: UnitId) -> bool {
        match (self.active_collider_tag(a), self.active_collider_tag(b)) {
            (Some(tag_a), Some(tag_b)) => !is_ignored_by_tags(tag_a, tag_b),
            _ => false,
        }
    }

    /// Shape test: the two boxes overlap, or sit closer than the configured epsilon.
    pub fn collides(&self, a: UnitId, b: UnitId) -> Result<bool, RuntimeError> {
        let bounds_a = self.collider_bounds(a)?;
        let bounds_b = self.collider_bounds(b)?;
        Ok(bounds_a.intersects_within(&bounds_b, self.config.collision_epsilon))
    }

    /// World-space box of a collider, derived from its owner's position and size.
    pub fn collider_bounds(&self, collider: UnitId) -> Result<Rect, RuntimeError> {
        let owner = self
            .unit_owners
            .get(&collider)
            .copied()
            .ok_or(RuntimeError::DetachedCollider(collider))?;
        let record = self
            .entities
            .get(&owner)
            .ok_or(RuntimeError::DetachedCollider(collider))?;
        let shape = record
            .slot(collider)
            .and_then(|slot| slot.collider())
            .ok_or(RuntimeError::NotACollider(collider))?;
        Ok(shape.bounds(self.position(owner)?, record.size))
    }

    /// Partners currently recorded as overlapping `collider`.
    pub fn overlaps(&self, collider: UnitId) -> Vec<UnitId> {
        self.collider(collider)
            .map(|state| state.overlaps().collect())
            .unwrap_or_default()
    }

    /// Takes a collider out of collision passes, ending its overlaps on both sides.
    pub fn unregister_collider(&mut self, collider: UnitId) {
        if !self.colliders.contains(collider) {
            return;
        }
        self.begin_pass();
        self.end_overlaps(collider, true);
        self.colliders.unregister(collider);
        self.end_pass();
    }

    pub fn registered_colliders(&self) -> Vec<UnitId> {
        self.colliders.snapshot()
    }

    fn active_collider_tag(&self, collider: UnitId) -> Option<CollisionTag> {
        let owner = self.colliders.owner(collider)?;
        let record = self.entities.get(&owner)?;
        if record.doomed || !record.own.enabled {
            return None;
        }
        let slot = record.slot(collider)?;
        if !slot.enabled {
            return None;
        }
        slot.collider().map(|shape| shape.tag)
    }

    fn is_trigger(&self, collider: UnitId) -> bool {
        self.collider(collider).is_some_and(|shape| shape.is_trigger)
    }

    fn collision_info(&self, collider: UnitId) -> Option<Collision> {
        let entity = self.unit_owners.get(&collider).copied()?;
        let shape = self.collider(collider)?;
        Some(Collision {
            entity,
            collider,
            tag: shape.tag,
            trigger: shape.is_trigger,
        })
    }

    /// Ends every overlap `collider` takes part in, on either side.
    ///
    /// Partners are always notified; the collider's own entity only when `notify_self`.
    pub(crate) fn end_overlaps(&mut self, collider: UnitId, notify_self: bool) {
        let mut partners: BTreeSet<UnitId> = self
            .collider(collider)
            .map(|state| state.overlaps().collect())
            .unwrap_or_default();
        for other in self.colliders.snapshot() {
            if self
                .collider(other)
                .is_some_and(|state| state.is_overlapping(collider))
            {
                partners.insert(other);
            }
        }
        for other in partners {
            self.end_pair(collider, other, notify_self);
        }
    }

    // Clears the pair from both sides and fires exit on each side that had it recorded.
    fn end_pair(&mut self, a: UnitId, b: UnitId, notify_a: bool) {
        let a_saw = self
            .collider_mut(a)
            .and_then(|state| state.overlaps.remove(&b));
        let b_saw = self
            .collider_mut(b)
            .and_then(|state| state.overlaps.remove(&a));
        if let Some(partner) = a_saw {
            if notify_a {
                self.notify(a, partner, Phase::Exit);
            }
        }
        if let Some(partner) = b_saw {
            self.notify(b, partner, Phase::Exit);
        }
    }

    // Delivers a transition to the receiver's entity and its other units.
    fn notify(&mut self, receiver: UnitId, other: Collision, phase: Phase) {
        let Some(owner) = self.unit_owners.get(&receiver).copied() else {
            return;
        };
        let Some(trigger) = self.collider(receiver).map(|shape| shape.is_trigger) else {
            return;
        };
        let Some(record) = self.entities.get(&owner) else {
            return;
        };
        let targets: Vec<UnitId> = std::iter::once(owner.as_unit())
            .chain(record.unit_ids().filter(|unit| *unit != receiver))
            .collect();
        trace!(
            entity_id = %owner,
            collider_id = %receiver,
            other_entity_id = %other.entity,
            ?phase,
            trigger,
            "collision transition"
        );
        let hook = if trigger {
            Hook::Trigger(phase, other)
        } else {
            Hook::Collision(phase, other)
        };
        for unit in targets {
            self.invoke(owner, unit, hook);
        }
    }
}
