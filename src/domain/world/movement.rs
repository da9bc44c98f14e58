// Parent-relative positions and collision-resolved movement.

use super::World;
use crate::domain::collider::CheckMode;
use crate::domain::errors::RuntimeError;
use crate::domain::ids::{EntityId, UnitId};
use crate::domain::math::Vector2;

impl World {
    /// Absolute position: the local position plus every ancestor's.
    pub fn position(&self, entity: EntityId) -> Result<Vector2, RuntimeError> {
        let mut record = self
            .entities
            .get(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))?;
        let mut position = record.local_position;
        let mut hops = 0;
        while let Some(parent) = record.parent {
            hops += 1;
            if hops > self.entities.len() {
                return Err(RuntimeError::BrokenParentChain(entity));
            }
            record = self
                .entities
                .get(&parent)
                .ok_or(RuntimeError::BrokenParentChain(entity))?;
            position += record.local_position;
        }
        Ok(position)
    }

    pub fn local_position(&self, entity: EntityId) -> Result<Vector2, RuntimeError> {
        self.entities
            .get(&entity)
            .map(|record| record.local_position)
            .ok_or(RuntimeError::UnknownEntity(entity))
    }

    /// Overwrites the local position without any collision resolution.
    pub fn set_local_position(
        &mut self,
        entity: EntityId,
        position: Vector2,
    ) -> Result<(), RuntimeError> {
        self.entity_mut(entity)?.local_position = position;
        Ok(())
    }

    /// Re-parents an entity, keeping its local position.
    pub fn set_parent(
        &mut self,
        entity: EntityId,
        parent: Option<EntityId>,
    ) -> Result<(), RuntimeError> {
        if let Some(parent) = parent {
            if !self.entities.contains_key(&parent) {
                return Err(RuntimeError::UnknownEntity(parent));
            }
        }
        self.entity_mut(entity)?.parent = parent;
        Ok(())
    }

    /// Moves an entity toward an absolute `target`, returning where it ended up.
    ///
    /// Without colliders the move is applied as is. Otherwise the delta is
    /// split into `collision_iterations` steps and each step is tried on X,
    /// then on Y. After each axis move every `OnMoved` collider runs its pass;
    /// a blocking overlap rolls that axis step back and freezes the axis for
    /// the rest of the call, while the other axis keeps going. Committed steps
    /// stay committed.
    pub fn set_position(
        &mut self,
        entity: EntityId,
        target: Vector2,
    ) -> Result<Vector2, RuntimeError> {
        let current = self.position(entity)?;
        let delta = target - current;
        if delta == Vector2::ZERO {
            return Ok(current);
        }
        let colliders = self
            .entities
            .get(&entity)
            .map(|record| record.colliders.clone())
            .unwrap_or_default();
        if colliders.is_empty() {
            self.entity_mut(entity)?.local_position += delta;
            return self.position(entity);
        }

        self.begin_pass();
        let result = self
            .resolve_movement(entity, delta, &colliders)
            .and_then(|()| self.position(entity));
        self.end_pass();
        result
    }

    /// `set_position` relative to the current absolute position.
    pub fn translate(&mut self, entity: EntityId, delta: Vector2) -> Result<Vector2, RuntimeError> {
        let current = self.position(entity)?;
        self.set_position(entity, current + delta)
    }

    fn resolve_movement(
        &mut self,
        entity: EntityId,
        delta: Vector2,
        colliders: &[UnitId],
    ) -> Result<(), RuntimeError> {
        let iterations = self.config.collision_iterations.max(1);
        let step = delta / iterations as f32;
        let mut frozen = [false; 2];

        for _ in 0..iterations {
            // X then Y, each checked on its own.
            for axis in 0..2 {
                if frozen[axis] || step[axis] == 0.0 {
                    continue;
                }
                let before = self.local_position(entity)?;
                let mut moved = before;
                moved[axis] += step[axis];
                self.set_local_position(entity, moved)?;

                // Only colliders that check on move take part here.
                let mut blocked = false;
                for &collider in colliders {
                    let checks_on_move = self.slot(collider).is_some_and(|slot| {
                        slot.enabled
                            && slot
                                .collider()
                                .is_some_and(|shape| shape.mode == CheckMode::OnMoved)
                    });
                    if checks_on_move {
                        blocked |= self.collision_pass(collider)?;
                    }
                }

                // Roll the axis back and keep it still for the remaining steps.
                if blocked {
                    if self.entities.contains_key(&entity) {
                        self.set_local_position(entity, before)?;
                    }
                    frozen[axis] = true;
                }
            }
        }
        Ok(())
    }
}
