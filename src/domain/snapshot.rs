// Per-tick renderer view of the visible population.

use super::ids::EntityId;
use super::math::{Rect, Vector2};

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub layer: i32,
    pub position: Vector2,
    pub size: Vector2,
    pub sprite: Option<String>,
    pub sprite_rect: Option<Rect>,
    pub flip_x: bool,
    pub flip_y: bool,
    pub alpha: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    /// Visible entities in draw order: ascending layer, then insertion.
    pub entities: Vec<EntitySnapshot>,
}
