// Wire DTOs for renderer and relay collaborators.

use crate::domain::{EntitySnapshot, Rect, WorldSnapshot};
use serde::Serialize;

/// Messages published to whoever draws or relays the world.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutboundMessage {
    // Visible population for a given tick.
    WorldUpdate(WorldUpdateDto),
}

/// Snapshot of the visible world for one tick.
#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub entities: Vec<EntityStateDto>,
}

impl From<&WorldSnapshot> for WorldUpdateDto {
    fn from(snapshot: &WorldSnapshot) -> Self {
        Self {
            tick: snapshot.tick,
            entities: snapshot.entities.iter().map(EntityStateDto::from).collect(),
        }
    }
}

/// Flattened render state of one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityStateDto {
    pub id: u64,
    pub layer: i32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite_rect: Option<Rect>,
    pub flip_x: bool,
    pub flip_y: bool,
    pub alpha: f32,
}

impl From<&EntitySnapshot> for EntityStateDto {
    fn from(entity: &EntitySnapshot) -> Self {
        Self {
            id: entity.id.raw(),
            layer: entity.layer,
            x: entity.position.x,
            y: entity.position.y,
            w: entity.size.x,
            h: entity.size.y,
            sprite: entity.sprite.clone(),
            sprite_rect: entity.sprite_rect,
            flip_x: entity.flip_x,
            flip_y: entity.flip_y,
            alpha: entity.alpha,
        }
    }
}

/// Serializes a snapshot as a tagged `WorldUpdate` JSON message.
pub fn encode_update(snapshot: &WorldSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundMessage::WorldUpdate(WorldUpdateDto::from(
        snapshot,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityBuilder, SpriteAnimator, Unit, Vector2, World};
    use serde_json::Value;

    #[test]
    fn when_encoding_update_then_message_is_tagged_and_flattened() {
        let mut world = World::default();
        let ship = world.create_entity(
            EntityBuilder::new()
                .with_position(Vector2::new(4.0, -2.0))
                .with_size(Vector2::new(16.0, 8.0)),
        );
        world.init(ship, 2).expect("init");
        world.step();

        let text = encode_update(&world.snapshot()).expect("encode");
        let value: Value = serde_json::from_str(&text).expect("valid json");

        assert_eq!(value["type"], "WorldUpdate");
        assert_eq!(value["data"]["tick"], 1);
        let entity = &value["data"]["entities"][0];
        assert_eq!(entity["id"], ship.raw());
        assert_eq!(entity["layer"], 2);
        assert_eq!(entity["x"], 4.0);
        assert_eq!(entity["y"], -2.0);
        assert_eq!(entity["w"], 16.0);
        assert_eq!(entity["h"], 8.0);
        assert!(entity.get("sprite").is_none());
    }

    #[test]
    fn when_entity_is_animated_then_dto_carries_the_driver_frame() {
        let mut world = World::default();
        let ship = world.create_entity(EntityBuilder::new().with_sprite("idle"));
        let frame = Rect::new(16.0, 0.0, 16.0, 16.0);
        world
            .add_component(ship, Unit::script(SpriteAnimator::new("thrust", vec![frame], 1)))
            .expect("attach");
        world.init(ship, 0).expect("init");

        let update = WorldUpdateDto::from(&world.snapshot());

        assert_eq!(update.entities[0].sprite.as_deref(), Some("thrust"));
        assert_eq!(update.entities[0].sprite_rect, Some(frame));
    }
}
