// Shared helpers for integration tests: a hook-recording behavior and box spawning.
#![allow(dead_code)]

use entity_runtime::domain::{
    Behavior, BoxCollider, Collision, CollisionTag, Context, EntityBuilder, EntityId, UnitId,
    Vector2, World,
};
use std::sync::{Arc, Mutex};

// Hook kinds observed by a `Recorder`.
#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    Update(u64),
    Destroy,
    CollisionEnter(EntityId),
    CollisionStay(EntityId),
    CollisionExit(EntityId),
    TriggerEnter(EntityId),
}

// Shared log so a test can read what a behavior owned by the world observed.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<Seen>>>);

impl Log {
    pub fn all(&self) -> Vec<Seen> {
        self.0.lock().expect("log poisoned").clone()
    }

    pub fn count(&self, seen: &Seen) -> usize {
        self.all().iter().filter(|entry| *entry == seen).count()
    }

    fn push(&self, seen: Seen) {
        self.0.lock().expect("log poisoned").push(seen);
    }
}

pub struct Recorder {
    pub log: Log,
}

impl Behavior for Recorder {
    fn update(&mut self, _ctx: &mut Context<'_>, tick: u64) {
        self.log.push(Seen::Update(tick));
    }

    fn on_destroy(&mut self, _ctx: &mut Context<'_>) {
        self.log.push(Seen::Destroy);
    }

    fn on_collision_enter(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log.push(Seen::CollisionEnter(other.entity));
    }

    fn on_collision_stay(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log.push(Seen::CollisionStay(other.entity));
    }

    fn on_collision_exit(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log.push(Seen::CollisionExit(other.entity));
    }

    fn on_trigger_enter(&mut self, _ctx: &mut Context<'_>, other: Collision) {
        self.log.push(Seen::TriggerEnter(other.entity));
    }
}

// Creates an entity with a recorder script and a square collider of `side` units.
pub fn spawn_square(
    world: &mut World,
    tag: CollisionTag,
    position: Vector2,
    side: f32,
) -> (EntityId, UnitId, Log) {
    let log = Log::default();
    let entity = world.create_entity(
        EntityBuilder::new()
            .with_position(position)
            .with_script(Recorder { log: log.clone() }),
    );
    let collider = world
        .add_component(entity, BoxCollider::new(tag, Vector2::splat(side)))
        .expect("collider attaches");
    (entity, collider, log)
}
