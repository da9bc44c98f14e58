// Headless demo scene: a patrolling ship between two walls and drifting enemies.

use crate::domain::{
    Behavior, BoxCollider, Collision, CollisionTag, Context, EntityBuilder, EntityId, Rect,
    RuntimeError, SpriteAnimator, TimerId, Unit, Vector2, World,
};
use tracing::{debug, info, warn};

const BACKDROP_LAYER: i32 = 0;
const ACTOR_LAYER: i32 = 1;

const WALL_X: f32 = 120.0;
const SPAWN_PERIOD_TICKS: u64 = 45;
const DRIFTER_LIFETIME_TICKS: u64 = 150;

/// Ids of the long-lived entities in the demo scene.
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    pub ship: EntityId,
    pub walls: [EntityId; 2],
    pub spawner: EntityId,
}

/// Populates `world` with the demo scene.
pub fn populate(world: &mut World) -> Result<Scene, RuntimeError> {
    let ship = world.create_entity(
        EntityBuilder::new()
            .with_script(Patrol {
                velocity: Vector2::new(2.0, 0.0),
            })
            .with_size(Vector2::splat(16.0))
            .with_sprite("ship"),
    );
    let frames = (0..2)
        .map(|i| Rect::new(i as f32 * 16.0, 0.0, 16.0, 16.0))
        .collect();
    world.add_component(ship, Unit::script(SpriteAnimator::new("ship", frames, 8)))?;
    world.add_component(
        ship,
        BoxCollider::new(CollisionTag::Player, Vector2::ONE).scale_with_parent(),
    )?;
    world.init(ship, ACTOR_LAYER)?;

    let mut walls = [ship; 2];
    for (slot, x) in walls.iter_mut().zip([-WALL_X, WALL_X]) {
        let wall = world.create_entity(
            EntityBuilder::new()
                .with_position(Vector2::new(x, 0.0))
                .with_size(Vector2::new(8.0, 64.0))
                .with_sprite("wall"),
        );
        world.add_component(
            wall,
            BoxCollider::new(CollisionTag::Wall, Vector2::ONE).scale_with_parent(),
        )?;
        world.init(wall, BACKDROP_LAYER)?;
        *slot = wall;
    }

    let spawner = world.create_entity(
        EntityBuilder::new()
            .with_script(Spawner {
                period: SPAWN_PERIOD_TICKS,
                lifetime: DRIFTER_LIFETIME_TICKS,
                timer: None,
            })
            .with_position(Vector2::new(0.0, -80.0)),
    );
    world.set_hidden(spawner, true)?;
    world.init(spawner, BACKDROP_LAYER)?;

    info!(
        ship_id = %ship,
        spawner_id = %spawner,
        entities = world.len(),
        "demo scene populated"
    );
    Ok(Scene {
        ship,
        walls,
        spawner,
    })
}

// Moves sideways every tick and turns around on walls.
struct Patrol {
    velocity: Vector2,
}

impl Behavior for Patrol {
    fn update(&mut self, ctx: &mut Context<'_>, _tick: u64) {
        if let Err(error) = ctx.translate(self.velocity) {
            warn!(entity_id = %ctx.entity(), %error, "patrol move failed");
        }
    }

    fn on_collision_enter(&mut self, ctx: &mut Context<'_>, other: Collision) {
        match other.tag {
            CollisionTag::Wall => {
                self.velocity.x = -self.velocity.x;
                let entity = ctx.entity();
                let flip = self.velocity.x < 0.0;
                if let Err(error) = ctx.world_mut().set_flip(entity, flip, false) {
                    warn!(entity_id = %entity, %error, "failed to flip sprite");
                }
            }
            tag => {
                info!(entity_id = %ctx.entity(), other_entity_id = %other.entity, ?tag, "ship hit");
            }
        }
    }
}

// Emits a drifter from its own position on a repeating timer.
struct Spawner {
    period: u64,
    lifetime: u64,
    timer: Option<TimerId>,
}

impl Behavior for Spawner {
    fn start(&mut self, ctx: &mut Context<'_>) {
        let origin = ctx.position().unwrap_or_default();
        let lifetime = self.lifetime;
        let timer = ctx.schedule_repeating(
            move |world: &mut World| {
                if let Err(error) = spawn_drifter(world, origin, lifetime) {
                    warn!(%error, "failed to spawn drifter");
                }
            },
            self.period,
        );
        self.timer = Some(timer);
    }

    fn on_destroy(&mut self, ctx: &mut Context<'_>) {
        if let Some(timer) = self.timer.take() {
            ctx.world_mut().cancel_repeating(timer);
        }
    }
}

// Falls straight down and vanishes on the first solid contact.
struct Drifter {
    velocity: Vector2,
}

impl Behavior for Drifter {
    fn update(&mut self, ctx: &mut Context<'_>, _tick: u64) {
        if let Err(error) = ctx.translate(self.velocity) {
            warn!(entity_id = %ctx.entity(), %error, "drifter move failed");
        }
    }

    fn on_collision_enter(&mut self, ctx: &mut Context<'_>, _other: Collision) {
        ctx.destroy(0);
    }
}

fn spawn_drifter(world: &mut World, origin: Vector2, lifetime: u64) -> Result<EntityId, RuntimeError> {
    let drifter = world.create_entity(
        EntityBuilder::new()
            .with_script(Drifter {
                velocity: Vector2::new(0.0, 1.5),
            })
            .with_position(origin)
            .with_size(Vector2::splat(12.0))
            .with_sprite("drifter"),
    );
    world.add_component(drifter, BoxCollider::new(CollisionTag::Enemy, Vector2::splat(12.0)))?;
    world.init(drifter, ACTOR_LAYER)?;
    world.destroy(drifter, lifetime);
    debug!(entity_id = %drifter, tick = world.tick(), "drifter spawned");
    Ok(drifter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_scene_runs_then_ship_stays_between_the_walls() {
        let mut world = World::default();
        let scene = populate(&mut world).expect("scene builds");

        for _ in 0..400 {
            world.step();
            let x = world.position(scene.ship).expect("ship lives").x;
            assert!(x.abs() < WALL_X, "ship escaped at x = {x}");
        }
    }

    #[test]
    fn when_spawn_period_elapses_then_drifters_appear_and_expire() {
        let mut world = World::default();
        populate(&mut world).expect("scene builds");
        let base = world.len();

        for _ in 0..SPAWN_PERIOD_TICKS {
            world.step();
        }
        assert_eq!(world.len(), base + 1);

        for _ in 0..DRIFTER_LIFETIME_TICKS {
            world.step();
        }
        assert!(world.len() <= base + (DRIFTER_LIFETIME_TICKS / SPAWN_PERIOD_TICKS) as usize + 1);
    }

    #[test]
    fn when_spawner_is_destroyed_then_no_more_drifters_spawn() {
        let mut world = World::default();
        let scene = populate(&mut world).expect("scene builds");

        world.destroy(scene.spawner, 0);
        let remaining = world.len();
        for _ in 0..(SPAWN_PERIOD_TICKS * 3) {
            world.step();
        }

        assert_eq!(world.len(), remaining);
    }
}
