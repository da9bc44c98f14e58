mod support;

use entity_runtime::domain::{
    BoxCollider, CollisionTag, EntityBuilder, Rect, RuntimeError, SpriteAnimator, TimerService,
    Unit, Vector2, World,
};
use support::{Seen, spawn_square};

#[test]
fn test_boxes_within_epsilon_collide_until_moved_apart() {
    let mut world = World::default();
    let (_, first, _) = spawn_square(&mut world, CollisionTag::Player, Vector2::ZERO, 16.0);
    let (second_entity, second, _) = spawn_square(
        &mut world,
        CollisionTag::Enemy,
        Vector2::new(15.0, 15.0),
        16.0,
    );

    assert_eq!(world.collides(first, second), Ok(true));

    world
        .set_local_position(second_entity, Vector2::new(20.0, 20.0))
        .expect("move");
    assert_eq!(world.collides(first, second), Ok(false));
}

#[test]
fn test_blocked_axis_rolls_back_while_other_axis_applies() {
    let mut world = World::default();
    let (player, _, _) = spawn_square(&mut world, CollisionTag::Player, Vector2::ZERO, 16.0);
    // Enemy's left edge sits 5 units right of the player's right edge.
    spawn_square(&mut world, CollisionTag::Enemy, Vector2::new(21.0, 0.0), 16.0);

    let blocked = world
        .translate(player, Vector2::new(10.0, 0.0))
        .expect("move");
    assert_eq!(blocked, Vector2::ZERO);

    let slid = world
        .translate(player, Vector2::new(10.0, -6.0))
        .expect("move");
    assert_eq!(slid, Vector2::new(0.0, -6.0));
}

#[test]
fn test_one_shot_timer_fires_once_after_its_delay() {
    let mut timers = TimerService::<u32>::new();
    let mut fired = 0u32;
    timers.schedule_once(|count: &mut u32| *count += 1, 3);

    timers.advance(&mut fired);
    timers.advance(&mut fired);
    assert_eq!(fired, 0);

    timers.advance(&mut fired);
    assert_eq!(fired, 1);

    for _ in 0..10 {
        timers.advance(&mut fired);
    }
    assert_eq!(fired, 1);
}

#[test]
fn test_second_animation_driver_is_rejected() {
    let mut world = World::default();
    let ship = world.create_entity(EntityBuilder::new());
    let frames = vec![Rect::new(0.0, 0.0, 16.0, 16.0)];
    let first = world
        .add_component(ship, Unit::script(SpriteAnimator::new("idle", frames.clone(), 4)))
        .expect("first driver attaches");

    let second = world.add_component(ship, Unit::script(SpriteAnimator::new("boost", frames, 4)));

    assert_eq!(second, Err(RuntimeError::AnimatorConflict { entity: ship }));
    assert_eq!(world.entity(ship).and_then(|e| e.animator_id()), Some(first));
    assert_eq!(world.sprite(ship), Some("idle"));
}

#[test]
fn test_reissued_destroy_replaces_the_pending_one() {
    let mut world = World::default();
    let (entity, _, log) = spawn_square(&mut world, CollisionTag::Default, Vector2::ZERO, 1.0);
    world.init(entity, 0).expect("init");

    world.destroy(entity, 5);
    world.step();
    world.destroy(entity, 2);

    world.step();
    assert!(world.contains(entity));
    world.step();
    assert!(!world.contains(entity));

    for _ in 0..10 {
        world.step();
    }
    assert_eq!(log.count(&Seen::Destroy), 1);
}

#[test]
fn test_trigger_overlap_reports_without_blocking() {
    let mut world = World::default();
    let (player, player_collider, player_log) =
        spawn_square(&mut world, CollisionTag::Player, Vector2::ZERO, 16.0);
    let pickup = world.create_entity(EntityBuilder::new().with_position(Vector2::new(20.0, 0.0)));
    world
        .add_component(
            pickup,
            BoxCollider::new(CollisionTag::Pickup, Vector2::splat(8.0)).trigger(),
        )
        .expect("attach");

    let moved = world
        .translate(player, Vector2::new(10.0, 0.0))
        .expect("move");

    assert_eq!(moved, Vector2::new(10.0, 0.0));
    assert_eq!(player_log.count(&Seen::CollisionEnter(pickup)), 1);
    assert_eq!(world.overlaps(player_collider).len(), 1);
}
