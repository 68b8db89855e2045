//! Movement integration test
//!
//! Полный App на плоском уровне: стояние на полу, ходьба, прыжок,
//! сбор монеты, restart.

use bevy::prelude::*;
use emberfall_simulation::config::SolidConfig;
use emberfall_simulation::items::Coin;
use emberfall_simulation::physics::CharacterController;
use emberfall_simulation::*;

fn flat_level() -> LevelConfig {
    LevelConfig {
        name: "flat".into(),
        solids: vec![SolidConfig {
            position: Vec2::new(0.0, -0.5),
            half_extents: Vec2::new(50.0, 0.5),
        }],
        ..default()
    }
}

/// Startup + пара тиков, чтобы игрок встал на пол
fn start(level: LevelConfig) -> (App, Entity) {
    let mut app = create_simulation_app(7, level);
    app.update();
    let player = find_player(app.world_mut()).expect("player spawned");
    run(&mut app, 5);
    (app, player)
}

fn run(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn position(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .get::<Transform>(entity)
        .map(|transform| transform.translation.truncate())
        .expect("transform")
}

fn input(app: &mut App, entity: Entity) -> Mut<'_, PlayerInput> {
    app.world_mut().get_mut::<PlayerInput>(entity).expect("input")
}

#[test]
fn test_player_rests_on_floor() {
    let (mut app, player) = start(flat_level());
    run(&mut app, 60);

    let position = position(&app, player);
    assert!((position.y - 0.5).abs() < 1e-3, "player y = {}", position.y);
    assert!(app
        .world()
        .get::<CharacterController>(player)
        .is_some_and(|controller| controller.grounded));
}

#[test]
fn test_walk_right_moves_player() {
    let (mut app, player) = start(flat_level());

    input(&mut app, player).press(InputKey::Right);
    run(&mut app, 60);

    let after = position(&app, player);
    // walk speed 2.0, ~1 сек ходьбы с разгоном
    assert!(after.x > 1.5 && after.x < 2.1, "player x = {}", after.x);
    assert!((after.y - 0.5).abs() < 1e-3);
    assert!(app.world().get::<Facing>(player).is_some_and(|facing| facing.right));
}

#[test]
fn test_jump_leaves_ground_and_lands() {
    let (mut app, player) = start(flat_level());

    input(&mut app, player).tap(InputKey::Jump);
    let mut peak: f32 = 0.0;
    for _ in 0..30 {
        app.update();
        peak = peak.max(position(&app, player).y);
    }
    assert!(peak > 1.0, "peak = {}", peak);

    run(&mut app, 90);
    assert!((position(&app, player).y - 0.5).abs() < 1e-3);
    let character = app.world().get::<PlayerCharacter>(player).expect("character");
    assert_eq!(character.jumps, 0);
    assert!(!character.is_jumping);
}

#[test]
fn test_walking_into_coin_collects_it() {
    let mut level = flat_level();
    level.pickups.push(config::PickupConfig::Coin {
        position: Vec2::new(1.5, 0.5),
        value: 3,
    });
    let (mut app, player) = start(level);

    input(&mut app, player).press(InputKey::Right);
    run(&mut app, 90);

    assert_eq!(app.world().resource::<LevelManager>().coins, 3);
    let mut coins = app.world_mut().query::<&Coin>();
    assert_eq!(coins.iter(app.world()).count(), 0);
}

#[test]
fn test_restart_resets_level_and_player() {
    let mut level = flat_level();
    level.pickups.push(config::PickupConfig::Coin {
        position: Vec2::new(1.5, 0.5),
        value: 1,
    });
    let (mut app, player) = start(level);

    input(&mut app, player).press(InputKey::Right);
    run(&mut app, 90);
    input(&mut app, player).release(InputKey::Right);
    run(&mut app, 2);
    assert_eq!(app.world().resource::<LevelManager>().coins, 1);

    input(&mut app, player).tap(InputKey::Restart);
    run(&mut app, 2);

    assert_eq!(app.world().resource::<LevelManager>().coins, 0);
    assert!(position(&app, player).x.abs() < 0.1, "player x = {}", position(&app, player).x);
    let mut coins = app.world_mut().query::<&Coin>();
    assert_eq!(coins.iter(app.world()).count(), 1, "монета вернулась на уровень");
}
