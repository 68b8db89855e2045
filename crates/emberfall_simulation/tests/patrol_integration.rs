//! Patrol integration test
//!
//! Подвижный враг в состоянии Patrolling: разворот у стены, у края
//! платформы и на границе patrol radius. Игрок далеко за detection range.

use bevy::prelude::*;
use emberfall_simulation::ai::EnemyBrain;
use emberfall_simulation::config::{EnemySpawn, PlayerConfig, SolidConfig};
use emberfall_simulation::*;

fn solid(x: f32, y: f32, half_x: f32, half_y: f32) -> SolidConfig {
    SolidConfig {
        position: Vec2::new(x, y),
        half_extents: Vec2::new(half_x, half_y),
    }
}

/// Уровень с отдельным полом для игрока у x = -100
fn level(mut solids: Vec<SolidConfig>, enemy_x: f32, patrol_radius: f32) -> LevelConfig {
    solids.push(solid(-100.0, -0.5, 2.0, 0.5));
    LevelConfig {
        name: "patrol".into(),
        solids,
        player: PlayerConfig {
            position: Vec2::new(-100.0, 0.5),
            ..default()
        },
        enemies: vec![EnemySpawn {
            position: Vec2::new(enemy_x, 0.5),
            facing_right: true,
            enemy: EnemyConfig {
                is_static: false,
                patrol_radius,
                ..default()
            },
            ..default()
        }],
        ..default()
    }
}

/// Startup + перевод врага в Patrolling
fn start(level: LevelConfig) -> (App, Entity) {
    let mut app = create_simulation_app(11, level);
    app.update();
    let enemy = {
        let mut query = app.world_mut().query_filtered::<Entity, With<EnemyBrain>>();
        query.iter(app.world()).next().expect("enemy spawned")
    };
    *app.world_mut().get_mut::<EnemyState>(enemy).expect("state") = EnemyState::Patrolling;
    (app, enemy)
}

fn position(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .get::<Transform>(entity)
        .map(|transform| transform.translation.truncate())
        .expect("transform")
}

fn facing_right(app: &App, entity: Entity) -> bool {
    app.world().get::<Facing>(entity).expect("facing").right
}

#[test]
fn test_patrol_turns_before_wall() {
    // Стена x ∈ [2.5, 3.5]
    let (mut app, enemy) = start(level(vec![solid(0.0, -0.5, 20.0, 0.5), solid(3.0, 1.0, 0.5, 1.0)], 0.0, 10.0));

    let mut max_x = f32::MIN;
    for _ in 0..120 {
        app.update();
        max_x = max_x.max(position(&app, enemy).x);
    }

    assert!(max_x > 1.5 && max_x < 2.15, "враг не дошёл до стены или упёрся в неё: {}", max_x);
    assert!(!facing_right(&app, enemy));
    assert_eq!(app.world().get::<Transform>(enemy).expect("transform").scale.x, -1.0);
    assert!(position(&app, enemy).x < max_x - 1.0, "после разворота враг идёт назад");
    assert_eq!(app.world().get::<EnemyState>(enemy), Some(&EnemyState::Patrolling));
}

#[test]
fn test_patrol_turns_at_ledge() {
    // Пол x ∈ [-5, 5]
    let (mut app, enemy) = start(level(vec![solid(0.0, -0.5, 5.0, 0.5)], 3.0, 10.0));

    let mut max_x = f32::MIN;
    for _ in 0..120 {
        app.update();
        max_x = max_x.max(position(&app, enemy).x);
    }

    assert!(max_x > 4.0 && max_x < 5.0, "max x = {}", max_x);
    assert!(!facing_right(&app, enemy));
    let position = position(&app, enemy);
    assert!(position.x < 4.0, "x = {}", position.x);
    assert!((position.y - 0.5).abs() < 1e-3, "враг не должен упасть: y = {}", position.y);
}

#[test]
fn test_patrol_stays_within_radius() {
    let (mut app, enemy) = start(level(vec![solid(0.0, -0.5, 20.0, 0.5)], 0.0, 1.0));

    let mut flips = 0;
    let mut was_right = facing_right(&app, enemy);
    let mut previous_x = position(&app, enemy).x;
    for _ in 0..240 {
        app.update();
        let x = position(&app, enemy).x;
        assert!(x.abs() < 1.05, "враг ушёл за patrol radius: x = {}", x);

        let right = facing_right(&app, enemy);
        if right != was_right {
            flips += 1;
            // Тик разворота: шаг назад к точке спавна
            assert!(x.abs() < previous_x.abs(), "x {} → {}", previous_x, x);
        }
        was_right = right;
        previous_x = x;
    }

    assert!(flips >= 2, "flips = {}", flips);
}
