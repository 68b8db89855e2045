//! Combat integration test
//!
//! Полный App: враги стреляют в игрока, игрок бьёт врага, шипы убивают
//! игрока и уровень перезагружается.
//!
//! Проверяем:
//! - Health инварианты (0 ≤ current ≤ max)
//! - Смерть → respawn → reload
//! - Нет паники/крашей

use bevy::prelude::*;
use emberfall_simulation::config::{EnemySpawn, SolidConfig, SpikeConfig, TurretSpawn};
use emberfall_simulation::*;

fn flat_level() -> LevelConfig {
    LevelConfig {
        name: "arena".into(),
        solids: vec![SolidConfig {
            position: Vec2::new(0.0, -0.5),
            half_extents: Vec2::new(50.0, 0.5),
        }],
        ..default()
    }
}

fn start(level: LevelConfig) -> (App, Entity) {
    let mut app = create_simulation_app(42, level);
    app.update();
    let player = find_player(app.world_mut()).expect("player spawned");
    (app, player)
}

fn run(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn health(app: &App, entity: Entity) -> Option<Health> {
    app.world().get::<Health>(entity).cloned()
}

fn tap(app: &mut App, entity: Entity, key: InputKey) {
    app.world_mut()
        .get_mut::<PlayerInput>(entity)
        .expect("input")
        .tap(key);
}

/// Test: статичный стрелок замечает игрока и попадает
#[test]
fn test_static_enemy_shoots_player() {
    let mut level = flat_level();
    level.enemies.push(EnemySpawn {
        position: Vec2::new(6.0, 0.5),
        ..default()
    });
    let (mut app, player) = start(level);

    run(&mut app, 150);

    let hp = health(&app, player).expect("player health");
    assert!(hp.current < hp.max, "игрок не получил урон: {}", hp.current);
    assert!(hp.current >= 0);

    let mut states = app.world_mut().query::<&EnemyState>();
    assert!(states
        .iter(app.world())
        .all(|state| *state == EnemyState::Attacking));
}

/// Test: турель в радиусе стреляет, вне радиуса молчит
#[test]
fn test_turret_fires_only_in_range() {
    let mut level = flat_level();
    level.turrets.push(TurretSpawn {
        position: Vec2::new(4.0, 1.0),
        ..default()
    });
    level.turrets.push(TurretSpawn {
        position: Vec2::new(-30.0, 1.0),
        ..default()
    });
    let (mut app, player) = start(level);

    run(&mut app, 150);

    let hp = health(&app, player).expect("player health");
    assert!(hp.current < hp.max);

    let mut turrets = app.world_mut().query::<(&Transform, &Turret)>();
    for (transform, turret) in turrets.iter(app.world()) {
        if transform.translation.x < 0.0 {
            assert_eq!(turret.target, None, "дальняя турель не должна брать цель");
        } else {
            assert_eq!(turret.target, Some(player));
        }
    }
}

/// Test: три удара рукой убивают врага (30 HP, урон 10)
#[test]
fn test_player_melee_kills_enemy() {
    let mut level = flat_level();
    level.enemies.push(EnemySpawn {
        position: Vec2::new(1.5, 0.5),
        max_health: 30,
        ..default()
    });
    let (mut app, player) = start(level);
    run(&mut app, 5);

    let enemy = {
        let mut query = app.world_mut().query_filtered::<Entity, With<EnemyState>>();
        query.iter(app.world()).next().expect("enemy spawned")
    };

    tap(&mut app, player, InputKey::Attack);
    run(&mut app, 30);
    assert_eq!(health(&app, enemy).map(|h| h.current), Some(20));

    for _ in 0..2 {
        tap(&mut app, player, InputKey::Attack);
        run(&mut app, 30);
    }

    assert!(app.world().get_entity(enemy).is_err(), "враг должен исчезнуть сразу после смерти");
}

/// Test: два hurt-box одного врага → один удар, а не два
#[test]
fn test_melee_hits_multi_collider_enemy_once() {
    let (mut app, player) = start(flat_level());
    let enemy = app
        .world_mut()
        .spawn((
            Transform::from_xyz(1.2, 0.5, 0.0),
            Collider2D::new(Vec2::new(0.3, 0.3), CollisionLayer::Enemy),
            Health::new(50),
        ))
        .id();
    app.world_mut().spawn((
        Transform::from_xyz(1.2, 1.0, 0.0),
        Collider2D::new(Vec2::new(0.3, 0.2), CollisionLayer::Enemy),
        ColliderOwner(enemy),
    ));
    run(&mut app, 3);

    tap(&mut app, player, InputKey::Attack);
    run(&mut app, 10);

    assert_eq!(health(&app, enemy).map(|h| h.current), Some(40));
}

/// Test: шипы → смерть → respawn через respawn_delay → уровень заново
#[test]
fn test_spike_death_respawns_player() {
    let mut level = flat_level();
    level.spikes.push(SpikeConfig {
        position: Vec2::new(3.0, 0.25),
        ..default()
    });
    let (mut app, player) = start(level);

    app.world_mut()
        .get_mut::<PlayerInput>(player)
        .expect("input")
        .press(InputKey::Right);

    let mut died = false;
    for _ in 0..200 {
        app.update();
        if app.world().get::<Dead>(player).is_some() {
            died = true;
            break;
        }
    }
    assert!(died, "игрок должен умереть на шипах");
    let hp = health(&app, player).expect("player health");
    assert_eq!(hp.current, 0);
    assert!(app
        .world()
        .get::<Collider2D>(player)
        .is_some_and(|collider| !collider.enabled));

    // respawn_delay 1.5 сек = 90 тиков
    run(&mut app, 120);

    assert!(app.world().get::<Dead>(player).is_none());
    let hp = health(&app, player).expect("player health");
    assert_eq!(hp.current, hp.max);
    let x = app.world().get::<Transform>(player).expect("transform").translation.x;
    assert!(x.abs() < 0.5, "игрок на старте, x = {}", x);
    assert_eq!(app.world().resource::<LevelManager>().health_fraction, 1.0);
}

/// Test: respawn рассылает HealthChanged с полным HP
#[test]
fn test_respawn_broadcasts_health_reset() {
    let (mut app, player) = start(flat_level());
    let mut cursor = app.world().resource::<Events<HealthChanged>>().get_cursor();

    app.world_mut().send_event(DamageIntent {
        target: player,
        amount: 1000,
        source: None,
    });

    let mut seen = Vec::new();
    for _ in 0..200 {
        app.update();
        let events = app.world().resource::<Events<HealthChanged>>();
        seen.extend(
            cursor
                .read(events)
                .filter(|change| change.entity == player)
                .map(|change| (change.current, change.max)),
        );
    }

    assert_eq!(seen, vec![(0, 100), (100, 100)]);
    assert!(app.world().get::<Dead>(player).is_none());
    assert_eq!(app.world().resource::<LevelManager>().health_fraction, 1.0);
}

/// Test: полный demo уровень 1000 тиков без краша, HP в границах
#[test]
fn test_demo_level_1000_ticks() {
    let (mut app, player) = start(LevelConfig::demo());

    for tick in 0..1000 {
        if tick % 120 == 0 {
            tap(&mut app, player, InputKey::Attack);
        }
        app.update();
    }

    let mut healths = app.world_mut().query::<&Health>();
    for health in healths.iter(app.world()) {
        assert!(health.current >= 0 && health.current <= health.max);
    }
}
