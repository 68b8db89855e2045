//! Projectile integration test
//!
//! Снаряды в полном App: прямое попадание, homing, разгон, lifetime,
//! иммунитет стрелявшего.

use bevy::prelude::*;
use emberfall_simulation::combat::ProjectileTemplate;
use emberfall_simulation::*;
use proptest::prelude::*;

/// Уровень без геометрии: игрок падает, но снаряды летят на высоте 10
fn empty_app() -> App {
    let mut app = create_simulation_app(3, LevelConfig::default());
    app.update();
    app
}

fn spawn_target(app: &mut App, position: Vec2, hp: i32) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Collider2D::new(Vec2::splat(0.4), CollisionLayer::Enemy),
            Health::new(hp),
        ))
        .id()
}

fn fire(app: &mut App, origin: Vec2, aim: Vec2, template: &ProjectileTemplate, homing: Option<Entity>) -> Entity {
    let projectile = Projectile::launch(origin, aim, template, LayerMask::ENEMY, None, homing);
    app.world_mut()
        .spawn((Transform::from_translation(origin.extend(0.0)), projectile, LevelEntity))
        .id()
}

fn run(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

/// Тестовый дрейф цели с постоянной скоростью
#[derive(Component)]
struct Drift(Vec2);

fn drift_targets(time: Res<Time<Fixed>>, mut targets: Query<(&mut Transform, &Drift)>) {
    for (mut transform, drift) in targets.iter_mut() {
        transform.translation += (drift.0 * time.delta_secs()).extend(0.0);
    }
}

fn hp(app: &App, entity: Entity) -> i32 {
    app.world().get::<Health>(entity).map_or(-1, |health| health.current)
}

#[test]
fn test_constant_projectile_hits_target_once() {
    let mut app = empty_app();
    let target = spawn_target(&mut app, Vec2::new(5.0, 10.0), 30);
    let projectile = fire(
        &mut app,
        Vec2::new(0.0, 10.0),
        Vec2::new(5.0, 10.0),
        &ProjectileTemplate::default(),
        None,
    );

    run(&mut app, 90);

    assert_eq!(hp(&app, target), 20);
    assert!(app.world().get_entity(projectile).is_err(), "снаряд удаляется при попадании");
}

#[test]
fn test_homing_projectile_turns_to_target() {
    let mut app = empty_app();
    let target = spawn_target(&mut app, Vec2::new(4.0, 10.0), 30);
    // Выстрел вверх, цель справа
    let template = ProjectileTemplate {
        propulsion: PropulsionType::Homing,
        speed: 6.0,
        ..default()
    };
    fire(&mut app, Vec2::new(0.0, 10.0), Vec2::new(0.0, 20.0), &template, Some(target));

    run(&mut app, 120);

    assert_eq!(hp(&app, target), 20);
}

#[test]
fn test_constant_projectile_ignores_homing_target() {
    let mut app = empty_app();
    let target = spawn_target(&mut app, Vec2::new(4.0, 10.0), 30);
    fire(
        &mut app,
        Vec2::new(0.0, 10.0),
        Vec2::new(0.0, 20.0),
        &ProjectileTemplate::default(),
        Some(target),
    );

    run(&mut app, 120);

    assert_eq!(hp(&app, target), 30, "без homing снаряд летит к точке прицела");
}

#[test]
fn test_accelerating_projectile_caps_speed() {
    let mut app = empty_app();
    let template = ProjectileTemplate {
        propulsion: PropulsionType::Accelerating,
        speed: 10.0,
        propulsion_amount: 20.0,
        ..default()
    };
    let projectile = fire(&mut app, Vec2::new(0.0, 10.0), Vec2::new(-10.0, 10.0), &template, None);

    run(&mut app, 15);
    let early = app.world().get::<Projectile>(projectile).expect("alive").current_speed;
    assert!(early > 0.0 && early < 10.0, "разгон: {}", early);

    run(&mut app, 60);
    let projectile = app.world().get::<Projectile>(projectile).expect("alive");
    assert_eq!(projectile.current_speed, 10.0);
    assert!((projectile.velocity.length() - 10.0).abs() < 1e-4);
    assert!(projectile.velocity.x < 0.0);
}

#[test]
fn test_projectile_expires_after_lifetime() {
    let mut app = empty_app();
    let template = ProjectileTemplate {
        lifetime: 0.5,
        ..default()
    };
    let projectile = fire(&mut app, Vec2::new(0.0, 10.0), Vec2::new(0.0, 20.0), &template, None);

    run(&mut app, 20);
    assert!(app.world().get_entity(projectile).is_ok());
    run(&mut app, 20);
    assert!(app.world().get_entity(projectile).is_err());
}

#[test]
fn test_projectile_ignores_owner() {
    let mut app = empty_app();
    let shooter = spawn_target(&mut app, Vec2::new(0.0, 10.0), 30);
    let projectile = Projectile::launch(
        Vec2::new(0.0, 10.0),
        Vec2::new(10.0, 10.0),
        &ProjectileTemplate::default(),
        LayerMask::ENEMY,
        Some(shooter),
        None,
    );
    app.world_mut()
        .spawn((Transform::from_xyz(0.0, 10.0, 0.0), projectile, LevelEntity));

    run(&mut app, 30);

    assert_eq!(hp(&app, shooter), 30);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Homing снаряд догоняет неподвижную цель с любого угла выстрела
    #[test]
    fn prop_homing_reaches_static_target(angle in 0.0f32..std::f32::consts::TAU, distance in 2.0f32..6.0) {
        let mut app = empty_app();
        let target_position = Vec2::new(distance, 10.0);
        let target = spawn_target(&mut app, target_position, 30);
        let template = ProjectileTemplate {
            propulsion: PropulsionType::Homing,
            speed: 6.0,
            ..default()
        };
        let origin = Vec2::new(0.0, 10.0);
        let aim = origin + Vec2::from_angle(angle) * 5.0;
        fire(&mut app, origin, aim, &template, Some(target));

        run(&mut app, 180);

        prop_assert_eq!(hp(&app, target), 20);
    }

    /// Homing снаряд догоняет цель, которая уходит медленнее снаряда
    #[test]
    fn prop_homing_catches_moving_target(
        heading in 0.0f32..std::f32::consts::TAU,
        speed_ratio in 0.0f32..0.75,
        distance in 2.0f32..6.0,
    ) {
        let mut app = empty_app();
        app.add_systems(FixedUpdate, drift_targets.in_set(SimulationSet::Intent));
        let projectile_speed = 6.0;
        let target = spawn_target(&mut app, Vec2::new(distance, 10.0), 30);
        app.world_mut()
            .entity_mut(target)
            .insert(Drift(Vec2::from_angle(heading) * projectile_speed * speed_ratio));
        let template = ProjectileTemplate {
            propulsion: PropulsionType::Homing,
            speed: projectile_speed,
            ..default()
        };
        let origin = Vec2::new(0.0, 10.0);
        fire(&mut app, origin, origin + Vec2::Y, &template, Some(target));

        // Погоня: t ≤ d·v / (v² − u²) < 3 сек
        run(&mut app, 300);

        prop_assert_eq!(hp(&app, target), 20);
    }
}
