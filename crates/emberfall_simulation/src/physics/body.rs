//! Интеграция тел и детекция контактов (FixedUpdate)
//!
//! Порядок внутри `SimulationSet::Physics`:
//! 1. apply_gravity_and_drag — velocity += g * scale * dt, drag
//! 2. integrate_bodies — move_and_collide против solids, BodyContacts
//! 3. detect_trigger_transitions — enter/exit для Trigger2D (SimulationSet::Contacts)

use bevy::prelude::*;

use super::geometry::move_and_collide;
use super::spatial::SolidQuery;
use crate::components::{Collider2D, PhysicsBody, Solid, Trigger2D};

/// Ускорение свободного падения (единицы/сек²)
pub const GRAVITY: f32 = -9.81;

/// Контакты тела с solids за последний шаг
#[derive(Component, Debug, Clone, Default)]
pub struct BodyContacts {
    pub touching: Vec<Entity>,
    /// Solid под ногами (платформы переносят стоящие тела)
    pub ground: Option<Entity>,
}

/// Event: тело начало касаться solid (не было контакта на прошлом шаге)
#[derive(Event, Debug, Clone)]
pub struct CollisionStarted {
    pub body: Entity,
    pub solid: Entity,
}

/// Event: коллайдер вошёл в trigger
#[derive(Event, Debug, Clone)]
pub struct TriggerEntered {
    pub trigger: Entity,
    pub other: Entity,
}

/// Event: коллайдер покинул trigger (или исчез/выключился)
#[derive(Event, Debug, Clone)]
pub struct TriggerExited {
    pub trigger: Entity,
    pub other: Entity,
}

/// Гравитация + linear drag
pub fn apply_gravity_and_drag(time: Res<Time<Fixed>>, mut bodies: Query<&mut PhysicsBody>) {
    let delta = time.delta_secs();
    for mut body in bodies.iter_mut() {
        let gravity = GRAVITY * body.gravity_scale;
        body.velocity.y += gravity * delta;
        if body.linear_drag > 0.0 {
            let damping = 1.0 / (1.0 + body.linear_drag * delta);
            body.velocity *= damping;
        }
    }
}

/// Интеграция velocity → Transform с resolve против solids
///
/// Тела с выключенным коллайдером (мёртвые) не двигаются.
pub fn integrate_bodies(
    time: Res<Time<Fixed>>,
    mut bodies: Query<
        (
            Entity,
            &mut Transform,
            &mut PhysicsBody,
            &Collider2D,
            &mut BodyContacts,
        ),
        Without<Solid>,
    >,
    solids: SolidQuery,
    mut collisions: EventWriter<CollisionStarted>,
) {
    let delta = time.delta_secs();
    let snapshot = solids.snapshot();

    for (entity, mut transform, mut body, collider, mut contacts) in bodies.iter_mut() {
        if !collider.enabled {
            body.velocity = Vec2::ZERO;
            continue;
        }

        let result = move_and_collide(
            transform.translation.truncate(),
            collider,
            body.velocity,
            delta,
            &snapshot,
        );

        transform.translation.x = result.position.x;
        transform.translation.y = result.position.y;
        body.velocity = result.velocity;
        body.on_ground = result.grounded;

        for solid in &result.contacts {
            if !contacts.touching.contains(solid) {
                collisions.write(CollisionStarted {
                    body: entity,
                    solid: *solid,
                });
            }
        }
        contacts.touching = result.contacts;
        contacts.ground = result.ground;
    }
}

/// Enter/exit переходы для всех Trigger2D
///
/// Occupant, который исчез или выключил коллайдер, получает exit.
pub fn detect_trigger_transitions(
    mut triggers: Query<(Entity, &Transform, &Collider2D, &mut Trigger2D)>,
    others: Query<(Entity, &Transform, &Collider2D), Without<Trigger2D>>,
    mut entered: EventWriter<TriggerEntered>,
    mut exited: EventWriter<TriggerExited>,
) {
    for (trigger_entity, transform, collider, mut trigger) in triggers.iter_mut() {
        let area = collider.aabb(transform.translation.truncate());

        let inside: Vec<Entity> = if collider.enabled {
            others
                .iter()
                .filter(|(_, _, other)| other.enabled && trigger.detects.contains(other.layer))
                .filter(|(_, other_transform, other)| {
                    other.aabb(other_transform.translation.truncate()).overlaps(&area)
                })
                .map(|(entity, _, _)| entity)
                .collect()
        } else {
            Vec::new()
        };

        for other in &inside {
            if !trigger.occupants.contains(other) {
                entered.write(TriggerEntered {
                    trigger: trigger_entity,
                    other: *other,
                });
            }
        }
        for previous in &trigger.occupants {
            if !inside.contains(previous) {
                exited.write(TriggerExited {
                    trigger: trigger_entity,
                    other: *previous,
                });
            }
        }
        trigger.occupants = inside;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CollisionLayer, LayerMask};
    use std::time::Duration;

    fn physics_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(1.0 / 60.0)))
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
            .add_event::<CollisionStarted>()
            .add_event::<TriggerEntered>()
            .add_event::<TriggerExited>()
            .add_systems(
                FixedUpdate,
                (apply_gravity_and_drag, integrate_bodies, detect_trigger_transitions).chain(),
            );
        app
    }

    #[test]
    fn test_body_falls_and_rests_on_solid() {
        let mut app = physics_app();
        app.world_mut().spawn((
            Transform::from_xyz(0.0, -0.5, 0.0),
            Collider2D::new(Vec2::new(10.0, 0.5), CollisionLayer::Ground),
            Solid,
        ));
        let body = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 3.0, 0.0),
                PhysicsBody::default(),
                Collider2D::new(Vec2::new(0.3, 0.5), CollisionLayer::Player),
                BodyContacts::default(),
            ))
            .id();

        for _ in 0..120 {
            app.update();
        }

        let transform = app.world().get::<Transform>(body).unwrap();
        let physics = app.world().get::<PhysicsBody>(body).unwrap();
        assert!((transform.translation.y - 0.5).abs() < 1e-4, "y = {}", transform.translation.y);
        assert!(physics.on_ground);
        assert!(app.world().get::<BodyContacts>(body).unwrap().ground.is_some());
    }

    #[test]
    fn test_trigger_enter_and_exit() {
        let mut app = physics_app();
        let trigger = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 0.0, 0.0),
                Collider2D::new(Vec2::splat(0.5), CollisionLayer::Pickup),
                Trigger2D::detecting(LayerMask::PLAYER),
            ))
            .id();
        let walker = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.2, 0.0, 0.0),
                Collider2D::new(Vec2::splat(0.3), CollisionLayer::Player),
            ))
            .id();

        app.update();
        app.update();
        assert_eq!(app.world().get::<Trigger2D>(trigger).unwrap().occupants, vec![walker]);

        app.world_mut().get_mut::<Transform>(walker).unwrap().translation.x = 5.0;
        app.update();
        assert!(app.world().get::<Trigger2D>(trigger).unwrap().occupants.is_empty());

        let exits = app.world().resource::<Events<TriggerExited>>();
        let mut cursor = exits.get_cursor();
        assert!(cursor.read(exits).any(|exit| exit.other == walker && exit.trigger == trigger));
    }
}
