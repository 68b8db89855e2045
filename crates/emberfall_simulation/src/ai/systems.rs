//! Enemy FSM systems (FixedUpdate)

use bevy::prelude::*;

use super::enemy::{next_state, tick_fire_countdown, EnemyBrain, EnemyConfig, EnemyState, CHECK_DISTANCE};
use crate::combat::{spawn_projectile, Dead, EntityDied, Projectile, PropulsionType};
use crate::components::{Facing, Health, LayerMask, PhysicsBody, Player, Solid};
use crate::level::{SoundCue, SoundKind};
use crate::physics::{move_towards, SolidQuery};

/// Ближайший живой игрок: (entity, позиция, дистанция)
pub fn nearest_living_player<'a>(
    position: Vec2,
    players: impl Iterator<Item = (Entity, &'a Transform, &'a Health)>,
) -> Option<(Entity, Vec2, f32)> {
    players
        .filter(|(_, _, health)| health.is_alive())
        .map(|(entity, transform, _)| {
            let target = transform.translation.truncate();
            (entity, target, position.distance(target))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
}

/// Поворот вокруг Z на цель
pub fn aim_at(transform: &mut Transform, target: Vec2) {
    let direction = target - transform.translation.truncate();
    if direction != Vec2::ZERO {
        transform.rotation = Quat::from_rotation_z(direction.y.atan2(direction.x));
    }
}

/// Система: Enemy FSM
///
/// Каждый тик: поиск цели → ground check → переход или действие состояния.
/// Переход и действие не совмещаются в одном тике.
pub fn enemy_fsm_system(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut enemies: Query<
        (
            Entity,
            &mut Transform,
            &mut EnemyState,
            &mut EnemyBrain,
            &EnemyConfig,
            &mut Facing,
            &mut PhysicsBody,
            &Health,
        ),
        (Without<Solid>, Without<Player>, Without<Dead>),
    >,
    players: Query<(Entity, &Transform, &Health), (With<Player>, Without<EnemyBrain>)>,
    solids: SolidQuery,
    mut sounds: EventWriter<SoundCue>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut state, mut brain, config, mut facing, mut body, health) in enemies.iter_mut() {
        if health.is_dead {
            continue;
        }
        let position = transform.translation.truncate();

        // === Поиск цели (каждый тик) ===
        let nearest = nearest_living_player(position, players.iter())
            .filter(|(_, _, distance)| *distance <= config.detection_range);
        brain.target = nearest.map(|(target, _, _)| target);
        let target_distance = nearest.map(|(_, _, distance)| distance);

        // === Ground check (только подвижные) ===
        if !config.is_static {
            let ground_point = facing.world_point(position, config.ground_check_offset);
            brain.grounded = solids.raycast(ground_point, Vec2::NEG_Y, CHECK_DISTANCE).is_some();
            if !brain.grounded {
                body.velocity.x = 0.0;
                facing.flip(&mut transform);
            }
        }

        // === Переход ===
        let next = next_state(*state, config, target_distance);
        if next != *state {
            crate::logger::log(&format!("🤖 Enemy {:?}: {:?} → {:?}", entity, *state, next));
            *state = next;
            if next != EnemyState::Patrolling {
                body.velocity.x = 0.0;
            }
            continue;
        }

        // === Действие состояния ===
        match *state {
            EnemyState::Idle => {}
            EnemyState::Patrolling => {
                if brain.grounded {
                    patrol_step(&mut transform, &mut brain, config, &mut facing, &mut body, &solids, delta);
                }
            }
            EnemyState::Targeting => {
                body.velocity.x = 0.0;
                if let (true, Some((_, target_position, _))) = (config.is_static, nearest) {
                    aim_at(&mut transform, target_position);
                }
            }
            EnemyState::Attacking => {
                body.velocity.x = 0.0;
                let Some((target, target_position, _)) = nearest else {
                    continue;
                };
                if tick_fire_countdown(&mut brain.fire_countdown, config.fire_rate, delta) {
                    let fire_point = facing.world_point(position, config.fire_point);
                    let homing_target = (config.projectile.propulsion == PropulsionType::Homing).then_some(target);
                    let projectile = Projectile::launch(
                        fire_point,
                        target_position,
                        &config.projectile,
                        LayerMask::PLAYER,
                        Some(entity),
                        homing_target,
                    );
                    spawn_projectile(&mut commands, fire_point, projectile);
                    if let Some(clip) = &config.fire_sound {
                        sounds.write(SoundCue::clip(clip.clone()).from_entity(entity));
                    }
                }
            }
        }
    }
}

/// Патруль: шаг вперёд, стена впереди, застревание, patrol radius
fn patrol_step(
    transform: &mut Transform,
    brain: &mut EnemyBrain,
    config: &EnemyConfig,
    facing: &mut Facing,
    body: &mut PhysicsBody,
    solids: &SolidQuery,
    delta: f32,
) {
    body.velocity.x = facing.sign() * config.walk_speed;

    let position = transform.translation.truncate();
    let front_point = facing.world_point(position, config.front_check_offset);
    if solids
        .raycast(front_point, facing.direction(), CHECK_DISTANCE)
        .is_some()
    {
        body.velocity.x = 0.0;
        facing.flip(transform);
    }

    if brain.update_stuck(position, delta, config.stuck_threshold) {
        crate::logger::log("🤖 Enemy stuck, turning around");
        facing.flip(transform);
    }

    // За пределами patrol radius: разворот к точке спавна (только если
    // смотрим от неё) и шаг назад
    if position.distance(brain.initial_position) > config.patrol_radius {
        let heading_away = facing.sign() * (position.x - brain.initial_position.x) > 0.0;
        if heading_away {
            facing.flip(transform);
            body.velocity.x = facing.sign() * config.walk_speed;
        }
        let back = move_towards(position, brain.initial_position, config.walk_speed * delta);
        transform.translation.x = back.x;
        transform.translation.y = back.y;
    }
}

/// Cue смерти врага. Отсутствующий клип логируется один раз: `warned`
/// живёт в `Local` системы.
pub fn enemy_death_cue(config: &EnemyConfig, entity: Entity, warned: &mut bool) -> Option<SoundCue> {
    match &config.death_sound {
        Some(clip) => Some(SoundCue::new(SoundKind::Clip(clip.clone())).from_entity(entity)),
        None => {
            if !*warned {
                crate::logger::log_warning("Enemy death sound is missing");
                *warned = true;
            }
            None
        }
    }
}

/// Система: звук смерти врага (до handle_deaths, пока entity жив)
pub fn announce_enemy_deaths(
    mut deaths: EventReader<EntityDied>,
    enemies: Query<&EnemyConfig>,
    mut sounds: EventWriter<SoundCue>,
    mut warned: Local<bool>,
) {
    for death in deaths.read() {
        let Ok(config) = enemies.get(death.entity) else {
            continue;
        };
        if let Some(cue) = enemy_death_cue(config, death.entity, &mut warned) {
            sounds.write(cue);
        }
    }
}
