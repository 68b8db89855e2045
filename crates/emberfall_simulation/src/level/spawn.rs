//! Spawn уровня из `LevelConfig` и перезагрузка
//!
//! Всё, что создаёт уровень, помечено `LevelEntity` и удаляется при reload.
//! Игрок живёт между перезагрузками: reload сбрасывает его на точку старта.

use bevy::prelude::*;

use super::spawner::EnemySpawner;
use super::tiles::{BreakableTile, MovingPlatform, PingPongMovement};
use super::{LevelManager, LevelReloadRequested, ReloadReason, SoundCue, SoundKind};
use crate::ai::{EnemyBrain, EnemyState};
use crate::combat::{AttackController, Dead, DespawnAfter, HealthChanged, RespawnTimer, WeaponController};
use crate::components::{
    AnimatorParams, Collider2D, CollisionLayer, DeathBehavior, DropItems, Facing, Health, LayerMask, LevelEntity,
    OriginalParams, PhysicsBody, Player, Solid, Trigger2D,
};
use crate::config::{
    BreakableTileConfig, EnemySpawn, FluidSpawn, LevelConfig, PickupConfig, PlatformConfig, PlayerConfig, SlimeSpawn,
    SpikeConfig, SpawnerConfig, TurretSpawn,
};
use crate::items::{Coin, GearController, GearPickup, Potion, Spike, WeaponPickup};
use crate::physics::CharacterController;
use crate::player::{PlayerCharacter, PlayerInput};

/// Половина размера pickup trigger
const PICKUP_HALF_EXTENTS: Vec2 = Vec2::new(0.25, 0.25);
/// Размер врага-стрелка / турели
const SHOOTER_HALF_EXTENTS: Vec2 = Vec2::new(0.35, 0.5);
const SLIME_HALF_EXTENTS: Vec2 = Vec2::new(0.4, 0.3);

/// Активный уровень (источник для spawn и reload)
#[derive(Resource, Debug, Clone)]
pub struct ActiveLevel(pub LevelConfig);

fn transform_at(position: Vec2) -> Transform {
    Transform::from_translation(position.extend(0.0))
}

pub fn spawn_solid(commands: &mut Commands, position: Vec2, half_extents: Vec2) -> Entity {
    commands
        .spawn((
            transform_at(position),
            Collider2D::new(half_extents, CollisionLayer::Ground),
            Solid,
            LevelEntity,
        ))
        .id()
}

fn player_components(config: &PlayerConfig) -> impl Bundle {
    let body = PhysicsBody {
        gravity_scale: config.gravity_scale,
        ..default()
    };
    let original = OriginalParams {
        body: body.params(),
        walk_speed: config.walk_speed,
        run_speed: config.run_speed,
    };
    let character =
        PlayerCharacter::new(config.walk_speed, config.run_speed).with_tuning(config.stamina_time, config.double_jump);
    let controller = CharacterController {
        jump_impulse: config.jump_impulse,
        air_control: config.air_control,
        ground_check_offset: Vec2::new(0.0, -config.half_extents.y),
        ceiling_check_offset: Vec2::new(0.0, config.half_extents.y),
        standing_half_extents: config.half_extents,
        crouching_half_extents: config.crouching_half_extents,
        ..default()
    };
    let attack = AttackController {
        damage: config.attack_damage,
        speed: config.attack_speed,
        range: config.attack_range,
        enemy_mask: LayerMask::ENEMY,
        ..default()
    };

    (
        (
            Player,
            transform_at(config.position),
            Facing::default(),
            body,
            Collider2D::new(config.half_extents, CollisionLayer::Player),
            Health::new(config.max_health),
            DeathBehavior::Respawn {
                delay: config.respawn_delay,
            },
        ),
        (
            character,
            controller,
            attack,
            WeaponController::default(),
            GearController::default(),
            PlayerInput::default(),
            AnimatorParams::default(),
            original,
        ),
    )
}

/// Игрок (не LevelEntity)
pub fn spawn_player(commands: &mut Commands, config: &PlayerConfig) -> Entity {
    let entity = commands.spawn(player_components(config)).id();
    crate::logger::log_info(&format!("🧍 Player {:?} spawned at {:?}", entity, config.position));
    entity
}

pub fn spawn_enemy(commands: &mut Commands, spawn: &EnemySpawn) -> Entity {
    let mut transform = transform_at(spawn.position);
    if !spawn.facing_right {
        transform.scale.x = -1.0;
    }
    commands
        .spawn((
            transform,
            Facing {
                right: spawn.facing_right,
            },
            EnemyState::default(),
            EnemyBrain::new(spawn.position),
            spawn.enemy.clone(),
            PhysicsBody::default(),
            Collider2D::new(SHOOTER_HALF_EXTENTS, CollisionLayer::Enemy),
            Health::new(spawn.max_health),
            DeathBehavior::DespawnImmediately,
            LevelEntity,
        ))
        .id()
}

pub fn spawn_turret(commands: &mut Commands, spawn: &TurretSpawn) -> Entity {
    commands
        .spawn((
            transform_at(spawn.position),
            spawn.turret.clone(),
            Collider2D::new(SHOOTER_HALF_EXTENTS, CollisionLayer::Enemy),
            Health::new(spawn.max_health),
            DeathBehavior::DespawnImmediately,
            LevelEntity,
        ))
        .id()
}

pub fn spawn_slime(commands: &mut Commands, spawn: &SlimeSpawn) -> Entity {
    let facing_right = spawn.patrol_to.x >= spawn.position.x;
    let mut transform = transform_at(spawn.position);
    if !facing_right {
        transform.scale.x = -1.0;
    }
    commands
        .spawn((
            transform,
            Facing { right: facing_right },
            spawn.slime.clone(),
            PingPongMovement::new(spawn.position, spawn.patrol_to, 0.0, true),
            AttackController {
                damage: spawn.damage,
                range: spawn.attack_range,
                attack_point: Vec2::new(SLIME_HALF_EXTENTS.x, 0.0),
                enemy_mask: LayerMask::PLAYER,
                ..default()
            },
            AnimatorParams::default(),
            Collider2D::new(SLIME_HALF_EXTENTS, CollisionLayer::Enemy),
            Health::new(spawn.max_health),
            DeathBehavior::default(),
            DropItems {
                enabled: !spawn.drops.is_empty(),
                items: spawn.drops.clone(),
            },
            LevelEntity,
        ))
        .id()
}

pub fn spawn_enemy_spawner(commands: &mut Commands, config: &SpawnerConfig) -> Entity {
    commands
        .spawn((
            transform_at(config.position),
            EnemySpawner {
                count: config.count,
                radius: config.radius,
                template: config.template.clone(),
                spawned: false,
            },
            LevelEntity,
        ))
        .id()
}

/// Pickup; `position` переопределяет позицию из config (дроп)
pub fn spawn_pickup(commands: &mut Commands, item: &PickupConfig, position: Option<Vec2>) -> Entity {
    let position = position.unwrap_or_else(|| item.position());
    let mut entity = commands.spawn((
        transform_at(position),
        Collider2D::new(PICKUP_HALF_EXTENTS, CollisionLayer::Pickup),
        Trigger2D::detecting(LayerMask::PLAYER),
        LevelEntity,
    ));
    match item {
        PickupConfig::Coin { value, .. } => {
            entity.insert(Coin::new(*value));
        }
        PickupConfig::Potion {
            amount,
            is_poison,
            collect_sound,
            ..
        } => {
            entity.insert(Potion {
                amount: *amount,
                is_poison: *is_poison,
                collect_sound: collect_sound.clone(),
            });
        }
        PickupConfig::Weapon { weapon, .. } => {
            entity.insert(WeaponPickup { weapon: weapon.clone() });
        }
        PickupConfig::Gear { gear, .. } => {
            entity.insert(GearPickup { gear: gear.clone() });
        }
    }
    entity.id()
}

pub fn spawn_spike(commands: &mut Commands, config: &SpikeConfig) -> Entity {
    commands
        .spawn((
            transform_at(config.position),
            Collider2D::new(config.half_extents, CollisionLayer::Hazard),
            Trigger2D::detecting(LayerMask::PLAYER),
            Spike { damage: config.damage },
            LevelEntity,
        ))
        .id()
}

pub fn spawn_fluid(commands: &mut Commands, config: &FluidSpawn) -> Entity {
    commands
        .spawn((
            transform_at(config.position),
            Collider2D::new(config.half_extents, CollisionLayer::Hazard),
            Trigger2D::detecting(LayerMask::PLAYER),
            config.fluid.clone(),
            LevelEntity,
        ))
        .id()
}

pub fn spawn_breakable_tile(commands: &mut Commands, config: &BreakableTileConfig) -> Entity {
    commands
        .spawn((
            transform_at(config.position),
            Collider2D::new(config.half_extents, CollisionLayer::Ground),
            BreakableTile {
                hit_sound: config.hit_sound.clone(),
                break_sound: config.break_sound.clone(),
                ..BreakableTile::new(config.max_hits)
            },
            DropItems {
                enabled: !config.drops.is_empty(),
                items: config.drops.clone(),
            },
            LevelEntity,
        ))
        .id()
}

pub fn spawn_platform(commands: &mut Commands, config: &PlatformConfig) -> Entity {
    let target = config.position + config.direction.normalize_or_zero() * config.distance;
    commands
        .spawn((
            transform_at(config.position),
            Collider2D::new(config.half_extents, CollisionLayer::Ground),
            MovingPlatform {
                return_delay: config.return_delay,
                flip_duration: config.flip_duration,
                teleport_sound: config.teleport_sound.clone(),
                ..MovingPlatform::new(config.mode, config.position, target, config.speed)
            },
            LevelEntity,
        ))
        .id()
}

/// Спавн всего уровня кроме игрока
pub fn spawn_level(commands: &mut Commands, level: &LevelConfig) {
    for solid in &level.solids {
        spawn_solid(commands, solid.position, solid.half_extents);
    }
    for platform in &level.platforms {
        spawn_platform(commands, platform);
    }
    for tile in &level.breakable_tiles {
        spawn_breakable_tile(commands, tile);
    }
    for enemy in &level.enemies {
        spawn_enemy(commands, enemy);
    }
    for turret in &level.turrets {
        spawn_turret(commands, turret);
    }
    for slime in &level.slimes {
        spawn_slime(commands, slime);
    }
    for spawner in &level.spawners {
        spawn_enemy_spawner(commands, spawner);
    }
    for pickup in &level.pickups {
        spawn_pickup(commands, pickup, None);
    }
    for spike in &level.spikes {
        spawn_spike(commands, spike);
    }
    for fluid in &level.fluids {
        spawn_fluid(commands, fluid);
    }
    crate::logger::log_info(&format!("🗺️ Level '{}' spawned", level.name));
}

/// Startup: уровень + игрок + фоновая музыка
pub fn setup_level(mut commands: Commands, level: Res<ActiveLevel>, mut sounds: EventWriter<SoundCue>) {
    spawn_level(&mut commands, &level.0);
    spawn_player(&mut commands, &level.0.player);

    match &level.0.audio.music {
        Some(music) => {
            sounds.write(SoundCue::new(SoundKind::LoopStart(music.clone())));
        }
        None => crate::logger::log_warning("Level music is not assigned"),
    }
}

/// Сброс игрока на старт (respawn / restart)
pub fn reset_player(
    entity: Entity,
    config: &PlayerConfig,
    commands: &mut Commands,
    parts: (
        &mut Transform,
        &mut Health,
        &mut PhysicsBody,
        &mut Collider2D,
        &mut PlayerCharacter,
        &mut CharacterController,
    ),
) {
    let (transform, health, body, collider, character, controller) = parts;
    transform.translation = config.position.extend(0.0);
    health.reset();
    body.velocity = Vec2::ZERO;
    collider.enabled = true;
    character.reset();
    controller.reset();
    commands
        .entity(entity)
        .remove::<(Dead, DespawnAfter, RespawnTimer)>();
}

/// Система: перезагрузка уровня (SimulationSet::Level)
///
/// Несколько запросов за тик → одна перезагрузка. Сброс HP игрока
/// рассылается как `HealthChanged`.
pub fn handle_reload_requests(
    mut commands: Commands,
    mut requests: EventReader<LevelReloadRequested>,
    mut health_changed: EventWriter<HealthChanged>,
    level: Res<ActiveLevel>,
    mut manager: ResMut<LevelManager>,
    level_entities: Query<Entity, With<LevelEntity>>,
    mut players: Query<
        (
            Entity,
            &mut Transform,
            &mut Health,
            &mut PhysicsBody,
            &mut Collider2D,
            &mut PlayerCharacter,
            &mut CharacterController,
            &OriginalParams,
            Option<&mut WeaponController>,
            Option<&mut GearController>,
            Option<&mut PlayerInput>,
        ),
        With<Player>,
    >,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    match request.reason {
        ReloadReason::PlayerDied(entity) => {
            crate::logger::log_info(&format!("🔄 Reloading level after death of {:?}", entity))
        }
        ReloadReason::Restart => crate::logger::log_info("🔄 Reloading level (restart)"),
    }

    for entity in level_entities.iter() {
        commands.entity(entity).try_despawn();
    }
    spawn_level(&mut commands, &level.0);
    manager.reset_for_reload();

    for (
        entity,
        mut transform,
        mut health,
        mut body,
        mut collider,
        mut character,
        mut controller,
        original,
        weapon,
        gear,
        input,
    ) in players.iter_mut()
    {
        // Gear/fluid модификаторы снимаются до сброса персонажа
        character.walk_speed = original.walk_speed;
        character.run_speed = original.run_speed;
        body.apply_params(original.body);
        *collider = Collider2D::new(controller.standing_half_extents, collider.layer);

        reset_player(
            entity,
            &level.0.player,
            &mut commands,
            (
                &mut transform,
                &mut health,
                &mut body,
                &mut collider,
                &mut character,
                &mut controller,
            ),
        );
        if let Some(mut weapon) = weapon {
            weapon.unequip();
        }
        if let Some(mut gear) = gear {
            gear.current = None;
            gear.removal = None;
        }
        if let Some(mut input) = input {
            input.clear();
        }
        health_changed.write(HealthChanged {
            entity,
            current: health.current,
            max: health.max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_position_override() {
        let item = PickupConfig::Coin {
            position: Vec2::new(1.0, 2.0),
            value: 3,
        };
        assert_eq!(item.position(), Vec2::new(1.0, 2.0));
    }
}
