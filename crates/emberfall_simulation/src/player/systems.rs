//! Player systems
//!
//! Update (frame tick): разбор input фронтов, run/jump/crouch/attack флаги,
//! flip, animation params.
//! FixedUpdate: движение через CharacterController, выполнение атаки,
//! сброс прыжков при приземлении.

use bevy::prelude::*;

use super::character::{JumpAction, PlayerCharacter};
use super::input::{InputKey, PlayerInput};
use crate::combat::{
    spawn_projectile, AttackChoice, AttackController, DamageIntent, Projectile, PropulsionType, WeaponController,
};
use crate::components::animation::{ATTACK_SPEED, IS_ATTACKING, IS_CROUCHING, JUMPS, SPEED, STATE_JUMP};
use crate::components::{AnimatorParams, Collider2D, Facing, Health, PhysicsBody, Player, Solid};
use crate::level::{LevelReloadRequested, ReloadReason, SoundCue, SoundKind};
use crate::physics::{CharacterController, CrouchChanged, Landed, SolidQuery, SpatialQuery, CEILING_RADIUS};

/// Система: input фронты → состояние персонажа (Update)
///
/// Мёртвый персонаж input не обрабатывает (кроме Restart).
pub fn handle_player_input(
    time: Res<Time>,
    mut players: Query<
        (
            Entity,
            &mut PlayerInput,
            &mut PlayerCharacter,
            &mut AttackController,
            &mut CharacterController,
            &Health,
            &mut Facing,
            &mut Transform,
            &mut AnimatorParams,
        ),
        With<Player>,
    >,
    mut sounds: EventWriter<SoundCue>,
    mut reloads: EventWriter<LevelReloadRequested>,
) {
    let now = time.elapsed_secs();

    for (entity, mut input, mut character, mut attack, mut controller, health, mut facing, mut transform, mut anim) in
        players.iter_mut()
    {
        let edges = input.drain_edges();

        if edges
            .iter()
            .any(|edge| edge.key == InputKey::Restart && edge.pressed)
        {
            crate::logger::log_info("🔄 Restart requested");
            reloads.write(LevelReloadRequested {
                reason: ReloadReason::Restart,
            });
        }

        if health.is_dead {
            continue;
        }

        for edge in edges {
            match (edge.key, edge.pressed) {
                (InputKey::Left | InputKey::Right, true) => character.on_horizontal_key_down(now),
                (InputKey::Left | InputKey::Right, false) => {
                    if character.is_running {
                        character.on_horizontal_key_up();
                    }
                }
                (InputKey::Jump, true) => {
                    match character.jump() {
                        JumpAction::Grounded => {
                            anim.play(STATE_JUMP);
                            sounds.write(SoundCue::new(SoundKind::Jump).from_entity(entity));
                        }
                        JumpAction::Air => {
                            controller.pending_air_jump = true;
                            sounds.write(SoundCue::new(SoundKind::Jump).from_entity(entity));
                        }
                        JumpAction::None => {}
                    }
                    anim.set_int(JUMPS, character.jumps as i32);
                }
                (InputKey::Attack, true) => {
                    if !character.is_jumping && attack.begin(false) {
                        character.pending_attack = true;
                        sounds.write(SoundCue::new(SoundKind::Attack).from_entity(entity));
                    }
                }
                (InputKey::Attack, false) => attack.stop(),
                (InputKey::Crouch, pressed) => character.is_crouching = pressed,
                (InputKey::Jump, false) | (InputKey::Restart, _) => {}
            }
        }

        character.update_run_state(now);
        character.horizontal_move = input.axis() * character.current_speed();

        let moving = character.horizontal_move != 0.0;
        if moving != character.was_moving {
            let kind = match (moving, character.is_running) {
                (true, true) => SoundKind::Run,
                (true, false) => SoundKind::Walk,
                (false, _) => SoundKind::Idle,
            };
            sounds.write(SoundCue::new(kind).from_entity(entity));
            character.was_moving = moving;
        }

        facing.face_towards(&mut transform, character.horizontal_move);
    }
}

/// Система: animation parameters игрока (Update, после input)
pub fn sync_player_animation(
    mut players: Query<
        (
            &PlayerCharacter,
            &AttackController,
            &CharacterController,
            &mut AnimatorParams,
        ),
        With<Player>,
    >,
) {
    for (character, attack, controller, mut anim) in players.iter_mut() {
        anim.set_float(SPEED, character.horizontal_move.abs());
        anim.set_bool(IS_ATTACKING, attack.is_attacking);
        anim.set_float(ATTACK_SPEED, attack.speed);
        anim.set_bool(IS_CROUCHING, controller.was_crouching);
        anim.set_int(JUMPS, character.jumps as i32);
    }
}

/// Система: намерение движения → CharacterController (FixedUpdate)
///
/// Во время атаки и после смерти персонаж стоит (target speed 0).
pub fn drive_player_movement(
    time: Res<Time<Fixed>>,
    mut players: Query<
        (
            Entity,
            &Transform,
            &Facing,
            &PlayerCharacter,
            &AttackController,
            &Health,
            &mut CharacterController,
            &mut PhysicsBody,
            &mut Collider2D,
        ),
        (With<Player>, Without<Solid>),
    >,
    solids: SolidQuery,
    mut crouch_events: EventWriter<CrouchChanged>,
) {
    let delta = time.delta_secs();

    for (entity, transform, facing, character, attack, health, mut controller, mut body, mut collider) in
        players.iter_mut()
    {
        if !collider.enabled {
            continue;
        }

        let ceiling_point = facing.world_point(transform.translation.truncate(), controller.ceiling_check_offset);
        let ceiling_blocked = solids.any_in_circle(ceiling_point, CEILING_RADIUS, Some(entity));

        let report = if attack.is_attacking || health.is_dead {
            controller.apply_move(&mut body, &mut collider, 0.0, false, false, ceiling_blocked, delta)
        } else {
            controller.apply_move(
                &mut body,
                &mut collider,
                character.horizontal_move,
                character.is_crouching,
                character.is_jumping,
                ceiling_blocked,
                delta,
            )
        };

        if let Some(crouching) = report.crouch_changed {
            crouch_events.write(CrouchChanged { entity, crouching });
        }
    }
}

/// Система: выполнить запрошенную атаку (FixedUpdate)
///
/// Без оружия — melee удар. С оружием — ближайший враг впереди: вплотную
/// melee, иначе выстрел.
pub fn perform_player_attacks(
    mut commands: Commands,
    mut players: Query<
        (
            Entity,
            &Transform,
            &Facing,
            &mut PlayerCharacter,
            &AttackController,
            &WeaponController,
            &Health,
        ),
        With<Player>,
    >,
    spatial: SpatialQuery,
    mut damage: EventWriter<DamageIntent>,
) {
    for (entity, transform, facing, mut character, attack, weapon, health) in players.iter_mut() {
        if !character.pending_attack {
            continue;
        }
        character.pending_attack = false;
        if health.is_dead {
            continue;
        }

        let origin = transform.translation.truncate();
        let candidates = match &weapon.current {
            Some(definition) => spatial.overlap_circle(origin, definition.range, attack.enemy_mask, Some(entity)),
            None => Vec::new(),
        };

        match weapon.choose_attack(origin, facing, attack, &candidates) {
            AttackChoice::Melee => {
                let hits = attack.hit(entity, origin, facing, &spatial, &mut damage);
                crate::logger::log(&format!("🗡️ Player melee hit: {} target(s)", hits));
            }
            AttackChoice::Ranged { target, point } => {
                let Some(definition) = weapon.current.as_ref() else {
                    continue;
                };
                let shooting_point = weapon.shooting_point(origin, facing);
                let homing_target = match definition.propulsion {
                    PropulsionType::Homing => spatial
                        .nearest(shooting_point, attack.enemy_mask, Some(entity))
                        .map(|hit| hit.owner),
                    _ => None,
                };
                let projectile = Projectile::launch(
                    shooting_point,
                    point,
                    &definition.projectile_template(),
                    attack.enemy_mask,
                    Some(entity),
                    homing_target,
                );
                crate::logger::log(&format!("🔫 Player fires '{}' at {:?}", definition.name, target));
                spawn_projectile(&mut commands, shooting_point, projectile);
            }
            AttackChoice::Nothing => {
                crate::logger::log("Player attack: no enemy in front");
            }
        }
    }
}

/// Система: приземление сбрасывает счётчик прыжков
pub fn reset_jumps_on_landing(mut landings: EventReader<Landed>, mut players: Query<&mut PlayerCharacter>) {
    for landed in landings.read() {
        if let Ok(mut character) = players.get_mut(landed.entity) {
            character.land();
        }
    }
}
