//! Slime — ping-pong ходок с melee hit-box
//!
//! Стоит, если мёртв, получает урон или атакует. Живой игрок в hit-box
//! открывает окно атаки с автоматическим ударом.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::AttackController;
use crate::components::animation::IS_WALKING;
use crate::components::{AnimatorParams, Facing, Health, Player};
use crate::level::PingPongMovement;
use crate::physics::SpatialQuery;

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slime {
    pub walk_speed: f32,
    #[serde(skip)]
    pub is_walking: bool,
}

impl Default for Slime {
    fn default() -> Self {
        Self {
            walk_speed: 1.5,
            is_walking: false,
        }
    }
}

/// Решение на тик: идти или нет, начинать ли атаку
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlimeDecision {
    pub walking: bool,
    pub start_attack: bool,
}

pub fn decide(health: &Health, is_attacking: bool, player_in_hitbox: bool) -> SlimeDecision {
    if health.is_dead || health.is_hurting || is_attacking {
        return SlimeDecision {
            walking: false,
            start_attack: false,
        };
    }
    SlimeDecision {
        walking: !player_in_hitbox,
        start_attack: player_in_hitbox,
    }
}

/// Система: поведение слаймов (FixedUpdate, до ping-pong движения)
pub fn slime_system(
    mut slimes: Query<(
        Entity,
        &Transform,
        &Facing,
        &Health,
        &mut Slime,
        &mut AttackController,
        &mut PingPongMovement,
        &mut AnimatorParams,
    )>,
    players: Query<&Health, With<Player>>,
    spatial: SpatialQuery,
) {
    for (entity, transform, facing, health, mut slime, mut attack, mut movement, mut anim) in slimes.iter_mut() {
        let player_in_hitbox = !health.is_dead
            && !attack.is_attacking
            && attack
                .resolve_targets(entity, transform.translation.truncate(), facing, &spatial)
                .into_iter()
                .any(|target| players.get(target).is_ok_and(|player| player.is_alive()));

        let decision = decide(health, attack.is_attacking, player_in_hitbox);
        if decision.start_attack && attack.begin(true) {
            crate::logger::log(&format!("🟢 Slime {:?} attacks", entity));
        }

        slime.is_walking = decision.walking;
        movement.speed = if decision.walking { slime.walk_speed } else { 0.0 };
        anim.set_bool(IS_WALKING, decision.walking);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slime_stops_when_dead_or_hurting() {
        let mut health = Health::new(30);
        health.is_hurting = true;
        assert!(!decide(&health, false, false).walking);

        let mut dead = Health::new(30);
        dead.take_damage(30);
        let decision = decide(&dead, false, true);
        assert!(!decision.walking);
        assert!(!decision.start_attack);
    }

    #[test]
    fn test_slime_attacks_player_in_hitbox() {
        let health = Health::new(30);
        assert_eq!(
            decide(&health, false, true),
            SlimeDecision {
                walking: false,
                start_attack: true
            }
        );
        // Во время атаки не ходит и не начинает новую
        assert_eq!(
            decide(&health, true, true),
            SlimeDecision {
                walking: false,
                start_attack: false
            }
        );
        assert!(decide(&health, false, false).walking);
    }
}
