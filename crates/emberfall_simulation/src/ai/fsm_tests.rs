//! Tests for enemy FSM transitions and timers.

use super::enemy::{next_state, tick_fire_countdown, EnemyBrain, EnemyConfig, EnemyState};
use super::systems::enemy_death_cue;
use crate::level::SoundKind;
use bevy::prelude::*;
use proptest::prelude::*;

fn mobile() -> EnemyConfig {
    EnemyConfig {
        is_static: false,
        ..default()
    }
}

#[test]
fn test_enemy_state_default() {
    assert_eq!(EnemyState::default(), EnemyState::Idle);
}

#[test]
fn test_enemy_config_default() {
    let config = EnemyConfig::default();
    assert_eq!(config.detection_range, 15.0);
    assert_eq!(config.attack_range, 10.0);
    assert_eq!(config.fire_rate, 1.0);
    assert!(config.is_static);
    assert_eq!(config.patrol_radius, 10.0);
}

#[test]
fn test_idle_without_target_stays_idle() {
    let config = EnemyConfig::default();
    assert_eq!(next_state(EnemyState::Idle, &config, None), EnemyState::Idle);
    assert_eq!(next_state(EnemyState::Idle, &config, Some(20.0)), EnemyState::Idle);
}

#[test]
fn test_static_enemy_full_cycle() {
    let config = EnemyConfig::default();

    let mut state = EnemyState::Idle;
    state = next_state(state, &config, Some(12.0));
    assert_eq!(state, EnemyState::Targeting);

    state = next_state(state, &config, Some(8.0));
    assert_eq!(state, EnemyState::Attacking);

    state = next_state(state, &config, Some(12.0));
    assert_eq!(state, EnemyState::Targeting);

    state = next_state(state, &config, None);
    assert_eq!(state, EnemyState::Idle);
}

#[test]
fn test_mobile_enemy_patrols_first() {
    let config = mobile();

    let state = next_state(EnemyState::Idle, &config, Some(12.0));
    assert_eq!(state, EnemyState::Patrolling);

    let state = next_state(state, &config, Some(12.0));
    assert_eq!(state, EnemyState::Targeting);

    // Цель потеряна — обратно в патруль, не в Idle
    assert_eq!(next_state(state, &config, None), EnemyState::Patrolling);
}

#[test]
fn test_attacking_never_skips_targeting() {
    let config = mobile();
    // Цели нет вообще — всё равно сначала Targeting
    assert_eq!(next_state(EnemyState::Attacking, &config, None), EnemyState::Targeting);
}

#[test]
fn test_fire_cadence() {
    let mut countdown = 0.0;
    let delta = 1.0 / 60.0;

    // Первый выстрел сразу
    assert!(tick_fire_countdown(&mut countdown, 2.0, delta));

    // Следующий через 0.5s (30 тиков)
    let shots: usize = (0..29).map(|_| tick_fire_countdown(&mut countdown, 2.0, delta) as usize).sum();
    assert_eq!(shots, 0);
    let shots: usize = (0..2).map(|_| tick_fire_countdown(&mut countdown, 2.0, delta) as usize).sum();
    assert_eq!(shots, 1);
}

#[test]
fn test_stuck_detection_flips_after_threshold() {
    let mut brain = EnemyBrain::new(Vec2::ZERO);

    assert!(!brain.update_stuck(Vec2::ZERO, 1.0, 2.0));
    assert!(brain.update_stuck(Vec2::ZERO, 1.0, 2.0));
    assert_eq!(brain.stuck_time, 0.0);

    // Движение сбрасывает таймер
    assert!(!brain.update_stuck(Vec2::ZERO, 1.5, 2.0));
    assert!(!brain.update_stuck(Vec2::new(0.5, 0.0), 1.0, 2.0));
    assert_eq!(brain.stuck_time, 0.0);
}

#[test]
fn test_missing_death_sound_warns_once() {
    let silent = EnemyConfig::default();
    let mut warned = false;

    assert!(enemy_death_cue(&silent, Entity::from_raw(1), &mut warned).is_none());
    assert!(warned);
    assert!(enemy_death_cue(&silent, Entity::from_raw(2), &mut warned).is_none());
    assert!(warned);

    let loud = EnemyConfig {
        death_sound: Some("enemy_die".into()),
        ..default()
    };
    let cue = enemy_death_cue(&loud, Entity::from_raw(3), &mut warned).expect("cue");
    assert_eq!(cue.kind, SoundKind::Clip("enemy_die".into()));
    assert_eq!(cue.source, Some(Entity::from_raw(3)));
}

proptest! {
    #[test]
    fn prop_leaving_attack_range_goes_to_targeting(
        attack_range in 1.0f32..10.0,
        extra in 0.1f32..10.0,
        fraction in 0.01f32..0.99,
        is_static in any::<bool>(),
    ) {
        let config = EnemyConfig {
            attack_range,
            detection_range: attack_range + extra,
            is_static,
            ..EnemyConfig::default()
        };
        // Дистанция строго между attack и detection
        let distance = attack_range + extra * fraction;
        prop_assert_eq!(next_state(EnemyState::Attacking, &config, Some(distance)), EnemyState::Targeting);
    }
}
