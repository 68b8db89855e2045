//! Enemy FSM components (state, config, runtime brain)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::ProjectileTemplate;

/// Смещение меньше этого за тик считается "стоим на месте"
pub const STUCK_EPSILON: f32 = 0.01;
/// Длина ground/front лучей
pub const CHECK_DISTANCE: f32 = 0.2;

/// Enemy FSM состояния
///
/// Ровно одно активно в каждый момент (enum).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum EnemyState {
    /// Начальное состояние после спавна
    #[default]
    Idle,
    /// Ходьба вперёд в пределах patrol radius
    Patrolling,
    /// Цель в detection range, но дальше attack range
    Targeting,
    /// Цель в attack range — стрельба с fire rate
    Attacking,
}

/// Параметры врага-стрелка
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub detection_range: f32,
    pub attack_range: f32,
    /// Выстрелов в секунду
    pub fire_rate: f32,
    /// Static — стоит и целится; иначе патрулирует
    pub is_static: bool,
    pub walk_speed: f32,
    pub patrol_radius: f32,
    /// Секунд без движения до разворота
    pub stuck_threshold: f32,
    pub ground_check_offset: Vec2,
    pub front_check_offset: Vec2,
    pub fire_point: Vec2,
    pub projectile: ProjectileTemplate,
    pub fire_sound: Option<String>,
    pub death_sound: Option<String>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            detection_range: 15.0,
            attack_range: 10.0,
            fire_rate: 1.0,
            is_static: true,
            walk_speed: 2.0,
            patrol_radius: 10.0,
            stuck_threshold: 2.0,
            ground_check_offset: Vec2::new(0.4, -0.5),
            front_check_offset: Vec2::new(0.45, 0.0),
            fire_point: Vec2::new(0.6, 0.1),
            projectile: ProjectileTemplate::default(),
            fire_sound: None,
            death_sound: None,
        }
    }
}

/// Runtime состояние врага
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct EnemyBrain {
    pub target: Option<Entity>,
    pub fire_countdown: f32,
    /// Точка спавна (центр patrol radius)
    pub initial_position: Vec2,
    pub last_position: Vec2,
    pub stuck_time: f32,
    pub grounded: bool,
}

impl EnemyBrain {
    pub fn new(spawn_position: Vec2) -> Self {
        Self {
            initial_position: spawn_position,
            last_position: spawn_position,
            ..default()
        }
    }

    /// Детекция застревания. true — пора разворачиваться.
    pub fn update_stuck(&mut self, position: Vec2, delta: f32, threshold: f32) -> bool {
        let mut flip = false;
        if position.distance(self.last_position) < STUCK_EPSILON {
            self.stuck_time += delta;
            if self.stuck_time >= threshold {
                flip = true;
                self.stuck_time = 0.0;
            }
        } else {
            self.stuck_time = 0.0;
        }
        self.last_position = position;
        flip
    }
}

/// Переход FSM
///
/// `target_distance` — дистанция до цели (None если цели нет).
/// Из Attacking выход только в Targeting.
pub fn next_state(state: EnemyState, config: &EnemyConfig, target_distance: Option<f32>) -> EnemyState {
    let in_detection = target_distance.is_some_and(|distance| distance <= config.detection_range);
    let in_attack = target_distance.is_some_and(|distance| distance <= config.attack_range);
    let resting = if config.is_static {
        EnemyState::Idle
    } else {
        EnemyState::Patrolling
    };

    match state {
        EnemyState::Idle => {
            if in_detection {
                if config.is_static {
                    EnemyState::Targeting
                } else {
                    EnemyState::Patrolling
                }
            } else {
                EnemyState::Idle
            }
        }
        EnemyState::Patrolling => {
            if in_detection {
                EnemyState::Targeting
            } else {
                EnemyState::Patrolling
            }
        }
        EnemyState::Targeting => {
            if in_attack {
                EnemyState::Attacking
            } else if !in_detection {
                resting
            } else {
                EnemyState::Targeting
            }
        }
        EnemyState::Attacking => {
            if in_attack {
                EnemyState::Attacking
            } else {
                EnemyState::Targeting
            }
        }
    }
}

/// Fire cadence: выстрел когда countdown ≤ 0, затем countdown = 1 / rate
///
/// Countdown уменьшается каждый тик после проверки.
pub fn tick_fire_countdown(countdown: &mut f32, fire_rate: f32, delta: f32) -> bool {
    let mut fire = false;
    if *countdown <= 0.0 {
        fire = true;
        *countdown = 1.0 / fire_rate.max(0.001);
    }
    *countdown -= delta;
    fire
}
