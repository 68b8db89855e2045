//! Enemy AI
//!
//! - `enemy` — FSM стрелка (Idle → Patrolling/Targeting → Attacking)
//! - `turret` — стационарная турель с липкой целью
//! - `slime` — ping-pong ходок с melee hit-box
//!
//! Все решения в FixedUpdate (SimulationSet::Intent), до физики.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod enemy;
pub mod slime;
pub mod systems;
pub mod turret;

#[cfg(test)]
mod fsm_tests;

// Re-export основных типов
pub use enemy::{next_state, tick_fire_countdown, EnemyBrain, EnemyConfig, EnemyState};
pub use slime::Slime;
pub use systems::{aim_at, nearest_living_player};
pub use turret::Turret;

/// AI Plugin
///
/// Порядок выполнения:
/// 1. enemy_fsm_system — цель, ground check, переход или действие
/// 2. turret_system — цель, прицел, стрельба
/// 3. slime_system — ходьба / авто-атака
/// 4. announce_enemy_deaths (Death, до handle_deaths)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<EnemyState>().register_type::<EnemyBrain>();

        app.add_systems(
            FixedUpdate,
            (
                (systems::enemy_fsm_system, turret::turret_system, slime::slime_system)
                    .chain()
                    .in_set(SimulationSet::Intent),
                systems::announce_enemy_deaths
                    .in_set(SimulationSet::Death)
                    .before(crate::combat::damage::handle_deaths),
            ),
        );
    }
}
