//! Combat: здоровье, melee, оружие, снаряды, смерть
//!
//! Поток урона:
//! 1. Источники (удар, снаряд, шипы, яд) пишут `DamageIntent` / `HealIntent`
//! 2. `apply_damage_intents` — guard + Health → `HealthChanged`, `DamageDealt`, `EntityDied`
//! 3. `handle_deaths` — коллайдер off, `Dead`, DeathBehavior (despawn / respawn)

use bevy::prelude::*;

use crate::SimulationSet;

pub mod attack;
pub mod damage;
pub mod projectile;
pub mod weapon;


// Re-export основных типов
pub use attack::{tick_attack_windows, AttackController, AttackWindow, BASE_SWING_DURATION};
pub use damage::{
    spawn_drops, DamageDealt, DamageIntent, Dead, DespawnAfter, EntityDied, HealIntent, HealthChanged, RespawnTimer,
};
pub use projectile::{spawn_projectile, Projectile, ProjectileTemplate, PropulsionType};
pub use weapon::{AttackChoice, WeaponController, WeaponDefinition, DEFAULT_WEAPON_SWITCH_TIME};

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate):
/// - Physics: steer → move снарядов
/// - Contacts: попадания снарядов, lifetime
/// - Combat: attack windows (авто-удар), weapon switch-back
/// - Damage: damage/heal intents → Health, hurt таймеры
/// - Death: смерть, отложенный despawn, respawn таймеры
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageIntent>()
            .add_event::<HealIntent>()
            .add_event::<HealthChanged>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: Propulsion + движение снарядов
                (projectile::steer_projectiles, projectile::move_projectiles)
                    .chain()
                    .in_set(SimulationSet::Physics),
                // Фаза 2: Попадания
                (projectile::resolve_projectile_hits, projectile::expire_projectiles)
                    .chain()
                    .in_set(SimulationSet::Contacts),
                // Фаза 3: Окна атак и таймеры оружия
                (attack::tick_attack_windows, weapon::tick_weapon_switch_back).in_set(SimulationSet::Combat),
                // Фаза 4: Применение урона/лечения
                (
                    damage::apply_damage_intents,
                    damage::apply_heal_intents,
                    damage::tick_hurt_timers,
                    damage::sync_health_animation,
                )
                    .chain()
                    .in_set(SimulationSet::Damage),
                // Фаза 5: Смерть
                (
                    damage::handle_deaths,
                    damage::despawn_after_timeout,
                    damage::tick_respawn_timers,
                )
                    .chain()
                    .in_set(SimulationSet::Death),
            ),
        );
    }
}
