//! WeaponController — временное дальнобойное оружие поверх melee
//!
//! Оружие подбирается (WeaponPickup), держится `switch_time` секунд, потом
//! автоматически возвращается melee. Новый подбор заменяет таймер.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::attack::AttackController;
use super::projectile::{ProjectileTemplate, PropulsionType};
use crate::components::Facing;
use crate::physics::OverlapHit;

/// Время до возврата к melee, если у оружия своё не задано
pub const DEFAULT_WEAPON_SWITCH_TIME: f32 = 5.0;

/// Описание оружия (data asset)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDefinition {
    pub name: String,
    pub damage: i32,
    /// Скорость вылета снаряда
    pub attack_speed: f32,
    /// Дальность поиска цели
    pub range: f32,
    pub propulsion: PropulsionType,
    pub propulsion_amount: f32,
    /// Сколько оружие активно после подбора (≤ 0 → default)
    pub switch_time: f32,
    pub projectile_radius: f32,
    pub projectile_lifetime: f32,
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self {
            name: "Blaster".into(),
            damage: 15,
            attack_speed: 12.0,
            range: 12.0,
            propulsion: PropulsionType::ConstantVelocity,
            propulsion_amount: 0.0,
            switch_time: DEFAULT_WEAPON_SWITCH_TIME,
            projectile_radius: 0.15,
            projectile_lifetime: 10.0,
        }
    }
}

impl WeaponDefinition {
    pub fn projectile_template(&self) -> ProjectileTemplate {
        ProjectileTemplate {
            damage: self.damage,
            speed: self.attack_speed,
            propulsion: self.propulsion,
            propulsion_amount: self.propulsion_amount,
            radius: self.projectile_radius,
            lifetime: self.projectile_lifetime,
        }
    }
}

/// Что делать по нажатию атаки
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackChoice {
    Melee,
    Ranged { target: Entity, point: Vec2 },
    /// Есть оружие, но впереди нет цели
    Nothing,
}

#[derive(Component, Debug, Clone)]
pub struct WeaponController {
    pub current: Option<WeaponDefinition>,
    pub default_switch_time: f32,
    /// Точка вылета снаряда (локальная, для взгляда вправо)
    pub shooting_point: Vec2,
    /// Единственный таймер возврата к melee
    pub switch_back: Option<Timer>,
}

impl Default for WeaponController {
    fn default() -> Self {
        Self {
            current: None,
            default_switch_time: DEFAULT_WEAPON_SWITCH_TIME,
            shooting_point: Vec2::new(0.5, 0.1),
            switch_back: None,
        }
    }
}

impl WeaponController {
    pub fn has_weapon(&self) -> bool {
        self.current.is_some()
    }

    /// Экипировать оружие и перезапустить таймер возврата
    pub fn collect(&mut self, weapon: WeaponDefinition) {
        let switch_time = if weapon.switch_time > 0.0 {
            weapon.switch_time
        } else {
            self.default_switch_time
        };
        crate::logger::log_info(&format!("🔫 Weapon '{}' equipped for {:.1}s", weapon.name, switch_time));
        self.current = Some(weapon);
        self.switch_back = Some(Timer::from_seconds(switch_time, TimerMode::Once));
    }

    pub fn unequip(&mut self) {
        self.current = None;
        self.switch_back = None;
    }

    /// Тик таймера. true — оружие только что убрано.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.switch_back.as_mut() else {
            return false;
        };
        if timer.tick(delta).finished() {
            self.unequip();
            return true;
        }
        false
    }

    pub fn shooting_point(&self, origin: Vec2, facing: &Facing) -> Vec2 {
        facing.world_point(origin, self.shooting_point)
    }

    /// Выбор атаки
    ///
    /// `candidates` — враги в радиусе `weapon.range` от origin. Берётся
    /// ближайший к shooting point и находящийся перед ним; если он в melee
    /// радиусе attack point — melee, иначе выстрел.
    pub fn choose_attack(
        &self,
        origin: Vec2,
        facing: &Facing,
        attack: &AttackController,
        candidates: &[OverlapHit],
    ) -> AttackChoice {
        if !self.has_weapon() {
            return AttackChoice::Melee;
        }

        let shooting_point = self.shooting_point(origin, facing);
        let nearest = candidates
            .iter()
            .filter(|hit| facing.is_in_front(shooting_point, hit.position))
            .min_by(|a, b| {
                a.position
                    .distance_squared(shooting_point)
                    .total_cmp(&b.position.distance_squared(shooting_point))
            });

        let Some(nearest) = nearest else {
            return AttackChoice::Nothing;
        };

        let hit_point = attack.hit_point(origin, facing);
        if hit_point.distance(nearest.position) <= attack.range {
            AttackChoice::Melee
        } else {
            AttackChoice::Ranged {
                target: nearest.owner,
                point: nearest.position,
            }
        }
    }
}

/// Система: возврат к melee по таймеру
pub fn tick_weapon_switch_back(time: Res<Time<Fixed>>, mut controllers: Query<(Entity, &mut WeaponController)>) {
    for (entity, mut controller) in controllers.iter_mut() {
        if controller.tick(time.delta()) {
            crate::logger::log_info(&format!("🗡️ {:?} switched back to melee", entity));
        }
    }
}
