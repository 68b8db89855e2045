//! Базовые компоненты акторов: Player, Health, DeathBehavior

use bevy::prelude::*;

/// Маркер игрока
///
/// AI ищет цели только среди entities с этим маркером.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Результат попытки нанести урон
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Невалидный amount (отрицательный или overflow) — ничего не изменилось
    Rejected,
    /// Уже мёртв — урон игнорируется, повторной смерти нет
    Ignored,
    /// Урон применён, актор жив (hurt)
    Hurt,
    /// Урон применён, HP дошло до 0
    Killed,
}

/// Результат попытки лечения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealOutcome {
    Rejected,
    Ignored,
    /// Сколько HP реально добавилось (после clamp к max)
    Healed(i32),
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max. После смерти current == 0.
///
/// Guard против невалидного урона: отрицательный amount и overflow вычитания
/// отклоняются. Проверка вида `current - amount > current` на i32 без overflow
/// эквивалентна `amount < 0`, её и проверяем явно.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    pub is_dead: bool,
    pub is_hurting: bool,
    /// Сколько длится hurt state (секунды)
    pub hurt_duration: f32,
    /// Оставшееся время hurt state
    pub hurt_timer: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            is_dead: false,
            is_hurting: false,
            hurt_duration: 0.3,
            hurt_timer: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead && self.current > 0
    }

    /// Доля HP для health bar (0.0..=1.0)
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if amount < 0 {
            return DamageOutcome::Rejected;
        }
        if self.is_dead {
            return DamageOutcome::Ignored;
        }
        let Some(next) = self.current.checked_sub(amount) else {
            return DamageOutcome::Rejected;
        };

        if next <= 0 {
            self.current = 0;
            self.is_dead = true;
            self.is_hurting = false;
            self.hurt_timer = 0.0;
            DamageOutcome::Killed
        } else {
            self.current = next;
            self.is_hurting = true;
            self.hurt_timer = self.hurt_duration;
            DamageOutcome::Hurt
        }
    }

    pub fn heal(&mut self, amount: i32) -> HealOutcome {
        if amount < 0 {
            return HealOutcome::Rejected;
        }
        if self.is_dead {
            return HealOutcome::Ignored;
        }
        let Some(next) = self.current.checked_add(amount) else {
            return HealOutcome::Rejected;
        };

        let before = self.current;
        self.current = next.min(self.max);
        HealOutcome::Healed(self.current - before)
    }

    /// Тик hurt таймера. Возвращает true когда hurt закончился на этом тике.
    pub fn tick_hurt(&mut self, delta: f32) -> bool {
        if !self.is_hurting {
            return false;
        }
        self.hurt_timer -= delta;
        if self.hurt_timer <= 0.0 {
            self.hurt_timer = 0.0;
            self.is_hurting = false;
            return true;
        }
        false
    }

    /// Полный сброс (respawn игрока)
    pub fn reset(&mut self) {
        self.current = self.max;
        self.is_dead = false;
        self.is_hurting = false;
        self.hurt_timer = 0.0;
    }
}

/// Что делать с entity после смерти
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum DeathBehavior {
    /// Удалить сразу (враги-стрелки)
    DespawnImmediately,
    /// Удалить через N секунд (трупы слаймов)
    DespawnAfter { delay: f32 },
    /// Игрок: сброс HP/флагов/коллайдера и перезагрузка уровня через N секунд
    Respawn { delay: f32 },
}

impl Default for DeathBehavior {
    fn default() -> Self {
        Self::DespawnAfter { delay: 2.0 }
    }
}

/// Предметы, которые выпадают после смерти/разрушения
///
/// Пустой список при `enabled == true` — warning в лог, не ошибка.
#[derive(Component, Debug, Clone, Default)]
pub struct DropItems {
    pub enabled: bool,
    pub items: Vec<crate::config::PickupConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        assert_eq!(health.current, 100);

        assert_eq!(health.take_damage(30), DamageOutcome::Hurt);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());
        assert!(health.is_hurting);

        assert_eq!(health.take_damage(100), DamageOutcome::Killed); // Clamp к 0
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
        assert!(health.is_dead);
    }

    #[test]
    fn test_health_rejects_negative_damage() {
        let mut health = Health::new(100);
        health.take_damage(40);

        assert_eq!(health.take_damage(-10), DamageOutcome::Rejected);
        assert_eq!(health.current, 60);
    }

    #[test]
    fn test_health_rejects_overflowing_damage() {
        let mut health = Health::new(100);
        health.current = i32::MIN + 5;

        assert_eq!(health.take_damage(10), DamageOutcome::Rejected);
        assert_eq!(health.current, i32::MIN + 5);
    }

    #[test]
    fn test_dead_actor_ignores_damage() {
        let mut health = Health::new(10);
        assert_eq!(health.take_damage(10), DamageOutcome::Killed);
        assert_eq!(health.take_damage(10), DamageOutcome::Ignored);
        assert_eq!(health.current, 0);
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.take_damage(50);

        assert_eq!(health.heal(30), HealOutcome::Healed(30));
        assert_eq!(health.current, 80);

        assert_eq!(health.heal(100), HealOutcome::Healed(20)); // Clamp к max
        assert_eq!(health.current, 100);

        assert_eq!(health.heal(-5), HealOutcome::Rejected);
        assert_eq!(health.heal(i32::MAX), HealOutcome::Rejected);
    }

    #[test]
    fn test_hurt_timer_expires() {
        let mut health = Health::new(100);
        health.take_damage(1);
        assert!(health.is_hurting);

        assert!(!health.tick_hurt(0.1));
        assert!(health.tick_hurt(0.25));
        assert!(!health.is_hurting);
    }

    #[test]
    fn test_reset_after_death() {
        let mut health = Health::new(50);
        health.take_damage(80);
        health.reset();

        assert_eq!(health.current, 50);
        assert!(health.is_alive());
    }
}
