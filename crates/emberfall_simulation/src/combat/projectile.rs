//! Projectile: propulsion, движение, попадание, lifetime
//!
//! Снаряды не имеют Collider2D и не участвуют в физике тел: сами ищут
//! overlap со своим target mask каждый fixed tick. Solids не блокируют.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::damage::DamageIntent;
use crate::components::{Health, LayerMask, LevelEntity};
use crate::physics::SpatialQuery;

/// Тип движения снаряда
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum PropulsionType {
    /// Постоянная скорость к точке цели на момент выстрела
    #[default]
    ConstantVelocity,
    /// Разгон с 0 до `speed` на `propulsion_amount` ед/сек²
    Accelerating,
    /// Каждый тик — курс на текущую позицию цели
    Homing,
}

/// Параметры снаряда (prefab)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTemplate {
    pub damage: i32,
    pub speed: f32,
    pub propulsion: PropulsionType,
    pub propulsion_amount: f32,
    pub radius: f32,
    /// Время жизни (сек)
    pub lifetime: f32,
}

impl Default for ProjectileTemplate {
    fn default() -> Self {
        Self {
            damage: 10,
            speed: 8.0,
            propulsion: PropulsionType::ConstantVelocity,
            propulsion_amount: 10.0,
            radius: 0.15,
            lifetime: 10.0,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub damage: i32,
    /// Целевая (максимальная) скорость
    pub speed: f32,
    pub propulsion: PropulsionType,
    pub propulsion_amount: f32,
    /// Направление на точку цели при запуске
    pub direction: Vec2,
    pub velocity: Vec2,
    /// Текущая скорость разгона (Accelerating)
    pub current_speed: f32,
    /// Цель homing (None — держим последнюю velocity)
    pub target: Option<Entity>,
    pub target_mask: LayerMask,
    /// Стрелявший (не попадает в себя)
    pub owner: Option<Entity>,
    pub radius: f32,
    pub age: f32,
    pub lifetime: f32,
    /// Попал, ждёт despawn
    pub spent: bool,
}

impl Projectile {
    /// Запуск из `origin` в сторону `target_point`
    ///
    /// Homing без цели летит как ConstantVelocity к target_point.
    pub fn launch(
        origin: Vec2,
        target_point: Vec2,
        template: &ProjectileTemplate,
        target_mask: LayerMask,
        owner: Option<Entity>,
        homing_target: Option<Entity>,
    ) -> Self {
        let direction = (target_point - origin).normalize_or_zero();
        let speed = template.speed.max(0.0);

        let (velocity, current_speed) = match template.propulsion {
            PropulsionType::ConstantVelocity => (direction * speed, speed),
            PropulsionType::Accelerating => (Vec2::ZERO, 0.0),
            PropulsionType::Homing => {
                if homing_target.is_none() {
                    crate::logger::log_warning("Homing projectile: no target found, flying straight");
                }
                (direction * speed, speed)
            }
        };

        Self {
            damage: template.damage,
            speed,
            propulsion: template.propulsion,
            propulsion_amount: template.propulsion_amount,
            direction,
            velocity,
            current_speed,
            target: homing_target.filter(|_| template.propulsion == PropulsionType::Homing),
            target_mask,
            owner,
            radius: template.radius,
            age: 0.0,
            lifetime: template.lifetime,
            spent: false,
        }
    }

    /// Обновить velocity по типу propulsion
    ///
    /// `target_position` — позиция homing цели (None если цель пропала).
    pub fn steer(&mut self, position: Vec2, target_position: Option<Vec2>, delta: f32) {
        match self.propulsion {
            PropulsionType::ConstantVelocity => {}
            PropulsionType::Accelerating => {
                if self.current_speed < self.speed {
                    self.current_speed = (self.current_speed + self.propulsion_amount * delta).min(self.speed);
                    self.velocity = self.direction * self.current_speed;
                }
            }
            PropulsionType::Homing => {
                if let Some(target_position) = target_position {
                    let to_target = (target_position - position).normalize_or_zero();
                    if to_target != Vec2::ZERO {
                        self.velocity = to_target * self.speed;
                    }
                }
            }
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Spawn снаряда как entity уровня
pub fn spawn_projectile(commands: &mut Commands, origin: Vec2, projectile: Projectile) -> Entity {
    crate::logger::log(&format!(
        "🔫 Projectile launched from {:?}: {:?}, velocity {:?}",
        origin, projectile.propulsion, projectile.velocity
    ));
    commands
        .spawn((
            Transform::from_translation(origin.extend(0.0)),
            projectile,
            LevelEntity,
        ))
        .id()
}

/// Система: propulsion (homing курс, разгон)
pub fn steer_projectiles(
    time: Res<Time<Fixed>>,
    mut projectiles: Query<(&Transform, &mut Projectile)>,
    targets: Query<(&Transform, Option<&Health>), Without<Projectile>>,
) {
    let delta = time.delta_secs();
    for (transform, mut projectile) in projectiles.iter_mut() {
        let target_position = match projectile.target {
            Some(target) => match targets.get(target) {
                Ok((target_transform, health)) if health.is_none_or(|h| h.is_alive()) => {
                    Some(target_transform.translation.truncate())
                }
                _ => {
                    // Цель исчезла/умерла — дальше по инерции
                    projectile.target = None;
                    None
                }
            },
            None => None,
        };
        projectile.steer(transform.translation.truncate(), target_position, delta);
    }
}

/// Система: интеграция позиции + возраст
pub fn move_projectiles(time: Res<Time<Fixed>>, mut projectiles: Query<(&mut Transform, &mut Projectile)>) {
    let delta = time.delta_secs();
    for (mut transform, mut projectile) in projectiles.iter_mut() {
        let step = projectile.velocity * delta;
        transform.translation.x += step.x;
        transform.translation.y += step.y;
        projectile.age += delta;
    }
}

/// Система: попадания. Первый overlap на target mask → урон, снаряд удаляется.
pub fn resolve_projectile_hits(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &Transform, &mut Projectile)>,
    spatial: SpatialQuery,
    healths: Query<&Health>,
    mut damage: EventWriter<DamageIntent>,
) {
    for (entity, transform, mut projectile) in projectiles.iter_mut() {
        if projectile.spent {
            continue;
        }
        let position = transform.translation.truncate();
        let hits = spatial.overlap_circle(position, projectile.radius, projectile.target_mask, projectile.owner);
        let Some(hit) = hits.first() else {
            continue;
        };

        if healths.contains(hit.owner) {
            damage.write(DamageIntent {
                target: hit.owner,
                amount: projectile.damage,
                source: projectile.owner,
            });
        }
        crate::logger::log(&format!("🎯 Projectile {:?} hit {:?}", entity, hit.owner));
        projectile.spent = true;
        commands.entity(entity).try_despawn();
    }
}

/// Система: despawn по lifetime
pub fn expire_projectiles(mut commands: Commands, projectiles: Query<(Entity, &Projectile)>) {
    for (entity, projectile) in projectiles.iter() {
        if !projectile.spent && projectile.is_expired() {
            commands.entity(entity).try_despawn();
        }
    }
}
