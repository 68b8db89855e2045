//! Turret — стационарный стрелок с одним радиусом
//!
//! Цель "липкая": держится пока жива и в радиусе, потом ищется заново.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::enemy::tick_fire_countdown;
use super::systems::{aim_at, nearest_living_player};
use crate::combat::{spawn_projectile, Dead, Projectile, ProjectileTemplate, PropulsionType};
use crate::components::{Health, LayerMask, Player};
use crate::level::SoundCue;

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Turret {
    pub range: f32,
    pub fire_rate: f32,
    /// Локальная точка вылета (поворачивается вместе с турелью)
    pub fire_point: Vec2,
    pub projectile: ProjectileTemplate,
    pub fire_sound: Option<String>,
    #[serde(skip)]
    pub target: Option<Entity>,
    #[serde(skip)]
    pub fire_countdown: f32,
}

impl Default for Turret {
    fn default() -> Self {
        Self {
            range: 10.0,
            fire_rate: 1.0,
            fire_point: Vec2::new(0.6, 0.0),
            projectile: ProjectileTemplate::default(),
            fire_sound: None,
            target: None,
            fire_countdown: 0.0,
        }
    }
}

impl Turret {
    /// Текущая цель остаётся, если жива и в радиусе
    pub fn keeps_target(&self, target_position: Vec2, target_alive: bool, position: Vec2) -> bool {
        target_alive && position.distance(target_position) <= self.range
    }

    pub fn fire_origin(&self, transform: &Transform) -> Vec2 {
        (transform.translation + transform.rotation * self.fire_point.extend(0.0)).truncate()
    }
}

/// Система: турели (FixedUpdate)
pub fn turret_system(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut turrets: Query<(Entity, &mut Transform, &mut Turret), (Without<Player>, Without<Dead>)>,
    players: Query<(Entity, &Transform, &Health), (With<Player>, Without<Turret>)>,
    mut sounds: EventWriter<SoundCue>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut turret) in turrets.iter_mut() {
        let position = transform.translation.truncate();

        // Проверка текущей цели
        if let Some(target) = turret.target {
            let keep = players
                .get(target)
                .is_ok_and(|(_, target_transform, health)| {
                    turret.keeps_target(target_transform.translation.truncate(), health.is_alive(), position)
                });
            if !keep {
                crate::logger::log(&format!("🗼 Turret {:?} lost target {:?}", entity, target));
                turret.target = None;
            }
        }

        // Поиск новой цели только если её нет
        if turret.target.is_none() {
            turret.target = nearest_living_player(position, players.iter())
                .filter(|(_, _, distance)| *distance <= turret.range)
                .map(|(target, _, _)| target);
            if let Some(target) = turret.target {
                crate::logger::log(&format!("🗼 Turret {:?} acquired {:?}", entity, target));
            }
        }

        let Some(target) = turret.target else {
            continue;
        };
        let Ok((_, target_transform, _)) = players.get(target) else {
            continue;
        };
        let target_position = target_transform.translation.truncate();

        aim_at(&mut transform, target_position);

        let fire_rate = turret.fire_rate;
        if tick_fire_countdown(&mut turret.fire_countdown, fire_rate, delta) {
            let origin = turret.fire_origin(&transform);
            let homing_target = (turret.projectile.propulsion == PropulsionType::Homing).then_some(target);
            let projectile = Projectile::launch(
                origin,
                target_position,
                &turret.projectile,
                LayerMask::PLAYER,
                Some(entity),
                homing_target,
            );
            spawn_projectile(&mut commands, origin, projectile);
            if let Some(clip) = &turret.fire_sound {
                sounds.write(SoundCue::clip(clip.clone()).from_entity(entity));
            }
        }
    }
}
