//! Gear — временные модификаторы движения
//!
//! Подбор GearItem меняет скорости и параметры тела на `duration` секунд.
//! Один таймер на игрока: новый gear отменяет предыдущий.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::components::{BodyParams, OriginalParams, PhysicsBody};
use crate::level::{SoundCue, SoundKind};
use crate::player::PlayerCharacter;

/// Описание gear (data asset)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearItem {
    pub name: String,
    pub gravity_scale: f32,
    pub drag: f32,
    pub run_speed: f32,
    pub walk_speed: f32,
    /// Если задано — меняет массу тела
    pub mass: Option<f32>,
    pub duration: f32,
    pub hit_sound: Option<String>,
    pub loop_sound: Option<String>,
}

impl Default for GearItem {
    fn default() -> Self {
        Self {
            name: "Jetpack".into(),
            gravity_scale: 0.5,
            drag: 5.0,
            run_speed: 10.0,
            walk_speed: 5.0,
            mass: None,
            duration: 5.0,
            hit_sound: None,
            loop_sound: None,
        }
    }
}

/// Модификатор движения: скорости + параметры тела
///
/// Общий для gear и fluid.
pub fn apply_movement_modifier(
    character: &mut PlayerCharacter,
    body: &mut PhysicsBody,
    walk_speed: f32,
    run_speed: f32,
    gravity_scale: f32,
    drag: f32,
    mass: Option<f32>,
) {
    character.walk_speed = walk_speed;
    character.run_speed = run_speed;
    body.apply_params(BodyParams {
        gravity_scale,
        linear_drag: drag,
        mass: mass.unwrap_or(body.mass),
    });
}

/// Восстановление исходных скоростей и параметров тела
pub fn restore_original(character: &mut PlayerCharacter, body: &mut PhysicsBody, original: &OriginalParams) {
    character.walk_speed = original.walk_speed;
    character.run_speed = original.run_speed;
    body.apply_params(original.body);
}

#[derive(Component, Debug, Clone, Default)]
pub struct GearController {
    pub current: Option<GearItem>,
    /// Единственный таймер снятия gear
    pub removal: Option<Timer>,
}

impl GearController {
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Применить gear и перезапустить таймер снятия
    pub fn collect(&mut self, gear: GearItem, character: &mut PlayerCharacter, body: &mut PhysicsBody) {
        apply_movement_modifier(
            character,
            body,
            gear.walk_speed,
            gear.run_speed,
            gear.gravity_scale,
            gear.drag,
            gear.mass,
        );
        crate::logger::log_info(&format!("🎒 Gear '{}' applied for {:.1}s", gear.name, gear.duration));
        self.removal = Some(Timer::from_seconds(gear.duration.max(0.0), TimerMode::Once));
        self.current = Some(gear);
    }

    /// Тик таймера. true — время вышло (снятие делает вызывающий).
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.removal.as_mut() else {
            return false;
        };
        timer.tick(delta).finished()
    }

    /// Снять gear. Возвращает снятый item.
    pub fn remove(
        &mut self,
        character: &mut PlayerCharacter,
        body: &mut PhysicsBody,
        original: &OriginalParams,
    ) -> Option<GearItem> {
        self.removal = None;
        let gear = self.current.take()?;
        restore_original(character, body, original);
        Some(gear)
    }
}

/// Система: снятие gear по таймеру
pub fn tick_gear_timers(
    time: Res<Time<Fixed>>,
    mut players: Query<(
        Entity,
        &mut GearController,
        &mut PlayerCharacter,
        &mut PhysicsBody,
        &OriginalParams,
    )>,
    mut sounds: EventWriter<SoundCue>,
) {
    for (entity, mut gear, mut character, mut body, original) in players.iter_mut() {
        if !gear.tick(time.delta()) {
            continue;
        }
        if let Some(removed) = gear.remove(&mut character, &mut body, original) {
            crate::logger::log_info(&format!("🎒 Gear '{}' expired", removed.name));
            if let Some(clip) = removed.loop_sound {
                sounds.write(SoundCue::new(SoundKind::LoopStop(clip)).from_entity(entity));
            }
        }
    }
}
