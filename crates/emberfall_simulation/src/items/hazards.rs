//! Hazards: шипы и жидкости

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::gear::{apply_movement_modifier, restore_original};
use crate::combat::DamageIntent;
use crate::components::{OriginalParams, PhysicsBody, Player};
use crate::level::{SoundCue, SoundKind};
use crate::physics::{TriggerEntered, TriggerExited};
use crate::player::PlayerCharacter;

/// Интервал урона в жидкости
pub const FLUID_DAMAGE_INTERVAL: f32 = 1.0;

/// Шипы: урон игроку при входе
#[derive(Component, Debug, Clone, Copy)]
pub struct Spike {
    pub damage: i32,
}

impl Default for Spike {
    fn default() -> Self {
        Self { damage: 100 }
    }
}

/// Жидкость: пока игрок внутри — другие скорости/гравитация/drag
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fluid {
    pub do_damage: bool,
    pub damage: i32,
    pub gravity_scale: f32,
    pub drag: f32,
    pub run_speed: f32,
    pub walk_speed: f32,
    pub mass: Option<f32>,
    pub hit_sound: Option<String>,
    pub loop_sound: Option<String>,
    /// Игрок внутри
    #[serde(skip)]
    pub occupant: Option<Entity>,
    /// Повторяющийся таймер урона (только пока игрок внутри)
    #[serde(skip)]
    pub damage_timer: Option<Timer>,
}

impl Default for Fluid {
    fn default() -> Self {
        Self {
            do_damage: false,
            damage: 0,
            gravity_scale: 0.5,
            drag: 5.0,
            run_speed: 10.0,
            walk_speed: 5.0,
            mass: None,
            hit_sound: None,
            loop_sound: None,
            occupant: None,
            damage_timer: None,
        }
    }
}

/// Система: шипы
pub fn spike_contacts(
    mut entered: EventReader<TriggerEntered>,
    spikes: Query<&Spike>,
    players: Query<(), With<Player>>,
    mut damage: EventWriter<DamageIntent>,
) {
    for event in entered.read() {
        let Ok(spike) = spikes.get(event.trigger) else {
            continue;
        };
        if !players.contains(event.other) {
            continue;
        }
        crate::logger::log(&format!("🔺 Spike hit {:?} for {}", event.other, spike.damage));
        damage.write(DamageIntent {
            target: event.other,
            amount: spike.damage,
            source: Some(event.trigger),
        });
    }
}

/// Система: вход/выход из жидкости
///
/// Вход: параметры жидкости, мгновенный урон (если do_damage) и таймер.
/// Выход: восстановление исходных параметров.
pub fn fluid_transitions(
    mut entered: EventReader<TriggerEntered>,
    mut exited: EventReader<TriggerExited>,
    mut fluids: Query<&mut Fluid>,
    mut players: Query<(&mut PlayerCharacter, &mut PhysicsBody, &OriginalParams), With<Player>>,
    mut damage: EventWriter<DamageIntent>,
    mut sounds: EventWriter<SoundCue>,
) {
    for event in entered.read() {
        let Ok(mut fluid) = fluids.get_mut(event.trigger) else {
            continue;
        };
        let Ok((mut character, mut body, _)) = players.get_mut(event.other) else {
            continue;
        };
        if fluid.occupant.is_some() {
            continue;
        }

        crate::logger::log("💧 Player entered fluid");
        fluid.occupant = Some(event.other);
        apply_movement_modifier(
            &mut character,
            &mut body,
            fluid.walk_speed,
            fluid.run_speed,
            fluid.gravity_scale,
            fluid.drag,
            fluid.mass,
        );

        if fluid.do_damage {
            damage.write(DamageIntent {
                target: event.other,
                amount: fluid.damage,
                source: Some(event.trigger),
            });
            fluid.damage_timer = Some(Timer::from_seconds(FLUID_DAMAGE_INTERVAL, TimerMode::Repeating));
        }
        if let Some(clip) = &fluid.hit_sound {
            sounds.write(SoundCue::clip(clip.clone()).from_entity(event.trigger));
        }
        if let Some(clip) = &fluid.loop_sound {
            sounds.write(SoundCue::new(SoundKind::LoopStart(clip.clone())).from_entity(event.trigger));
        }
    }

    for event in exited.read() {
        let Ok(mut fluid) = fluids.get_mut(event.trigger) else {
            continue;
        };
        if fluid.occupant != Some(event.other) {
            continue;
        }

        crate::logger::log("💧 Player exited fluid");
        fluid.occupant = None;
        fluid.damage_timer = None;
        if let Ok((mut character, mut body, original)) = players.get_mut(event.other) {
            restore_original(&mut character, &mut body, original);
        }
        if let Some(clip) = &fluid.loop_sound {
            sounds.write(SoundCue::new(SoundKind::LoopStop(clip.clone())).from_entity(event.trigger));
        }
    }
}

/// Система: урон раз в секунду пока игрок в жидкости
pub fn fluid_damage_over_time(
    time: Res<Time<Fixed>>,
    mut fluids: Query<(Entity, &mut Fluid)>,
    mut damage: EventWriter<DamageIntent>,
) {
    for (entity, mut fluid) in fluids.iter_mut() {
        let Some(occupant) = fluid.occupant else {
            continue;
        };
        let amount = fluid.damage;
        let Some(timer) = fluid.damage_timer.as_mut() else {
            continue;
        };
        let ticks = timer.tick(time.delta()).times_finished_this_tick();
        for _ in 0..ticks {
            damage.write(DamageIntent {
                target: occupant,
                amount,
                source: Some(entity),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluid_config_defaults_from_json() {
        let fluid: Fluid = serde_json::from_str(r#"{ "do_damage": true, "damage": 5 }"#).unwrap();
        assert!(fluid.do_damage);
        assert_eq!(fluid.damage, 5);
        assert_eq!(fluid.gravity_scale, 0.5);
        assert!(fluid.occupant.is_none());
        assert!(fluid.damage_timer.is_none());
    }
}
