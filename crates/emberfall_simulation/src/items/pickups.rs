//! Pickups: монеты, зелья, оружие, gear
//!
//! Все pickups — Trigger2D на слое Pickup, детектят игрока. Подбор по
//! `TriggerEntered`, после подбора entity удаляется.

use bevy::prelude::*;

use super::gear::{GearController, GearItem};
use crate::combat::{DamageIntent, HealIntent, WeaponController, WeaponDefinition};
use crate::components::{PhysicsBody, Player};
use crate::level::{LevelManager, SoundCue, SoundKind};
use crate::physics::TriggerEntered;
use crate::player::PlayerCharacter;

/// Монета. Собирается один раз.
#[derive(Component, Debug, Clone)]
pub struct Coin {
    pub value: i32,
    pub collected: bool,
}

impl Coin {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            collected: false,
        }
    }

    /// Пометить собранной. Возвращает value при первом сборе.
    pub fn collect(&mut self) -> Option<i32> {
        if self.collected {
            return None;
        }
        self.collected = true;
        Some(self.value)
    }
}

/// Зелье: лечит или (is_poison) ранит
#[derive(Component, Debug, Clone)]
pub struct Potion {
    pub amount: i32,
    pub is_poison: bool,
    pub collect_sound: Option<String>,
}

#[derive(Component, Debug, Clone)]
pub struct WeaponPickup {
    pub weapon: WeaponDefinition,
}

#[derive(Component, Debug, Clone)]
pub struct GearPickup {
    pub gear: GearItem,
}

/// Система: подбор pickups игроком
pub fn collect_pickups(
    mut commands: Commands,
    mut entered: EventReader<TriggerEntered>,
    mut coins: Query<&mut Coin>,
    potions: Query<&Potion>,
    weapon_pickups: Query<&WeaponPickup>,
    gear_pickups: Query<&GearPickup>,
    mut players: Query<
        (
            Option<&mut WeaponController>,
            Option<&mut GearController>,
            Option<&mut PlayerCharacter>,
            Option<&mut PhysicsBody>,
        ),
        With<Player>,
    >,
    mut level: ResMut<LevelManager>,
    mut heals: EventWriter<HealIntent>,
    mut damage: EventWriter<DamageIntent>,
    mut sounds: EventWriter<SoundCue>,
) {
    let mut consumed: Vec<Entity> = Vec::new();

    for event in entered.read() {
        let pickup = event.trigger;
        if consumed.contains(&pickup) {
            continue;
        }
        let Ok((weapon_controller, gear_controller, character, body)) = players.get_mut(event.other) else {
            continue;
        };

        if let Ok(mut coin) = coins.get_mut(pickup) {
            let Some(value) = coin.collect() else {
                continue;
            };
            level.add_coins(value);
            sounds.write(SoundCue::new(SoundKind::CoinPickup).from_entity(pickup));
        } else if let Ok(potion) = potions.get(pickup) {
            if potion.is_poison {
                damage.write(DamageIntent {
                    target: event.other,
                    amount: potion.amount,
                    source: Some(pickup),
                });
            } else {
                heals.write(HealIntent {
                    target: event.other,
                    amount: potion.amount,
                });
            }
            if let Some(clip) = &potion.collect_sound {
                sounds.write(SoundCue::clip(clip.clone()).from_entity(pickup));
            }
        } else if let Ok(weapon_pickup) = weapon_pickups.get(pickup) {
            let Some(mut controller) = weapon_controller else {
                crate::logger::log_warning("WeaponPickup: player has no WeaponController");
                continue;
            };
            controller.collect(weapon_pickup.weapon.clone());
        } else if let Ok(gear_pickup) = gear_pickups.get(pickup) {
            let (Some(mut controller), Some(mut character), Some(mut body)) = (gear_controller, character, body) else {
                crate::logger::log_warning("GearPickup: player has no GearController");
                continue;
            };
            if let Some(previous) = controller.current.as_ref().and_then(|gear| gear.loop_sound.clone()) {
                sounds.write(SoundCue::new(SoundKind::LoopStop(previous)).from_entity(event.other));
            }
            controller.collect(gear_pickup.gear.clone(), &mut character, &mut body);
            if let Some(clip) = &gear_pickup.gear.loop_sound {
                sounds.write(SoundCue::new(SoundKind::LoopStart(clip.clone())).from_entity(event.other));
            }
        } else {
            continue;
        }

        crate::logger::log(&format!("✨ Pickup {:?} collected by {:?}", pickup, event.other));
        consumed.push(pickup);
        commands.entity(pickup).try_despawn();
    }
}
