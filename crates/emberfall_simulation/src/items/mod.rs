//! Items: pickups, gear, hazards
//!
//! Всё реагирует на trigger события из `physics::detect_trigger_transitions`,
//! поэтому системы идут в `SimulationSet::Contacts` после неё.

use bevy::prelude::*;

use crate::physics::detect_trigger_transitions;
use crate::SimulationSet;

pub mod gear;
pub mod hazards;
pub mod pickups;

pub use gear::{apply_movement_modifier, restore_original, GearController, GearItem};
pub use hazards::{Fluid, Spike, FLUID_DAMAGE_INTERVAL};
pub use pickups::{Coin, GearPickup, Potion, WeaponPickup};

pub struct ItemsPlugin;

impl Plugin for ItemsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                (
                    pickups::collect_pickups,
                    hazards::spike_contacts,
                    hazards::fluid_transitions,
                )
                    .chain()
                    .after(detect_trigger_transitions)
                    .in_set(SimulationSet::Contacts),
                (gear::tick_gear_timers, hazards::fluid_damage_over_time).in_set(SimulationSet::Combat),
            ),
        );
    }
}
