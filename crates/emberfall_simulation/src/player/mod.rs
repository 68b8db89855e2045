//! Player: input, состояние персонажа, движение и атака
//!
//! Input приходит на frame tick (Update) и превращается во флаги
//! `PlayerCharacter` / `CharacterController`. Fixed tick (FixedUpdate)
//! читает флаги: движение, прыжок, атака.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod character;
pub mod input;
pub mod systems;

pub use character::{JumpAction, PlayerCharacter, DOUBLE_KEY_PRESS_DELAY};
pub use input::{InputKey, KeyEdge, PlayerInput};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (systems::handle_player_input, systems::sync_player_animation).chain(),
        )
        .add_systems(
            FixedUpdate,
            (
                systems::drive_player_movement.in_set(SimulationSet::Intent),
                systems::reset_jumps_on_landing.in_set(SimulationSet::Contacts),
                systems::perform_player_attacks.in_set(SimulationSet::Combat),
            ),
        );
    }
}
