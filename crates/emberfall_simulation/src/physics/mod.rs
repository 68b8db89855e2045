//! 2D кинематическая физика
//!
//! Без физ. движка: AABB коллайдеры, гравитация, resolve по осям против
//! `Solid`, overlap/raycast запросы, trigger enter/exit.
//!
//! Все системы в FixedUpdate (60Hz):
//! - `SimulationSet::Physics`: gravity → integrate → ground check
//! - `SimulationSet::Contacts`: trigger transitions

use bevy::prelude::*;

use crate::SimulationSet;

pub mod body;
pub mod controller;
pub mod geometry;
pub mod spatial;

pub use body::{
    apply_gravity_and_drag, detect_trigger_transitions, integrate_bodies, BodyContacts, CollisionStarted,
    TriggerEntered, TriggerExited, GRAVITY,
};
pub use controller::{CharacterController, CrouchChanged, Landed, MoveReport, CEILING_RADIUS, GROUNDED_RADIUS};
pub use geometry::{move_and_collide, move_towards, raycast_aabb, smooth_damp, MoveResult};
pub use spatial::{dedup_adjacent, OverlapHit, RayHit, SolidQuery, SpatialQuery};

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CollisionStarted>()
            .add_event::<TriggerEntered>()
            .add_event::<TriggerExited>()
            .add_event::<Landed>()
            .add_event::<CrouchChanged>()
            .add_systems(
                FixedUpdate,
                (
                    apply_gravity_and_drag,
                    integrate_bodies,
                    controller::update_ground_contacts,
                )
                    .chain()
                    .in_set(SimulationSet::Physics),
            )
            .add_systems(
                FixedUpdate,
                detect_trigger_transitions.in_set(SimulationSet::Contacts),
            );
    }
}
