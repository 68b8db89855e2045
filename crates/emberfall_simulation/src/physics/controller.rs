//! CharacterController: ground/ceiling detection, crouch, jump, сглаживание
//!
//! Controller не знает про input. Он получает "намерение" (target speed,
//! crouch, jump) от владельца (`player::systems::drive_player_movement`)
//! и применяет его к PhysicsBody + Collider2D.

use bevy::prelude::*;

use super::geometry::smooth_damp;
use super::spatial::SolidQuery;
use crate::components::{Collider2D, Facing, PhysicsBody};

/// Радиус overlap круга для ground check
pub const GROUNDED_RADIUS: f32 = 0.2;
/// Радиус overlap круга для ceiling check
pub const CEILING_RADIUS: f32 = 0.2;

/// Event: персонаж приземлился (grounded false → true)
#[derive(Event, Debug, Clone)]
pub struct Landed {
    pub entity: Entity,
}

/// Event: crouch state изменился
#[derive(Event, Debug, Clone)]
pub struct CrouchChanged {
    pub entity: Entity,
    pub crouching: bool,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CharacterController {
    /// Вертикальный импульс прыжка (Δvelocity.y)
    pub jump_impulse: f32,
    /// Множитель скорости в приседе (0..1)
    pub crouch_speed: f32,
    /// Время сглаживания горизонтальной скорости (сек)
    pub movement_smoothing: f32,
    /// Управление в воздухе
    pub air_control: bool,
    pub ground_check_offset: Vec2,
    pub ceiling_check_offset: Vec2,
    /// Ground check пропускается N секунд после прыжка
    pub ground_check_delay: f32,
    pub standing_half_extents: Vec2,
    pub crouching_half_extents: Vec2,

    // === Runtime state ===
    pub grounded: bool,
    pub time_before_ground_check: f32,
    pub was_crouching: bool,
    /// Состояние smooth damp пружины
    pub smoothing_velocity: f32,
    /// Air jump, запрошенный на frame tick, применяется на следующем fixed tick
    pub pending_air_jump: bool,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self {
            jump_impulse: 8.0,
            crouch_speed: 0.36,
            movement_smoothing: 0.05,
            air_control: false,
            ground_check_offset: Vec2::new(0.0, -0.5),
            ceiling_check_offset: Vec2::new(0.0, 0.5),
            ground_check_delay: 0.25,
            standing_half_extents: Vec2::new(0.3, 0.5),
            crouching_half_extents: Vec2::new(0.3, 0.3),
            grounded: false,
            time_before_ground_check: 0.0,
            was_crouching: false,
            smoothing_velocity: 0.0,
            pending_air_jump: false,
        }
    }
}

/// Что произошло при `apply_move`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// Some(new_state) если crouch переключился
    pub crouch_changed: Option<bool>,
    pub jumped: bool,
}

impl CharacterController {
    /// Применить намерение движения
    ///
    /// `ceiling_blocked` — есть solid над головой (crouch форсится).
    /// Горизонталь меняется только на земле или при `air_control`.
    pub fn apply_move(
        &mut self,
        body: &mut PhysicsBody,
        collider: &mut Collider2D,
        target_speed: f32,
        crouch: bool,
        jump: bool,
        ceiling_blocked: bool,
        delta: f32,
    ) -> MoveReport {
        let mut report = MoveReport::default();
        let crouch = crouch || ceiling_blocked;
        let mut speed = target_speed;

        if self.grounded || self.air_control {
            if crouch {
                if !self.was_crouching {
                    self.was_crouching = true;
                    report.crouch_changed = Some(true);
                }
                speed *= self.crouch_speed;
                self.set_shape(collider, self.crouching_half_extents);
            } else {
                self.set_shape(collider, self.standing_half_extents);
                if self.was_crouching {
                    self.was_crouching = false;
                    report.crouch_changed = Some(false);
                }
            }

            body.velocity.x = smooth_damp(
                body.velocity.x,
                speed,
                &mut self.smoothing_velocity,
                self.movement_smoothing,
                delta,
            );
        }

        if self.grounded && jump {
            self.jump(body);
            report.jumped = true;
        }

        if self.pending_air_jump {
            self.pending_air_jump = false;
            self.jump(body);
            report.jumped = true;
        }

        report
    }

    /// Вертикальный импульс (прибавляется к текущей скорости)
    pub fn jump(&mut self, body: &mut PhysicsBody) {
        self.grounded = false;
        body.velocity.y += self.jump_impulse;
        self.time_before_ground_check = self.ground_check_delay;
    }

    /// Ground check. Возвращает true при приземлении.
    ///
    /// Пока после прыжка не прошла задержка, проверка пропускается
    /// целиком (grounded остаётся false).
    pub fn update_ground(&mut self, ground_found: bool, delta: f32) -> bool {
        if self.time_before_ground_check > 0.0 {
            self.time_before_ground_check -= delta;
            return false;
        }
        let was_grounded = self.grounded;
        self.grounded = ground_found;
        ground_found && !was_grounded
    }

    /// Collider shape с сохранением нижней грани (ноги на месте)
    fn set_shape(&self, collider: &mut Collider2D, half_extents: Vec2) {
        collider.half_extents = half_extents;
        collider.offset.y = half_extents.y - self.standing_half_extents.y;
    }

    pub fn reset(&mut self) {
        self.grounded = false;
        self.time_before_ground_check = 0.0;
        self.was_crouching = false;
        self.smoothing_velocity = 0.0;
        self.pending_air_jump = false;
    }
}

/// Ground check для всех контроллеров (FixedUpdate, после integrate_bodies)
pub fn update_ground_contacts(
    time: Res<Time<Fixed>>,
    mut controllers: Query<(Entity, &Transform, &Facing, &mut CharacterController)>,
    solids: SolidQuery,
    mut landed: EventWriter<Landed>,
) {
    let delta = time.delta_secs();
    for (entity, transform, facing, mut controller) in controllers.iter_mut() {
        let check_point = facing.world_point(transform.translation.truncate(), controller.ground_check_offset);
        let found = solids.any_in_circle(check_point, GROUNDED_RADIUS, Some(entity));
        if controller.update_ground(found, delta) {
            landed.write(Landed { entity });
        }
    }
}
