//! Animation parameters — поверхность для внешнего рендера
//!
//! Симуляция не проигрывает анимации. Она только выставляет именованные
//! параметры (как в animator state machine) и последний запрошенный state.
//! Имена стабильны: рендер/клиент завязан на них.

use bevy::prelude::*;
use std::collections::HashMap;

pub const SPEED: &str = "Speed";
pub const IS_ATTACKING: &str = "IsAttacking";
pub const ATTACK_SPEED: &str = "AttackSpeed";
pub const IS_CROUCHING: &str = "IsCrouching";
pub const IS_HURTING: &str = "IsHurting";
pub const IS_DEAD: &str = "IsDead";
pub const JUMPS: &str = "Jumps";
pub const IS_WALKING: &str = "IsWalking";
pub const CLIMB_SPEED: &str = "ClimbSpeed";

pub const STATE_JUMP: &str = "Jump";
pub const STATE_HURT: &str = "Hurt";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimParam {
    Bool(bool),
    Float(f32),
    Int(i32),
}

#[derive(Component, Debug, Clone, Default)]
pub struct AnimatorParams {
    params: HashMap<&'static str, AnimParam>,
    /// Последний state, запрошенный через `play` (рендер сбрасывает сам)
    pub last_played: Option<&'static str>,
}

impl AnimatorParams {
    pub fn set_bool(&mut self, name: &'static str, value: bool) {
        self.params.insert(name, AnimParam::Bool(value));
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.params.insert(name, AnimParam::Float(value));
    }

    pub fn set_int(&mut self, name: &'static str, value: i32) {
        self.params.insert(name, AnimParam::Int(value));
    }

    pub fn play(&mut self, state: &'static str) {
        self.last_played = Some(state);
    }

    pub fn get(&self, name: &str) -> Option<AnimParam> {
        self.params.get(name).copied()
    }

    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.get(name), Some(AnimParam::Bool(true)))
    }

    pub fn get_float(&self, name: &str) -> f32 {
        match self.get(name) {
            Some(AnimParam::Float(value)) => value,
            _ => 0.0,
        }
    }

    pub fn get_int(&self, name: &str) -> i32 {
        match self.get(name) {
            Some(AnimParam::Int(value)) => value,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_round_trip_by_name() {
        let mut params = AnimatorParams::default();
        params.set_bool(IS_CROUCHING, true);
        params.set_int(JUMPS, 2);
        params.set_float(SPEED, 4.0);

        assert!(params.get_bool(IS_CROUCHING));
        assert_eq!(params.get_int(JUMPS), 2);
        assert_eq!(params.get_float(SPEED), 4.0);
        assert!(!params.get_bool(IS_DEAD)); // Не выставлен → false
    }

    #[test]
    fn test_type_mismatch_reads_default() {
        let mut params = AnimatorParams::default();
        params.set_bool(SPEED, true);
        assert_eq!(params.get_float(SPEED), 0.0);
    }
}
