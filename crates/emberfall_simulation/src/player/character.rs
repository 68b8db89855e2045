//! PlayerCharacter — состояние персонажа игрока (без ECS)
//!
//! Run по double-tap, stamina, счётчик прыжков, crouch. Время передаётся
//! снаружи (`now` = elapsed секунды), поэтому всё тестируется напрямую.

use bevy::prelude::*;

/// Окно double-tap для включения бега (сек)
pub const DOUBLE_KEY_PRESS_DELAY: f32 = 0.25;

/// Результат нажатия прыжка
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpAction {
    /// Лимит прыжков исчерпан
    None,
    /// Первый прыжок — делает controller с земли
    Grounded,
    /// Дополнительный прыжок — импульс в воздухе
    Air,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PlayerCharacter {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Сколько секунд можно бежать без перерыва
    pub stamina_time: f32,
    pub double_jump: bool,

    pub jumps: u32,
    /// Скорость по горизонтали, которую хочет input (знак = направление)
    pub horizontal_move: f32,
    pub is_jumping: bool,
    pub is_crouching: bool,
    pub is_running: bool,
    /// Атака запрошена на frame tick, выполняется на fixed tick
    pub pending_attack: bool,
    /// Последнее состояние "двигается" (для walk/idle sound cue)
    pub was_moving: bool,

    last_run_key_press_time: f32,
    pressed_run_first_time: bool,
    stamina_running_started: f32,
}

impl Default for PlayerCharacter {
    fn default() -> Self {
        Self::new(2.0, 4.0)
    }
}

impl PlayerCharacter {
    pub fn new(walk_speed: f32, run_speed: f32) -> Self {
        Self {
            walk_speed,
            run_speed,
            stamina_time: 100.0,
            double_jump: true,
            jumps: 0,
            horizontal_move: 0.0,
            is_jumping: false,
            is_crouching: false,
            is_running: false,
            pending_attack: false,
            was_moving: false,
            last_run_key_press_time: 0.0,
            pressed_run_first_time: false,
            stamina_running_started: 0.0,
        }
    }

    /// Выносливость бега и double jump из конфига уровня
    pub fn with_tuning(mut self, stamina_time: f32, double_jump: bool) -> Self {
        self.stamina_time = stamina_time;
        self.double_jump = double_jump;
        self
    }

    pub fn max_jumps(&self) -> u32 {
        if self.double_jump {
            2
        } else {
            1
        }
    }

    /// Нажата горизонтальная клавиша (left/right)
    ///
    /// Второе нажатие в пределах DOUBLE_KEY_PRESS_DELAY включает бег.
    pub fn on_horizontal_key_down(&mut self, now: f32) {
        if self.pressed_run_first_time {
            if now - self.last_run_key_press_time <= DOUBLE_KEY_PRESS_DELAY {
                self.pressed_run_first_time = false;
                if !self.is_running {
                    self.is_running = true;
                    self.stamina_running_started = now;
                }
            }
        } else {
            self.pressed_run_first_time = true;
        }
        self.last_run_key_press_time = now;
    }

    /// Отпущена горизонтальная клавиша — бег прерывается
    pub fn on_horizontal_key_up(&mut self) {
        self.is_running = false;
    }

    /// Истечение окна double-tap и stamina (каждый frame tick)
    pub fn update_run_state(&mut self, now: f32) {
        if self.pressed_run_first_time && now - self.last_run_key_press_time > DOUBLE_KEY_PRESS_DELAY {
            self.pressed_run_first_time = false;
        }
        if self.is_running && now - self.stamina_running_started > self.stamina_time {
            self.is_running = false;
        }
    }

    pub fn current_speed(&self) -> f32 {
        if self.is_running {
            self.run_speed
        } else {
            self.walk_speed
        }
    }

    /// Нажатие прыжка
    ///
    /// Инвариант: `jumps <= max_jumps()`.
    pub fn jump(&mut self) -> JumpAction {
        self.is_jumping = true;
        if self.jumps >= self.max_jumps() {
            return JumpAction::None;
        }
        self.jumps += 1;
        if self.jumps > 1 {
            JumpAction::Air
        } else {
            JumpAction::Grounded
        }
    }

    /// Приземление: счётчик прыжков в 0
    pub fn land(&mut self) {
        self.jumps = 0;
        self.is_jumping = false;
    }

    /// Полный сброс (respawn)
    pub fn reset(&mut self) {
        *self = Self {
            stamina_time: self.stamina_time,
            double_jump: self.double_jump,
            ..Self::new(self.walk_speed, self.run_speed)
        };
    }
}
