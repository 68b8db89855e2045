//! PlayerInput — абстрактные клавиши, которые хост нажимает/отпускает
//!
//! Хост (бинарник, тест, встраивающая игра) вызывает `press`/`release`,
//! система `handle_player_input` (Update) разбирает фронты раз в кадр.

use bevy::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    Left,
    Right,
    Jump,
    Crouch,
    Attack,
    Restart,
}

/// Фронт клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEdge {
    pub key: InputKey,
    pub pressed: bool,
}

#[derive(Component, Debug, Clone, Default)]
pub struct PlayerInput {
    held: HashSet<InputKey>,
    edges: Vec<KeyEdge>,
}

impl PlayerInput {
    pub fn press(&mut self, key: InputKey) {
        if self.held.insert(key) {
            self.edges.push(KeyEdge { key, pressed: true });
        }
    }

    pub fn release(&mut self, key: InputKey) {
        if self.held.remove(&key) {
            self.edges.push(KeyEdge { key, pressed: false });
        }
    }

    /// Нажать и сразу отпустить (оба фронта в одном кадре)
    pub fn tap(&mut self, key: InputKey) {
        self.press(key);
        self.release(key);
    }

    pub fn is_held(&self, key: InputKey) -> bool {
        self.held.contains(&key)
    }

    /// Горизонтальная ось: -1, 0, 1
    pub fn axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_held(InputKey::Right) {
            axis += 1.0;
        }
        if self.is_held(InputKey::Left) {
            axis -= 1.0;
        }
        axis
    }

    pub fn drain_edges(&mut self) -> Vec<KeyEdge> {
        std::mem::take(&mut self.edges)
    }

    /// Сброс (смерть, respawn): отпускает всё без фронтов
    pub fn clear(&mut self) {
        self.held.clear();
        self.edges.clear();
    }
}
