//! World компоненты: коллайдеры, слои, триггеры, принадлежность уровню

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Слой коллизий (один на коллайдер)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum CollisionLayer {
    Ground,
    Player,
    Enemy,
    Pickup,
    Hazard,
    Projectile,
}

impl CollisionLayer {
    pub fn bit(self) -> u32 {
        match self {
            CollisionLayer::Ground => 1 << 0,
            CollisionLayer::Player => 1 << 1,
            CollisionLayer::Enemy => 1 << 2,
            CollisionLayer::Pickup => 1 << 3,
            CollisionLayer::Hazard => 1 << 4,
            CollisionLayer::Projectile => 1 << 5,
        }
    }
}

/// Маска слоёв (аналог layer mask в физ. движках)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const GROUND: LayerMask = LayerMask(1 << 0);
    pub const PLAYER: LayerMask = LayerMask(1 << 1);
    pub const ENEMY: LayerMask = LayerMask(1 << 2);

    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        Self(layers.iter().fold(0, |acc, layer| acc | layer.bit()))
    }

    pub fn contains(&self, layer: CollisionLayer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn with(self, layer: CollisionLayer) -> Self {
        Self(self.0 | layer.bit())
    }
}

/// Осевой прямоугольник (AABB) в мировых координатах
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        delta.x < reach.x && delta.y < reach.y
    }

    /// Ближайшая точка AABB к `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }

    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        self.closest_point(center).distance_squared(center) <= radius * radius
    }
}

/// 2D коллайдер (box)
///
/// `offset` — смещение центра относительно Transform, `enabled == false`
/// исключает коллайдер из всех запросов (мёртвые акторы).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Collider2D {
    pub half_extents: Vec2,
    pub offset: Vec2,
    pub layer: CollisionLayer,
    pub enabled: bool,
}

impl Collider2D {
    pub fn new(half_extents: Vec2, layer: CollisionLayer) -> Self {
        Self {
            half_extents,
            offset: Vec2::ZERO,
            layer,
            enabled: true,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn aabb(&self, position: Vec2) -> Aabb {
        Aabb::new(position + self.offset, self.half_extents)
    }
}

/// Коллайдер-хертбокс, который принадлежит другому entity (владельцу Health)
///
/// Один актор может иметь несколько коллайдеров — все они резолвятся в owner.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ColliderOwner(pub Entity);

/// Маркер: коллайдер блокирует тела (пол, стены, платформы)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Solid;

/// Trigger коллайдер: только overlap, генерирует enter/exit события
///
/// `occupants` — кто сейчас внутри (для детекции переходов).
#[derive(Component, Debug, Clone, Default)]
pub struct Trigger2D {
    /// Какие слои триггер замечает
    pub detects: LayerMask,
    pub occupants: Vec<Entity>,
}

impl Trigger2D {
    pub fn detecting(detects: LayerMask) -> Self {
        Self {
            detects,
            occupants: Vec::new(),
        }
    }
}

/// Маркер: entity принадлежит загруженному уровню (удаляется при reload)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct LevelEntity;
