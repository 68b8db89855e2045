//! Чистая геометрия: smooth damp, raycast, resolve тела против solids
//!
//! Никаких ECS зависимостей, всё тестируется напрямую.

use bevy::prelude::*;

use crate::components::{Aabb, Collider2D};

/// Критически задемпфированная пружина к `target` (аналог SmoothDamp)
///
/// `velocity` — внутреннее состояние пружины, хранится у вызывающего.
/// `smooth_time` ≤ 0 → мгновенный snap к target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, delta: f32) -> f32 {
    if smooth_time <= 0.0 || delta <= 0.0 {
        *velocity = 0.0;
        return target;
    }

    let omega = 2.0 / smooth_time;
    let x = omega * delta;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * exp;

    let mut output = target + (change + temp) * exp;

    // Не перелетаем target
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / delta;
    }

    output
}

/// Сдвиг точки к цели не больше чем на `max_step`
pub fn move_towards(current: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_step || distance <= f32::EPSILON {
        return target;
    }
    current + delta / distance * max_step
}

/// Луч против AABB (slab метод)
///
/// `direction` должен быть нормализован. Возвращает расстояние до входа,
/// 0.0 если origin внутри AABB.
pub fn raycast_aabb(origin: Vec2, direction: Vec2, max_distance: f32, aabb: &Aabb) -> Option<f32> {
    let min = aabb.min();
    let max = aabb.max();
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], direction[axis], min[axis], max[axis]);
        if d.abs() <= f32::EPSILON {
            // Параллельно оси: либо внутри slab, либо промах
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let t1 = (lo - o) / d;
        let t2 = (hi - o) / d;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }

    if t_exit < 0.0 || t_enter > t_exit {
        return None;
    }
    let distance = t_enter.max(0.0);
    (distance <= max_distance).then_some(distance)
}

/// Результат одного шага интеграции тела
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Контакт снизу (стоим на solid)
    pub grounded: bool,
    /// Solid, на котором стоим (для переноса платформой)
    pub ground: Option<Entity>,
    pub hit_ceiling: bool,
    pub hit_wall: bool,
    /// Все solids, которых коснулись за шаг (в порядке resolve)
    pub contacts: Vec<Entity>,
}

/// Сдвиг тела на `velocity * delta` с resolve по осям (сначала X, потом Y)
///
/// Solids не двигаются на этом шаге. Проникновение после resolve — 0:
/// тело ставится ровно на грань solid'а.
pub fn move_and_collide(
    position: Vec2,
    collider: &Collider2D,
    velocity: Vec2,
    delta: f32,
    solids: &[(Entity, Aabb)],
) -> MoveResult {
    let mut result = MoveResult {
        position,
        velocity,
        grounded: false,
        ground: None,
        hit_ceiling: false,
        hit_wall: false,
        contacts: Vec::new(),
    };

    // === X axis ===
    result.position.x += velocity.x * delta;
    if velocity.x != 0.0 {
        for (entity, solid) in solids {
            let body = collider.aabb(result.position);
            if !body.overlaps(solid) {
                continue;
            }
            result.position.x = if velocity.x > 0.0 {
                solid.min().x - collider.half_extents.x - collider.offset.x
            } else {
                solid.max().x + collider.half_extents.x - collider.offset.x
            };
            result.velocity.x = 0.0;
            result.hit_wall = true;
            push_contact(&mut result.contacts, *entity);
        }
    }

    // === Y axis ===
    result.position.y += velocity.y * delta;
    for (entity, solid) in solids {
        let body = collider.aabb(result.position);
        if !body.overlaps(solid) {
            continue;
        }
        if velocity.y <= 0.0 {
            result.position.y = solid.max().y + collider.half_extents.y - collider.offset.y;
            result.grounded = true;
            result.ground = Some(*entity);
        } else {
            result.position.y = solid.min().y - collider.half_extents.y - collider.offset.y;
            result.hit_ceiling = true;
        }
        result.velocity.y = 0.0;
        push_contact(&mut result.contacts, *entity);
    }

    result
}

fn push_contact(contacts: &mut Vec<Entity>, entity: Entity) {
    if !contacts.contains(&entity) {
        contacts.push(entity);
    }
}
