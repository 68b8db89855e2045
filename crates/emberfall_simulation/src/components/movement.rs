//! Movement компоненты: PhysicsBody, Facing, сохранённые параметры тела

use bevy::prelude::*;

/// Кинематическое 2D тело
///
/// Velocity интегрируется в `physics::body` (FixedUpdate). Коллизии только
/// против `Solid` коллайдеров, resolve по осям.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(crate::physics::BodyContacts)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    /// Множитель гравитации (0 = невесомость, снаряды)
    pub gravity_scale: f32,
    /// Линейное затухание скорости (1/сек)
    pub linear_drag: f32,
    pub mass: f32,
    /// На земле после последнего resolve (контакт снизу)
    pub on_ground: bool,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 3.0,
            linear_drag: 0.0,
            mass: 1.0,
            on_ground: false,
        }
    }
}

impl PhysicsBody {
    pub fn params(&self) -> BodyParams {
        BodyParams {
            gravity_scale: self.gravity_scale,
            linear_drag: self.linear_drag,
            mass: self.mass,
        }
    }

    pub fn apply_params(&mut self, params: BodyParams) {
        self.gravity_scale = params.gravity_scale;
        self.linear_drag = params.linear_drag;
        self.mass = params.mass;
    }
}

/// Снимок параметров тела (gear/fluid восстанавливают из него)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct BodyParams {
    pub gravity_scale: f32,
    pub linear_drag: f32,
    pub mass: f32,
}

/// Исходные параметры тела и скоростей, записанные при спавне
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct OriginalParams {
    pub body: BodyParams,
    pub walk_speed: f32,
    pub run_speed: f32,
}

/// Направление взгляда
///
/// Все локальные точки (attack point, shooting point, fire point) заданы
/// для взгляда вправо и зеркалятся через `world_point`. Flip одновременно
/// зеркалит `Transform.scale.x`, поэтому визуал и hit-box всегда симметричны.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Facing {
    pub right: bool,
}

impl Default for Facing {
    fn default() -> Self {
        Self { right: true }
    }
}

impl Facing {
    pub fn sign(&self) -> f32 {
        if self.right {
            1.0
        } else {
            -1.0
        }
    }

    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.sign(), 0.0)
    }

    /// Локальная точка (для взгляда вправо) → мировая
    pub fn world_point(&self, origin: Vec2, local_offset: Vec2) -> Vec2 {
        origin + Vec2::new(local_offset.x * self.sign(), local_offset.y)
    }

    /// Находится ли `point` перед `origin` по направлению взгляда
    pub fn is_in_front(&self, origin: Vec2, point: Vec2) -> bool {
        let dx = point.x - origin.x;
        (self.right && dx > 0.0) || (!self.right && dx < 0.0)
    }

    pub fn flip(&mut self, transform: &mut Transform) {
        self.right = !self.right;
        transform.scale.x = transform.scale.x.abs() * self.sign();
    }

    /// Flip только если движение направлено против взгляда
    pub fn face_towards(&mut self, transform: &mut Transform, horizontal: f32) -> bool {
        if (horizontal > 0.0 && !self.right) || (horizontal < 0.0 && self.right) {
            self.flip(transform);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_mirrors_scale_and_points() {
        let mut facing = Facing::default();
        let mut transform = Transform::default();
        let attack_offset = Vec2::new(0.8, 0.2);

        let right_point = facing.world_point(Vec2::ZERO, attack_offset);
        assert_eq!(right_point, Vec2::new(0.8, 0.2));
        assert!(transform.scale.x > 0.0);

        facing.flip(&mut transform);
        let left_point = facing.world_point(Vec2::ZERO, attack_offset);
        assert_eq!(left_point, Vec2::new(-0.8, 0.2));
        assert!(transform.scale.x < 0.0);

        // Симметрия: hit-box зеркален относительно центра
        assert_eq!(left_point.x, -right_point.x);
    }

    #[test]
    fn test_face_towards_only_flips_when_needed() {
        let mut facing = Facing::default();
        let mut transform = Transform::default();

        assert!(!facing.face_towards(&mut transform, 1.0));
        assert!(!facing.face_towards(&mut transform, 0.0));
        assert!(facing.face_towards(&mut transform, -1.0));
        assert!(!facing.right);
        assert!(!facing.face_towards(&mut transform, -0.5));
    }

    #[test]
    fn test_is_in_front() {
        let facing = Facing { right: false };
        assert!(facing.is_in_front(Vec2::ZERO, Vec2::new(-2.0, 5.0)));
        assert!(!facing.is_in_front(Vec2::ZERO, Vec2::new(2.0, 0.0)));
        assert!(!facing.is_in_front(Vec2::ZERO, Vec2::new(0.0, 1.0)));
    }
}
