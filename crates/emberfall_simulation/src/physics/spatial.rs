//! Spatial queries: overlap circle, raycast, nearest
//!
//! Два SystemParam:
//! - `SpatialQuery` — все включённые коллайдеры (hit-box атак, триггеры, target search)
//! - `SolidQuery` — только `Solid` (ground/ceiling/front checks). Не конфликтует
//!   с `&mut Transform` на телах, если их query помечен `Without<Solid>`.
//!
//! Порядок результатов = порядок итерации query (стабилен между прогонами
//! при одинаковом порядке spawn).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::geometry::raycast_aabb;
use crate::components::{Aabb, Collider2D, ColliderOwner, LayerMask, Solid};

/// Найденный overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapHit {
    /// Entity коллайдера
    pub collider: Entity,
    /// Владелец (ColliderOwner или сам коллайдер)
    pub owner: Entity,
    /// Центр коллайдера в мире
    pub position: Vec2,
}

/// Попадание луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
}

#[derive(SystemParam)]
pub struct SpatialQuery<'w, 's> {
    colliders: Query<
        'w,
        's,
        (
            Entity,
            &'static Transform,
            &'static Collider2D,
            Option<&'static ColliderOwner>,
        ),
    >,
}

impl SpatialQuery<'_, '_> {
    fn candidates(&self, mask: LayerMask, exclude: Option<Entity>) -> Vec<(OverlapHit, Aabb)> {
        self.colliders
            .iter()
            .filter(move |(entity, _, collider, owner)| {
                collider.enabled
                    && mask.contains(collider.layer)
                    && exclude.is_none_or(|excluded| *entity != excluded && owner.map(|o| o.0) != Some(excluded))
            })
            .map(|(entity, transform, collider, owner)| {
                let aabb = collider.aabb(transform.translation.truncate());
                let hit = OverlapHit {
                    collider: entity,
                    owner: owner.map_or(entity, |o| o.0),
                    position: aabb.center,
                };
                (hit, aabb)
            })
            .collect()
    }

    /// Все коллайдеры на `mask`, пересекающие круг
    ///
    /// `exclude` убирает и сам entity, и все его hurt-box'ы.
    pub fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask, exclude: Option<Entity>) -> Vec<OverlapHit> {
        self.candidates(mask, exclude)
            .into_iter()
            .filter(|(_, aabb)| aabb.intersects_circle(center, radius))
            .map(|(hit, _)| hit)
            .collect()
    }

    pub fn overlap_aabb(&self, area: &Aabb, mask: LayerMask, exclude: Option<Entity>) -> Vec<OverlapHit> {
        self.candidates(mask, exclude)
            .into_iter()
            .filter(|(_, aabb)| aabb.overlaps(area))
            .map(|(hit, _)| hit)
            .collect()
    }

    /// Ближайший коллайдер на `mask` (без ограничения дистанции)
    pub fn nearest(&self, point: Vec2, mask: LayerMask, exclude: Option<Entity>) -> Option<OverlapHit> {
        self.candidates(mask, exclude)
            .into_iter()
            .map(|(hit, _)| hit)
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
            })
    }

    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask, exclude: Option<Entity>) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        self.candidates(mask, exclude)
            .into_iter()
            .filter_map(|(hit, aabb)| {
                raycast_aabb(origin, direction, max_distance, &aabb).map(|distance| RayHit {
                    entity: hit.owner,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[derive(SystemParam)]
pub struct SolidQuery<'w, 's> {
    solids: Query<'w, 's, (Entity, &'static Transform, &'static Collider2D), With<Solid>>,
}

impl SolidQuery<'_, '_> {
    /// Снимок включённых solids (для resolve тел)
    pub fn snapshot(&self) -> Vec<(Entity, Aabb)> {
        self.solids
            .iter()
            .filter(|(_, _, collider)| collider.enabled)
            .map(|(entity, transform, collider)| (entity, collider.aabb(transform.translation.truncate())))
            .collect()
    }

    /// Есть ли solid в круге (ground/ceiling check)
    pub fn any_in_circle(&self, center: Vec2, radius: f32, exclude: Option<Entity>) -> bool {
        self.solids.iter().any(|(entity, transform, collider)| {
            collider.enabled
                && Some(entity) != exclude
                && collider
                    .aabb(transform.translation.truncate())
                    .intersects_circle(center, radius)
        })
    }

    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        self.solids
            .iter()
            .filter(|(_, _, collider)| collider.enabled)
            .filter_map(|(entity, transform, collider)| {
                let aabb = collider.aabb(transform.translation.truncate());
                raycast_aabb(origin, direction, max_distance, &aabb).map(|distance| RayHit { entity, distance })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Adjacency dedup: убирает entity, совпадающий с непосредственно предыдущим
///
/// Несоседние дубликаты остаются (A, A, B, A → A, B, A).
pub fn dedup_adjacent(owners: impl IntoIterator<Item = Entity>) -> Vec<Entity> {
    let mut result: Vec<Entity> = Vec::new();
    let mut last: Option<Entity> = None;
    for owner in owners {
        if last != Some(owner) {
            result.push(owner);
        }
        last = Some(owner);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CollisionLayer;

    #[test]
    fn test_dedup_adjacent_only() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        assert_eq!(dedup_adjacent([a, a, a]), vec![a]);
        assert_eq!(dedup_adjacent([a, a, b, a]), vec![a, b, a]);
        assert!(dedup_adjacent([]).is_empty());
    }

    #[derive(Resource, Default)]
    struct Found(Vec<OverlapHit>, Option<RayHit>);

    fn probe(spatial: SpatialQuery, mut found: ResMut<Found>) {
        found.0 = spatial.overlap_circle(Vec2::ZERO, 1.0, LayerMask::ENEMY, None);
        found.1 = spatial.raycast(Vec2::new(-5.0, 0.0), Vec2::X, 10.0, LayerMask::ENEMY, None);
    }

    #[test]
    fn test_overlap_resolves_owner_and_skips_disabled() {
        let mut app = App::new();
        app.init_resource::<Found>().add_systems(Update, probe);

        let owner = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.5, 0.0, 0.0),
                Collider2D::new(Vec2::splat(0.3), CollisionLayer::Enemy),
            ))
            .id();
        app.world_mut().spawn((
            Transform::from_xyz(0.8, 0.0, 0.0),
            Collider2D::new(Vec2::splat(0.2), CollisionLayer::Enemy),
            ColliderOwner(owner),
        ));
        let mut disabled = Collider2D::new(Vec2::splat(0.3), CollisionLayer::Enemy);
        disabled.enabled = false;
        app.world_mut().spawn((Transform::from_xyz(0.0, 0.5, 0.0), disabled));
        // Не тот слой
        app.world_mut().spawn((
            Transform::from_xyz(0.0, 0.0, 0.0),
            Collider2D::new(Vec2::splat(0.3), CollisionLayer::Ground),
        ));

        app.update();

        let found = app.world().resource::<Found>();
        assert_eq!(found.0.len(), 2);
        assert!(found.0.iter().all(|hit| hit.owner == owner));
        let ray = found.1.expect("ray must hit enemy");
        assert_eq!(ray.entity, owner);
        assert!((ray.distance - 5.2).abs() < 1e-4);
    }
}
