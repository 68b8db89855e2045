//! AttackController — melee hit-box и attack window

use bevy::prelude::*;

use super::damage::{DamageIntent, Dead};
use crate::components::{Facing, LayerMask};
use crate::physics::{dedup_adjacent, SpatialQuery};

/// Базовая длительность замаха при attack speed = 1.0
pub const BASE_SWING_DURATION: f32 = 0.4;

/// Активное окно атаки
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AttackWindow {
    pub elapsed: f32,
    pub duration: f32,
    /// Момент автоматического удара (слайм); None — удар делает владелец
    pub strike_at: Option<f32>,
}

/// Melee атака: hit-box круг в attack point
///
/// Инвариант: не больше одного активного окна (`window.is_some() == is_attacking`).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AttackController {
    pub damage: i32,
    /// Множитель скорости анимации (длительность окна = base / speed)
    pub speed: f32,
    /// Радиус hit-box
    pub range: f32,
    /// Локальная точка удара (для взгляда вправо)
    pub attack_point: Vec2,
    pub enemy_mask: LayerMask,
    pub is_attacking: bool,
    pub window: Option<AttackWindow>,
}

impl Default for AttackController {
    fn default() -> Self {
        Self {
            damage: 10,
            speed: 1.0,
            range: 1.0,
            attack_point: Vec2::new(0.8, 0.0),
            enemy_mask: LayerMask::ENEMY,
            is_attacking: false,
            window: None,
        }
    }
}

impl AttackController {
    pub fn window_duration(&self) -> f32 {
        BASE_SWING_DURATION / self.speed.max(0.01)
    }

    /// Открыть окно атаки. false — уже атакуем (второе окно не открывается).
    pub fn begin(&mut self, auto_strike: bool) -> bool {
        if self.is_attacking {
            return false;
        }
        let duration = self.window_duration();
        self.window = Some(AttackWindow {
            elapsed: 0.0,
            duration,
            strike_at: auto_strike.then_some(duration * 0.5),
        });
        self.is_attacking = true;
        true
    }

    pub fn stop(&mut self) {
        self.is_attacking = false;
        self.window = None;
    }

    /// Тик окна. Возвращает true на тике автоматического удара.
    pub fn tick(&mut self, delta: f32) -> bool {
        let Some(window) = self.window.as_mut() else {
            return false;
        };
        let before = window.elapsed;
        window.elapsed += delta;
        let strike = window
            .strike_at
            .is_some_and(|at| before < at && window.elapsed >= at);
        if window.elapsed >= window.duration {
            self.stop();
        }
        strike
    }

    pub fn hit_point(&self, origin: Vec2, facing: &Facing) -> Vec2 {
        facing.world_point(origin, self.attack_point)
    }

    /// Цели удара: все owners в hit-box с adjacency dedup
    pub fn resolve_targets(&self, attacker: Entity, origin: Vec2, facing: &Facing, spatial: &SpatialQuery) -> Vec<Entity> {
        let hits = spatial.overlap_circle(self.hit_point(origin, facing), self.range, self.enemy_mask, Some(attacker));
        dedup_adjacent(hits.into_iter().map(|hit| hit.owner))
    }

    /// Удар: DamageIntent на каждую цель
    pub fn hit(
        &self,
        attacker: Entity,
        origin: Vec2,
        facing: &Facing,
        spatial: &SpatialQuery,
        damage: &mut EventWriter<DamageIntent>,
    ) -> usize {
        let targets = self.resolve_targets(attacker, origin, facing, spatial);
        for target in &targets {
            damage.write(DamageIntent {
                target: *target,
                amount: self.damage,
                source: Some(attacker),
            });
        }
        targets.len()
    }
}

/// Система: тик окон атак, автоматический удар
pub fn tick_attack_windows(
    time: Res<Time<Fixed>>,
    mut attackers: Query<(Entity, &Transform, &Facing, &mut AttackController), Without<Dead>>,
    spatial: SpatialQuery,
    mut damage: EventWriter<DamageIntent>,
) {
    let delta = time.delta_secs();
    for (entity, transform, facing, mut attack) in attackers.iter_mut() {
        if attack.tick(delta) {
            let hits = attack.hit(entity, transform.translation.truncate(), facing, &spatial, &mut damage);
            crate::logger::log(&format!("🗡️ {:?} auto strike: {} target(s)", entity, hits));
        }
    }
}
