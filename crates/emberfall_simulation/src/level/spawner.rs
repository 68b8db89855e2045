//! EnemySpawner — N врагов со случайным смещением по x
//!
//! Смещения берутся из `DeterministicRng`, поэтому один seed даёт одну
//! и ту же расстановку.

use bevy::prelude::*;
use rand::Rng;

use super::spawn::spawn_enemy;
use crate::config::EnemySpawn;
use crate::DeterministicRng;

#[derive(Component, Debug, Clone)]
pub struct EnemySpawner {
    pub count: u32,
    pub radius: f32,
    pub template: EnemySpawn,
    pub spawned: bool,
}

/// Смещения по x в [-radius, radius)
pub fn spawn_offsets(rng: &mut impl Rng, count: u32, radius: f32) -> Vec<f32> {
    (0..count)
        .map(|_| if radius > 0.0 { rng.gen_range(-radius..radius) } else { 0.0 })
        .collect()
}

/// Система: одноразовый спавн для каждого спавнера
pub fn run_enemy_spawners(
    mut commands: Commands,
    mut spawners: Query<(&Transform, &mut EnemySpawner)>,
    mut rng: ResMut<DeterministicRng>,
) {
    for (transform, mut spawner) in spawners.iter_mut() {
        if spawner.spawned {
            continue;
        }
        spawner.spawned = true;

        let origin = transform.translation.truncate();
        for offset in spawn_offsets(&mut rng.rng, spawner.count, spawner.radius) {
            let spawn = EnemySpawn {
                position: origin + Vec2::new(offset, 0.0),
                ..spawner.template.clone()
            };
            spawn_enemy(&mut commands, &spawn);
        }
        crate::logger::log_info(&format!(
            "👾 Spawner at {:?}: {} enemies within ±{:.1}",
            origin, spawner.count, spawner.radius
        ));
    }
}
