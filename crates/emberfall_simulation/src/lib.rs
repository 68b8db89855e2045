//! Emberfall Simulation Core
//!
//! Headless 2D platformer на Bevy 0.16: движение и бой игрока, AI врагов,
//! снаряды, pickups, тайлы уровня. Без рендера, аудио и устройств ввода:
//! хост владеет циклом и вызывает `App::update()`.
//!
//! Расписания:
//! - `Update` (frame tick) — input фронты, animation parameters
//! - `FixedUpdate` (60Hz) — всё остальное, по фазам `SimulationSet`

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod items;
pub mod level;
pub mod logger;
pub mod physics;
pub mod player;

// Re-export базовых компонентов для удобства
pub use ai::{AIPlugin, EnemyConfig, EnemyState, Slime, Turret};
pub use combat::{
    AttackController, CombatPlugin, DamageDealt, DamageIntent, Dead, EntityDied, HealIntent, HealthChanged, Projectile,
    PropulsionType, WeaponController, WeaponDefinition,
};
pub use components::*;
pub use config::{ConfigError, LevelConfig};
pub use items::ItemsPlugin;
pub use level::{ActiveLevel, LevelManager, LevelPlugin, LevelReloadRequested, PlaySound, SoundCue, SoundKind};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::PhysicsPlugin;
pub use player::{InputKey, PlayerCharacter, PlayerInput, PlayerPlugin};

/// Частота fixed tick
pub const FIXED_HZ: f64 = 60.0;

/// Фазы fixed tick (в этом порядке)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Намерения: движение игрока, AI решения
    Intent,
    /// Гравитация, интеграция тел, платформы, снаряды
    Physics,
    /// Ground check результаты, триггеры, попадания, pickups
    Contacts,
    /// Окна атак, таймеры оружия/gear, урон жидкостей
    Combat,
    /// Применение урона/лечения
    Damage,
    /// Смерть, despawn, respawn таймеры
    Death,
    /// Перезагрузка уровня, спавнеры, health bar
    Level,
}

/// Цепочка фаз. Вызывается `SimulationPlugin` и тестовыми App.
pub fn configure_simulation_sets(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            SimulationSet::Intent,
            SimulationSet::Physics,
            SimulationSet::Contacts,
            SimulationSet::Combat,
            SimulationSet::Damage,
            SimulationSet::Death,
            SimulationSet::Level,
        )
            .chain(),
    );
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz
        app.insert_resource(Time::<Fixed>::from_hz(FIXED_HZ));
        // Детерминистичный RNG (seed по умолчанию, если хост не задал)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        configure_simulation_sets(app);

        app.register_type::<Health>()
            .register_type::<PhysicsBody>()
            .register_type::<Facing>()
            .register_type::<Dead>()
            .add_plugins((
                PhysicsPlugin,
                PlayerPlugin,
                AIPlugin,
                CombatPlugin,
                ItemsPlugin,
                LevelPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает ровно на 1/60 за `update()`, поэтому каждый update (кроме
/// первого) — один fixed tick.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
        .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / FIXED_HZ,
        )));

    app
}

/// Headless App с полной симуляцией и заданным уровнем
pub fn create_simulation_app(seed: u64, level: LevelConfig) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(ActiveLevel(level)).add_plugins(SimulationPlugin);
    app
}

/// Единственный игрок в мире (хелпер для хоста и тестов)
pub fn find_player(world: &mut World) -> Option<Entity> {
    let mut query = world.query_filtered::<Entity, With<Player>>();
    query.iter(world).next()
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
