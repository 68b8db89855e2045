//! Level configuration (JSON)
//!
//! `LevelConfig` описывает всё, что спавнится при загрузке уровня: solids,
//! игрока, врагов, pickups, hazards, тайлы, аудио клипы. Все поля имеют
//! defaults, поэтому JSON может задавать только то, что отличается.
//!
//! Координаты: единицы мира, Y вверх. `Vec2` в JSON — массив `[x, y]`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ai::{EnemyConfig, Slime, Turret};
use crate::combat::WeaponDefinition;
use crate::items::{Fluid, GearItem};
use crate::level::PlatformMode;

/// Ошибки загрузки уровня
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Файл не читается
    #[error("failed to read level file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Невалидный JSON / несовпадение схемы
    #[error("failed to parse level config: {0}")]
    Parse(#[from] serde_json::Error),
    /// JSON корректен, но значения не имеют смысла
    #[error("invalid level config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Настройки игрока
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub crouching_half_extents: Vec2,
    pub max_health: i32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub stamina_time: f32,
    pub double_jump: bool,
    pub jump_impulse: f32,
    pub air_control: bool,
    pub gravity_scale: f32,
    pub attack_damage: i32,
    pub attack_speed: f32,
    pub attack_range: f32,
    pub respawn_delay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: Vec2::new(0.0, 0.5),
            half_extents: Vec2::new(0.3, 0.5),
            crouching_half_extents: Vec2::new(0.3, 0.3),
            max_health: 100,
            walk_speed: 2.0,
            run_speed: 4.0,
            stamina_time: 100.0,
            double_jump: true,
            jump_impulse: 8.0,
            air_control: false,
            gravity_scale: 3.0,
            attack_damage: 10,
            attack_speed: 1.0,
            attack_range: 1.0,
            respawn_delay: 1.5,
        }
    }
}

/// Статичная геометрия (пол, стены)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidConfig {
    pub position: Vec2,
    pub half_extents: Vec2,
}

/// Враг-стрелок
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySpawn {
    pub position: Vec2,
    pub max_health: i32,
    pub facing_right: bool,
    pub enemy: EnemyConfig,
}

impl Default for EnemySpawn {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            max_health: 30,
            facing_right: false,
            enemy: EnemyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretSpawn {
    pub position: Vec2,
    pub max_health: i32,
    pub turret: Turret,
}

impl Default for TurretSpawn {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            max_health: 50,
            turret: Turret::default(),
        }
    }
}

/// Слайм: ходит между `position` и `patrol_to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlimeSpawn {
    pub position: Vec2,
    pub patrol_to: Vec2,
    pub max_health: i32,
    pub damage: i32,
    pub attack_range: f32,
    pub slime: Slime,
    pub drops: Vec<PickupConfig>,
}

impl Default for SlimeSpawn {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            patrol_to: Vec2::new(4.0, 0.0),
            max_health: 20,
            damage: 10,
            attack_range: 0.5,
            slime: Slime::default(),
            drops: Vec::new(),
        }
    }
}

/// Спавнер: `count` врагов со случайным x в пределах ±radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub position: Vec2,
    pub count: u32,
    pub radius: f32,
    pub template: EnemySpawn,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            count: 5,
            radius: 10.0,
            template: EnemySpawn::default(),
        }
    }
}

/// Pickup на уровне (или дроп)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PickupConfig {
    Coin {
        #[serde(default)]
        position: Vec2,
        #[serde(default = "default_coin_value")]
        value: i32,
    },
    Potion {
        #[serde(default)]
        position: Vec2,
        #[serde(default = "default_potion_amount")]
        amount: i32,
        #[serde(default)]
        is_poison: bool,
        #[serde(default)]
        collect_sound: Option<String>,
    },
    Weapon {
        #[serde(default)]
        position: Vec2,
        #[serde(default)]
        weapon: WeaponDefinition,
    },
    Gear {
        #[serde(default)]
        position: Vec2,
        #[serde(default)]
        gear: GearItem,
    },
}

fn default_coin_value() -> i32 {
    1
}

fn default_potion_amount() -> i32 {
    20
}

impl PickupConfig {
    pub fn position(&self) -> Vec2 {
        match self {
            PickupConfig::Coin { position, .. }
            | PickupConfig::Potion { position, .. }
            | PickupConfig::Weapon { position, .. }
            | PickupConfig::Gear { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub damage: i32,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            half_extents: Vec2::new(0.5, 0.25),
            damage: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidSpawn {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub fluid: Fluid,
}

impl Default for FluidSpawn {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            half_extents: Vec2::new(2.0, 1.0),
            fluid: Fluid::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakableTileConfig {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub max_hits: u32,
    pub hit_sound: Option<String>,
    pub break_sound: Option<String>,
    pub drops: Vec<PickupConfig>,
}

impl Default for BreakableTileConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            half_extents: Vec2::splat(0.5),
            max_hits: 3,
            hit_sound: None,
            break_sound: None,
            drops: Vec::new(),
        }
    }
}

/// Движущаяся платформа: `position` → `position + direction * distance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub direction: Vec2,
    pub distance: f32,
    pub speed: f32,
    pub return_delay: f32,
    pub flip_duration: f32,
    pub mode: PlatformMode,
    pub teleport_sound: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            half_extents: Vec2::new(1.0, 0.25),
            direction: Vec2::X,
            distance: 5.0,
            speed: 1.0,
            return_delay: 1.0,
            flip_duration: 1.0,
            mode: PlatformMode::PingPong,
            teleport_sound: None,
        }
    }
}

/// Имена аудио клипов (воспроизведение снаружи симуляции)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub music: Option<String>,
    pub coin_pickup: Option<String>,
    pub jump: Option<String>,
    pub walk: Option<String>,
    pub idle: Option<String>,
    pub run: Option<String>,
    pub attack: Option<String>,
    pub die: Option<String>,
}

/// Полное описание уровня
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub player: PlayerConfig,
    pub solids: Vec<SolidConfig>,
    pub enemies: Vec<EnemySpawn>,
    pub turrets: Vec<TurretSpawn>,
    pub slimes: Vec<SlimeSpawn>,
    pub spawners: Vec<SpawnerConfig>,
    pub pickups: Vec<PickupConfig>,
    pub spikes: Vec<SpikeConfig>,
    pub fluids: Vec<FluidSpawn>,
    pub breakable_tiles: Vec<BreakableTileConfig>,
    pub platforms: Vec<PlatformConfig>,
    pub audio: AudioConfig,
}

impl LevelConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: LevelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Проверка значений, которые serde не ловит
    pub fn validate(&self) -> ConfigResult<()> {
        if self.player.max_health <= 0 {
            return Err(ConfigError::Invalid(format!(
                "player.max_health must be positive, got {}",
                self.player.max_health
            )));
        }
        if self.player.half_extents.min_element() <= 0.0 {
            return Err(ConfigError::Invalid("player.half_extents must be positive".into()));
        }
        if let Some(index) = self
            .solids
            .iter()
            .position(|solid| solid.half_extents.min_element() <= 0.0)
        {
            return Err(ConfigError::Invalid(format!("solids[{}].half_extents must be positive", index)));
        }
        if let Some(index) = self.enemies.iter().position(|spawn| spawn.enemy.fire_rate <= 0.0) {
            return Err(ConfigError::Invalid(format!("enemies[{}].enemy.fire_rate must be positive", index)));
        }
        if let Some(index) = self.turrets.iter().position(|spawn| spawn.turret.fire_rate <= 0.0) {
            return Err(ConfigError::Invalid(format!("turrets[{}].turret.fire_rate must be positive", index)));
        }
        if let Some(index) = self.spawners.iter().position(|spawner| spawner.radius < 0.0) {
            return Err(ConfigError::Invalid(format!("spawners[{}].radius must not be negative", index)));
        }
        if let Some(index) = self.platforms.iter().position(|platform| platform.speed < 0.0) {
            return Err(ConfigError::Invalid(format!("platforms[{}].speed must not be negative", index)));
        }
        Ok(())
    }

    /// Встроенный демо-уровень
    ///
    /// Пол y ∈ [-1, 0], стены по краям, игрок в центре. Справа стрелок и
    /// турель, слева слайм и жидкость, над полом платформа.
    pub fn demo() -> Self {
        Self {
            name: "demo".into(),
            player: PlayerConfig::default(),
            solids: vec![
                SolidConfig {
                    position: Vec2::new(0.0, -0.5),
                    half_extents: Vec2::new(40.0, 0.5),
                },
                SolidConfig {
                    position: Vec2::new(-40.5, 5.0),
                    half_extents: Vec2::new(0.5, 5.0),
                },
                SolidConfig {
                    position: Vec2::new(40.5, 5.0),
                    half_extents: Vec2::new(0.5, 5.0),
                },
            ],
            enemies: vec![
                EnemySpawn {
                    position: Vec2::new(14.0, 0.5),
                    ..default()
                },
                EnemySpawn {
                    position: Vec2::new(24.0, 0.5),
                    enemy: EnemyConfig {
                        is_static: false,
                        patrol_radius: 6.0,
                        ..default()
                    },
                    ..default()
                },
            ],
            turrets: vec![TurretSpawn {
                position: Vec2::new(30.0, 3.0),
                ..default()
            }],
            slimes: vec![SlimeSpawn {
                position: Vec2::new(-8.0, 0.4),
                patrol_to: Vec2::new(-14.0, 0.4),
                drops: vec![PickupConfig::Coin {
                    position: Vec2::ZERO,
                    value: 5,
                }],
                ..default()
            }],
            spawners: Vec::new(),
            pickups: vec![
                PickupConfig::Coin {
                    position: Vec2::new(2.0, 0.5),
                    value: 1,
                },
                PickupConfig::Coin {
                    position: Vec2::new(3.0, 0.5),
                    value: 1,
                },
                PickupConfig::Potion {
                    position: Vec2::new(-3.0, 0.5),
                    amount: 20,
                    is_poison: false,
                    collect_sound: None,
                },
                PickupConfig::Weapon {
                    position: Vec2::new(5.0, 0.5),
                    weapon: WeaponDefinition::default(),
                },
                PickupConfig::Gear {
                    position: Vec2::new(-5.0, 0.5),
                    gear: GearItem::default(),
                },
            ],
            spikes: vec![SpikeConfig {
                position: Vec2::new(-20.0, 0.25),
                ..default()
            }],
            fluids: vec![FluidSpawn {
                position: Vec2::new(-26.0, 1.0),
                ..default()
            }],
            breakable_tiles: vec![BreakableTileConfig {
                position: Vec2::new(8.0, 3.0),
                drops: vec![PickupConfig::Coin {
                    position: Vec2::ZERO,
                    value: 10,
                }],
                ..default()
            }],
            platforms: vec![PlatformConfig {
                position: Vec2::new(0.0, 4.0),
                mode: PlatformMode::Triggered,
                ..default()
            }],
            audio: AudioConfig::default(),
        }
    }
}
