//! Level: LevelManager, sound cues, spawn/reload, тайлы
//!
//! LevelManager — явный resource (монеты, health bar, звук). Создаётся
//! `LevelPlugin`, удаляется на `AppExit`.

use bevy::prelude::*;
use std::collections::VecDeque;

use crate::combat::HealthChanged;
use crate::components::Player;
use crate::config::{AudioConfig, LevelConfig};
use crate::physics::{detect_trigger_transitions, integrate_bodies};
use crate::SimulationSet;

pub mod spawn;
pub mod spawner;
pub mod tiles;

pub use spawn::{spawn_level, spawn_pickup, spawn_player, ActiveLevel};
pub use spawner::{spawn_offsets, EnemySpawner};
pub use tiles::{BreakableTile, MovingPlatform, PingPongMovement, PlatformMode, PlatformMotion};

/// Сколько последних звуков хранит LevelManager
const RECENT_SOUNDS_CAPACITY: usize = 32;

/// Тип звукового события
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundKind {
    Walk,
    Idle,
    Run,
    Jump,
    Attack,
    Die,
    CoinPickup,
    /// Произвольный клип по имени (one-shot)
    Clip(String),
    /// Зацикленный клип (gear, жидкость, музыка)
    LoopStart(String),
    LoopStop(String),
}

/// Event: gameplay просит звук
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SoundCue {
    pub kind: SoundKind,
    pub source: Option<Entity>,
}

impl SoundCue {
    pub fn new(kind: SoundKind) -> Self {
        Self { kind, source: None }
    }

    pub fn clip(name: impl Into<String>) -> Self {
        Self::new(SoundKind::Clip(name.into()))
    }

    pub fn from_entity(mut self, entity: Entity) -> Self {
        self.source = Some(entity);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    OneShot,
    LoopStart,
    LoopStop,
}

/// Event: разрешённый клип для аудио слоя снаружи симуляции
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlaySound {
    pub clip: String,
    pub mode: PlaybackMode,
    pub source: Option<Entity>,
}

/// Почему перезагружается уровень
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    PlayerDied(Entity),
    Restart,
}

/// Event: перезагрузить уровень
#[derive(Event, Debug, Clone)]
pub struct LevelReloadRequested {
    pub reason: ReloadReason,
}

#[derive(Resource, Debug, Clone)]
pub struct LevelManager {
    pub coins: i32,
    /// Заполнение health bar игрока (0.0..=1.0)
    pub health_fraction: f32,
    pub audio: AudioConfig,
    /// Последние разрешённые клипы (новые в конце)
    pub recent_sounds: VecDeque<String>,
}

impl LevelManager {
    pub fn new(audio: AudioConfig) -> Self {
        Self {
            coins: 0,
            health_fraction: 1.0,
            audio,
            recent_sounds: VecDeque::with_capacity(RECENT_SOUNDS_CAPACITY),
        }
    }

    /// Добавить монеты. Неположительные суммы игнорируются.
    pub fn add_coins(&mut self, amount: i32) -> bool {
        if amount <= 0 {
            crate::logger::log_warning(&format!("Ignoring non-positive coin amount: {}", amount));
            return false;
        }
        self.coins = self.coins.saturating_add(amount);
        crate::logger::log(&format!("🪙 Adding coins: {} (total {})", amount, self.coins));
        true
    }

    pub fn reset_for_reload(&mut self) {
        self.coins = 0;
        self.health_fraction = 1.0;
    }

    /// Клип для cue (None — не назначен)
    pub fn resolve_clip(&self, kind: &SoundKind) -> Option<(String, PlaybackMode)> {
        let named = |clip: &Option<String>| clip.clone().map(|clip| (clip, PlaybackMode::OneShot));
        match kind {
            SoundKind::Walk => named(&self.audio.walk),
            SoundKind::Idle => named(&self.audio.idle),
            SoundKind::Run => named(&self.audio.run),
            SoundKind::Jump => named(&self.audio.jump),
            SoundKind::Attack => named(&self.audio.attack),
            SoundKind::Die => named(&self.audio.die),
            SoundKind::CoinPickup => named(&self.audio.coin_pickup),
            SoundKind::Clip(clip) => Some((clip.clone(), PlaybackMode::OneShot)),
            SoundKind::LoopStart(clip) => Some((clip.clone(), PlaybackMode::LoopStart)),
            SoundKind::LoopStop(clip) => Some((clip.clone(), PlaybackMode::LoopStop)),
        }
    }

    fn remember(&mut self, clip: &str) {
        if self.recent_sounds.len() == RECENT_SOUNDS_CAPACITY {
            self.recent_sounds.pop_front();
        }
        self.recent_sounds.push_back(clip.to_string());
    }
}

/// Система: SoundCue → PlaySound (PostUpdate, ловит cues обоих расписаний)
pub fn route_sound_cues(
    mut cues: EventReader<SoundCue>,
    mut manager: ResMut<LevelManager>,
    mut playback: EventWriter<PlaySound>,
) {
    for cue in cues.read() {
        let Some((clip, mode)) = manager.resolve_clip(&cue.kind) else {
            crate::logger::log_warning(&format!("Sound clip for {:?} is not assigned", cue.kind));
            continue;
        };
        manager.remember(&clip);
        playback.write(PlaySound {
            clip,
            mode,
            source: cue.source,
        });
    }
}

/// Система: health bar следует за HP игрока
pub fn track_player_health(
    mut changes: EventReader<HealthChanged>,
    players: Query<(), With<Player>>,
    mut manager: ResMut<LevelManager>,
) {
    for change in changes.read() {
        if players.contains(change.entity) {
            manager.health_fraction = change.fraction();
        }
    }
}

/// Система: LevelManager удаляется при выходе
pub fn teardown_level_manager(mut commands: Commands, mut exits: EventReader<AppExit>) {
    if exits.read().next().is_some() {
        crate::logger::log_info("👋 Level teardown");
        commands.remove_resource::<LevelManager>();
    }
}

/// Level Plugin
///
/// Уровень берётся из `ActiveLevel`, если он уже вставлен; иначе demo.
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<ActiveLevel>() {
            app.insert_resource(ActiveLevel(LevelConfig::demo()));
        }
        let audio = app
            .world()
            .get_resource::<ActiveLevel>()
            .map(|level| level.0.audio.clone())
            .unwrap_or_default();

        app.insert_resource(LevelManager::new(audio))
            .add_event::<SoundCue>()
            .add_event::<PlaySound>()
            .add_event::<LevelReloadRequested>()
            .add_systems(Startup, spawn::setup_level)
            .add_systems(
                FixedUpdate,
                (
                    (tiles::move_platforms, tiles::move_ping_pong)
                        .chain()
                        .in_set(SimulationSet::Physics)
                        .before(integrate_bodies),
                    tiles::break_tiles
                        .in_set(SimulationSet::Contacts)
                        .after(detect_trigger_transitions),
                    (
                        spawner::run_enemy_spawners,
                        spawn::handle_reload_requests,
                        track_player_health,
                    )
                        .chain()
                        .in_set(SimulationSet::Level),
                ),
            )
            .add_systems(PostUpdate, route_sound_cues)
            .add_systems(Last, teardown_level_manager);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_coins_ignores_non_positive() {
        let mut manager = LevelManager::new(AudioConfig::default());
        assert!(manager.add_coins(3));
        assert!(!manager.add_coins(0));
        assert!(!manager.add_coins(-5));
        assert_eq!(manager.coins, 3);
    }

    #[test]
    fn test_missing_clip_resolves_to_none() {
        let manager = LevelManager::new(AudioConfig {
            jump: Some("jump.wav".into()),
            ..default()
        });
        assert_eq!(
            manager.resolve_clip(&SoundKind::Jump),
            Some(("jump.wav".to_string(), PlaybackMode::OneShot))
        );
        assert_eq!(manager.resolve_clip(&SoundKind::Walk), None);
        assert_eq!(
            manager.resolve_clip(&SoundKind::LoopStop("water".into())),
            Some(("water".to_string(), PlaybackMode::LoopStop))
        );
    }

    #[test]
    fn test_recent_sounds_bounded() {
        let mut manager = LevelManager::new(AudioConfig::default());
        for index in 0..40 {
            manager.remember(&format!("clip{}", index));
        }
        assert_eq!(manager.recent_sounds.len(), RECENT_SOUNDS_CAPACITY);
        assert_eq!(manager.recent_sounds.front().map(String::as_str), Some("clip8"));
    }
}
