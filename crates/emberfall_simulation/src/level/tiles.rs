//! Level tiles: ping-pong движение, движущиеся платформы, разрушаемые тайлы

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::spawn_drops;
use crate::components::{Collider2D, DropItems, Facing, Player, Solid};
use crate::level::{SoundCue, SoundKind};
use crate::physics::{move_towards, BodyContacts, CollisionStarted};

/// Ping-pong разворот, когда до цели не больше этого
pub const PING_PONG_ARRIVAL_DISTANCE: f32 = 1.0;
/// Платформа считается прибывшей ближе этого
pub const PLATFORM_ARRIVAL_DISTANCE: f32 = 0.1;

/// Движение туда-обратно между двумя точками
#[derive(Component, Debug, Clone)]
pub struct PingPongMovement {
    pub origin: Vec2,
    pub target: Vec2,
    pub speed: f32,
    /// Разворачивать визуал при смене направления
    pub flip: bool,
    pub heading_to_target: bool,
}

impl PingPongMovement {
    pub fn new(origin: Vec2, target: Vec2, speed: f32, flip: bool) -> Self {
        Self {
            origin,
            target,
            speed,
            flip,
            heading_to_target: true,
        }
    }

    pub fn goal(&self) -> Vec2 {
        if self.heading_to_target {
            self.target
        } else {
            self.origin
        }
    }

    /// Шаг движения. Возвращает новую позицию и признак разворота.
    pub fn step(&mut self, position: Vec2, delta: f32) -> (Vec2, bool) {
        let goal = self.goal();
        if position.distance(goal) > PING_PONG_ARRIVAL_DISTANCE {
            return (move_towards(position, goal, self.speed * delta), false);
        }
        self.heading_to_target = !self.heading_to_target;
        (position, true)
    }
}

/// Система: ping-pong движение (FixedUpdate)
pub fn move_ping_pong(
    time: Res<Time<Fixed>>,
    mut movers: Query<(&mut Transform, &mut PingPongMovement, Option<&mut Facing>)>,
) {
    let delta = time.delta_secs();
    for (mut transform, mut movement, facing) in movers.iter_mut() {
        let (position, turned) = movement.step(transform.translation.truncate(), delta);
        transform.translation.x = position.x;
        transform.translation.y = position.y;

        if turned && movement.flip {
            match facing {
                Some(mut facing) => facing.flip(&mut transform),
                None => transform.scale.x *= -1.0,
            }
        }
    }
}

/// Режим платформы
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlatformMode {
    /// Постоянно ездит между origin и target
    #[default]
    PingPong,
    /// Едет пока на ней стоит игрок, возвращается через return_delay после ухода
    Triggered,
    /// Переносит вставшего игрока в destination
    Teleport { destination: Vec2 },
    /// Переворачивается на 180° при контакте, дальше статична
    Flip,
}

/// Что платформа делает сейчас
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformMotion {
    Idle,
    MovingTo(Vec2),
    /// Возврат в origin, по прибытии Idle
    Returning,
    Flipping { elapsed: f32, from: Quat, to: Quat },
    /// Перевёрнута, больше не реагирует
    Flipped,
}

#[derive(Component, Debug, Clone)]
#[require(Solid)]
pub struct MovingPlatform {
    pub mode: PlatformMode,
    pub origin: Vec2,
    pub target: Vec2,
    pub speed: f32,
    pub return_delay: f32,
    pub flip_duration: f32,
    pub teleport_sound: Option<String>,
    pub motion: PlatformMotion,
    /// Игрок, стоящий на платформе
    pub rider: Option<Entity>,
    pub return_timer: Option<Timer>,
}

impl MovingPlatform {
    pub fn new(mode: PlatformMode, origin: Vec2, target: Vec2, speed: f32) -> Self {
        let motion = match mode {
            PlatformMode::PingPong => PlatformMotion::MovingTo(target),
            _ => PlatformMotion::Idle,
        };
        Self {
            mode,
            origin,
            target,
            speed,
            return_delay: 1.0,
            flip_duration: 1.0,
            teleport_sound: None,
            motion,
            rider: None,
            return_timer: None,
        }
    }

    /// Игрок встал на платформу (Triggered)
    pub fn on_rider_enter(&mut self) {
        if self.mode == PlatformMode::Triggered {
            self.return_timer = None;
            self.motion = PlatformMotion::MovingTo(self.target);
        }
    }

    /// Игрок ушёл (Triggered): через return_delay — домой
    pub fn on_rider_exit(&mut self) {
        if self.mode == PlatformMode::Triggered {
            self.return_timer = Some(Timer::from_seconds(self.return_delay, TimerMode::Once));
        }
    }

    /// Шаг движения. Возвращает новую позицию.
    pub fn advance(&mut self, position: Vec2, delta: f32) -> Vec2 {
        if let Some(timer) = self.return_timer.as_mut() {
            if timer.tick(std::time::Duration::from_secs_f32(delta)).finished() {
                self.return_timer = None;
                self.motion = PlatformMotion::Returning;
            }
        }

        let goal = match self.motion {
            PlatformMotion::MovingTo(goal) => goal,
            PlatformMotion::Returning => self.origin,
            _ => return position,
        };

        let next = move_towards(position, goal, self.speed * delta);
        if next.distance(goal) <= PLATFORM_ARRIVAL_DISTANCE {
            self.motion = match self.motion {
                PlatformMotion::Returning => PlatformMotion::Idle,
                _ => {
                    let other = if goal == self.origin { self.target } else { self.origin };
                    PlatformMotion::MovingTo(other)
                }
            };
        }
        next
    }

    pub fn start_flip(&mut self, rotation: Quat) {
        if matches!(self.motion, PlatformMotion::Idle) {
            self.motion = PlatformMotion::Flipping {
                elapsed: 0.0,
                from: rotation,
                to: rotation * Quat::from_rotation_z(std::f32::consts::PI),
            };
        }
    }

    /// Тик переворота. Возвращает текущий поворот (None если не переворачиваемся).
    pub fn advance_flip(&mut self, delta: f32) -> Option<Quat> {
        let PlatformMotion::Flipping { elapsed, from, to } = &mut self.motion else {
            return None;
        };
        *elapsed += delta;
        let t = (*elapsed / self.flip_duration.max(0.001)).min(1.0);
        let rotation = from.slerp(*to, t);
        if t >= 1.0 {
            let to = *to;
            self.motion = PlatformMotion::Flipped;
            return Some(to);
        }
        Some(rotation)
    }
}

/// Система: движение платформ + перенос стоящих тел (Physics, до integrate)
///
/// Rider определяется по `BodyContacts.ground` прошлого шага. Во время
/// переворота коллайдер выключен, игрок падает.
pub fn move_platforms(
    time: Res<Time<Fixed>>,
    mut platforms: Query<(Entity, &mut Transform, &mut MovingPlatform, &mut Collider2D), With<Solid>>,
    mut bodies: Query<(Entity, &mut Transform, &BodyContacts, Has<Player>), Without<Solid>>,
    mut sounds: EventWriter<SoundCue>,
) {
    let delta = time.delta_secs();

    for (platform_entity, mut platform_transform, mut platform, mut collider) in platforms.iter_mut() {
        // === Rider переходы ===
        let rider = bodies
            .iter()
            .find(|(_, _, contacts, is_player)| *is_player && contacts.ground == Some(platform_entity))
            .map(|(entity, _, _, _)| entity);

        if rider != platform.rider {
            match (platform.rider, rider) {
                (_, Some(new_rider)) => {
                    crate::logger::log(&format!("🛗 {:?} stepped on platform {:?}", new_rider, platform_entity));
                    match platform.mode {
                        PlatformMode::Triggered => platform.on_rider_enter(),
                        PlatformMode::Teleport { destination } => {
                            if let Ok((_, mut rider_transform, _, _)) = bodies.get_mut(new_rider) {
                                rider_transform.translation.x = destination.x;
                                rider_transform.translation.y = destination.y;
                                crate::logger::log_info(&format!("🌀 {:?} teleported to {:?}", new_rider, destination));
                            }
                            if let Some(clip) = &platform.teleport_sound {
                                sounds.write(SoundCue::clip(clip.clone()).from_entity(platform_entity));
                            }
                        }
                        PlatformMode::Flip => platform.start_flip(platform_transform.rotation),
                        PlatformMode::PingPong => {}
                    }
                }
                (Some(_), None) => platform.on_rider_exit(),
                (None, None) => {}
            }
            platform.rider = rider;
        }

        // === Переворот ===
        if let Some(rotation) = platform.advance_flip(delta) {
            platform_transform.rotation = rotation;
            collider.enabled = !matches!(platform.motion, PlatformMotion::Flipping { .. });
            continue;
        }

        // === Движение + перенос ===
        let before = platform_transform.translation.truncate();
        let after = platform.advance(before, delta);
        let displacement = after - before;
        platform_transform.translation.x = after.x;
        platform_transform.translation.y = after.y;

        if displacement == Vec2::ZERO {
            continue;
        }
        for (_, mut body_transform, contacts, _) in bodies.iter_mut() {
            if contacts.ground == Some(platform_entity) {
                body_transform.translation.x += displacement.x;
                body_transform.translation.y += displacement.y;
            }
        }
    }
}

/// Разрушаемый тайл: ломается после `max_hits` касаний игроком
#[derive(Component, Debug, Clone)]
#[require(Solid)]
pub struct BreakableTile {
    pub max_hits: u32,
    pub hits: u32,
    pub hit_sound: Option<String>,
    pub break_sound: Option<String>,
}

impl BreakableTile {
    pub fn new(max_hits: u32) -> Self {
        Self {
            max_hits,
            hits: 0,
            hit_sound: None,
            break_sound: None,
        }
    }

    /// Засчитать касание. true — тайл сломан.
    pub fn take_hit(&mut self) -> bool {
        self.hits += 1;
        self.hits >= self.max_hits
    }
}

fn play_tile_sound(clip: &Option<String>, tile: Entity, sounds: &mut EventWriter<SoundCue>) {
    match clip {
        Some(clip) => {
            sounds.write(SoundCue::new(SoundKind::Clip(clip.clone())).from_entity(tile));
        }
        None => crate::logger::log_warning("BreakableTile: sound clip is missing"),
    }
}

/// Система: касания разрушаемых тайлов (Contacts)
pub fn break_tiles(
    mut commands: Commands,
    mut collisions: EventReader<CollisionStarted>,
    mut tiles: Query<(&Transform, &mut BreakableTile, Option<&DropItems>)>,
    players: Query<(), With<Player>>,
    mut sounds: EventWriter<SoundCue>,
) {
    let mut broken: Vec<Entity> = Vec::new();

    for collision in collisions.read() {
        if !players.contains(collision.body) || broken.contains(&collision.solid) {
            continue;
        }
        let Ok((transform, mut tile, drops)) = tiles.get_mut(collision.solid) else {
            continue;
        };

        play_tile_sound(&tile.hit_sound, collision.solid, &mut sounds);
        if !tile.take_hit() {
            continue;
        }

        crate::logger::log_info(&format!("🧱 Tile {:?} broke after {} hits", collision.solid, tile.hits));
        play_tile_sound(&tile.break_sound, collision.solid, &mut sounds);
        if let Some(drops) = drops {
            spawn_drops(&mut commands, drops, transform.translation.truncate());
        }
        broken.push(collision.solid);
        commands.entity(collision.solid).try_despawn();
    }
}
