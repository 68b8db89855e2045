//! Damage/heal intents, health notifications, death handling

use bevy::prelude::*;

use crate::components::animation::{IS_DEAD, IS_HURTING, STATE_HURT};
use crate::components::{
    AnimatorParams, Collider2D, DamageOutcome, DeathBehavior, DropItems, HealOutcome, Health, PhysicsBody, Player,
};
use crate::level::{LevelReloadRequested, ReloadReason, SoundCue, SoundKind};

/// Event: нанести урон (атака, снаряд, шипы, яд, fluid)
#[derive(Event, Debug, Clone)]
pub struct DamageIntent {
    pub target: Entity,
    pub amount: i32,
    /// Кто нанёс (None = окружение)
    pub source: Option<Entity>,
}

/// Event: вылечить
#[derive(Event, Debug, Clone)]
pub struct HealIntent {
    pub target: Entity,
    pub amount: i32,
}

/// Event: HP изменилось (после принятого урона/лечения/сброса)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: i32,
    pub max: i32,
}

impl HealthChanged {
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max.max(1) as f32
    }
}

/// Event: урон нанесён
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: i32,
}

/// Event: entity умер (ровно один раз на смерть)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв
///
/// AI, атаки и input пропускают entities с этим маркером.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Компонент-маркер: деспавн entity после указанного времени
#[derive(Component, Debug)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта симуляции)
    pub despawn_time: f32,
}

/// Отложенный respawn игрока
#[derive(Component, Debug)]
pub struct RespawnTimer {
    pub timer: Timer,
}

/// Система: применить DamageIntent
///
/// Rejected amount → warning, ничего не меняется. Урон по мёртвому
/// игнорируется (повторной смерти нет).
pub fn apply_damage_intents(
    mut intents: EventReader<DamageIntent>,
    mut targets: Query<(&mut Health, Option<&mut AnimatorParams>)>,
    mut health_changed: EventWriter<HealthChanged>,
    mut damage_dealt: EventWriter<DamageDealt>,
    mut entity_died: EventWriter<EntityDied>,
) {
    for intent in intents.read() {
        let Ok((mut health, anim)) = targets.get_mut(intent.target) else {
            crate::logger::log_warning(&format!(
                "DamageIntent: target {:?} has no Health, skipped",
                intent.target
            ));
            continue;
        };

        match health.take_damage(intent.amount) {
            DamageOutcome::Rejected => {
                crate::logger::log_warning(&format!(
                    "DamageIntent: invalid amount {} for {:?} rejected",
                    intent.amount, intent.target
                ));
            }
            DamageOutcome::Ignored => {}
            outcome @ (DamageOutcome::Hurt | DamageOutcome::Killed) => {
                health_changed.write(HealthChanged {
                    entity: intent.target,
                    current: health.current,
                    max: health.max,
                });
                damage_dealt.write(DamageDealt {
                    attacker: intent.source,
                    target: intent.target,
                    damage: intent.amount,
                });

                if outcome == DamageOutcome::Killed {
                    crate::logger::log_info(&format!("💀 Entity {:?} died (killer: {:?})", intent.target, intent.source));
                    entity_died.write(EntityDied {
                        entity: intent.target,
                        killer: intent.source,
                    });
                } else {
                    crate::logger::log(&format!(
                        "💥 {:?} took {} damage → {}/{}",
                        intent.target, intent.amount, health.current, health.max
                    ));
                    if let Some(mut anim) = anim {
                        anim.play(STATE_HURT);
                    }
                }
            }
        }
    }
}

/// Система: применить HealIntent
pub fn apply_heal_intents(
    mut intents: EventReader<HealIntent>,
    mut targets: Query<&mut Health>,
    mut health_changed: EventWriter<HealthChanged>,
) {
    for intent in intents.read() {
        let Ok(mut health) = targets.get_mut(intent.target) else {
            crate::logger::log_warning(&format!("HealIntent: target {:?} has no Health, skipped", intent.target));
            continue;
        };

        match health.heal(intent.amount) {
            HealOutcome::Rejected => {
                crate::logger::log_warning(&format!(
                    "HealIntent: invalid amount {} for {:?} rejected",
                    intent.amount, intent.target
                ));
            }
            HealOutcome::Ignored => {}
            HealOutcome::Healed(added) => {
                crate::logger::log(&format!("💚 {:?} healed +{} → {}", intent.target, added, health.current));
                health_changed.write(HealthChanged {
                    entity: intent.target,
                    current: health.current,
                    max: health.max,
                });
            }
        }
    }
}

/// Система: IsHurting / IsDead для рендера
pub fn sync_health_animation(mut actors: Query<(&Health, &mut AnimatorParams), Changed<Health>>) {
    for (health, mut anim) in actors.iter_mut() {
        anim.set_bool(IS_HURTING, health.is_hurting);
        anim.set_bool(IS_DEAD, health.is_dead);
    }
}

/// Система: hurt state истекает по таймеру
pub fn tick_hurt_timers(time: Res<Time<Fixed>>, mut actors: Query<&mut Health>) {
    let delta = time.delta_secs();
    for mut health in actors.iter_mut() {
        if health.is_hurting {
            health.tick_hurt(delta);
        }
    }
}

/// Система: обработка смерти
///
/// Коллайдер выключается, тело останавливается, ставится маркер Dead,
/// дальше — по DeathBehavior.
pub fn handle_deaths(
    mut commands: Commands,
    time: Res<Time>,
    mut deaths: EventReader<EntityDied>,
    mut actors: Query<(
        &Transform,
        Option<&DeathBehavior>,
        Option<&DropItems>,
        Option<&mut Collider2D>,
        Option<&mut PhysicsBody>,
        Has<Player>,
    )>,
    mut sounds: EventWriter<SoundCue>,
) {
    for death in deaths.read() {
        let Ok((transform, behavior, drops, collider, body, is_player)) = actors.get_mut(death.entity) else {
            continue;
        };

        if let Some(mut collider) = collider {
            collider.enabled = false;
        }
        if let Some(mut body) = body {
            body.velocity = Vec2::ZERO;
        }
        if is_player {
            sounds.write(SoundCue::new(SoundKind::Die).from_entity(death.entity));
        }

        let behavior = behavior.copied().unwrap_or_default();
        let position = transform.translation.truncate();

        // Дроп только у тех, кто исчезает (игрок respawn'ится целиком)
        if !matches!(behavior, DeathBehavior::Respawn { .. }) {
            if let Some(drops) = drops {
                spawn_drops(&mut commands, drops, position);
            }
        }

        let Ok(mut entity_commands) = commands.get_entity(death.entity) else {
            continue;
        };
        entity_commands.insert(Dead);

        match behavior {
            DeathBehavior::DespawnImmediately => {
                entity_commands.try_despawn();
            }
            DeathBehavior::DespawnAfter { delay } => {
                entity_commands.insert(DespawnAfter {
                    despawn_time: time.elapsed_secs() + delay,
                });
            }
            DeathBehavior::Respawn { delay } => {
                crate::logger::log_info(&format!("⏳ Player {:?} respawns in {:.1}s", death.entity, delay));
                entity_commands.insert(RespawnTimer {
                    timer: Timer::from_seconds(delay, TimerMode::Once),
                });
            }
        }
    }
}

/// Спавн дропа в точке смерти/разрушения
pub fn spawn_drops(commands: &mut Commands, drops: &DropItems, position: Vec2) {
    if !drops.enabled {
        return;
    }
    if drops.items.is_empty() {
        crate::logger::log_warning("DropItems enabled but item list is empty");
        return;
    }
    for item in &drops.items {
        crate::level::spawn::spawn_pickup(commands, item, Some(position));
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter timeout
pub fn despawn_after_timeout(mut commands: Commands, query: Query<(Entity, &DespawnAfter)>, time: Res<Time>) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::logger::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).try_despawn();
        }
    }
}

/// Система: respawn timer → запрос перезагрузки уровня
pub fn tick_respawn_timers(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut timers: Query<(Entity, &mut RespawnTimer)>,
    mut reloads: EventWriter<LevelReloadRequested>,
) {
    for (entity, mut respawn) in timers.iter_mut() {
        if respawn.timer.tick(time.delta()).just_finished() {
            commands.entity(entity).remove::<RespawnTimer>();
            reloads.write(LevelReloadRequested {
                reason: ReloadReason::PlayerDied(entity),
            });
        }
    }
}
