//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: игрок, здоровье, поведение после смерти, дроп
//! - movement: кинематическое тело, направление взгляда, исходные параметры
//! - world: коллайдеры, слои, триггеры, принадлежность уровню
//! - animation: именованные animation parameters для внешнего рендера

pub mod actor;
pub mod animation;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use animation::AnimatorParams;
pub use movement::*;
pub use world::*;
