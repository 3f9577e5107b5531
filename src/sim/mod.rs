//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (reverse index walks for removal)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod mode;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timers;
pub mod transition;

pub use collision::{CollisionSummary, resolve};
pub use difficulty::{LevelParams, Threshold};
pub use entity::{Body, Enemy, Player, PowerUp, PowerUpKind, Projectile, ShapeType};
pub use mode::{ModeConfig, ModeKind};
pub use state::{GameEvent, GameOverReport, GamePhase, Progression, Session};
pub use tick::{PlayerInput, TickInput, tick};
pub use timers::{TimedEffect, TimerQueue};
pub use transition::LevelTransition;
