//! Shape Shifter Duel - a shape-matching arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, progression)
//! - `arcade`: Menu / level select / session lifecycle around the simulation
//! - `renderer`: Scene geometry and the WebGPU pipeline that draws it
//! - `platform`: Browser input mapping
//! - `stats`: Persisted user record (high score, level)
//! - `settings`: Player preferences

pub mod arcade;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod stats;

pub use arcade::{Arcade, Screen};
pub use settings::Settings;
pub use stats::{StatsError, UserRecord};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick; entities move one step per tick
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum ticks per animation frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions (logical pixels, y grows downward)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Actor body size (players and enemies)
    pub const ACTOR_SIZE: f32 = 30.0;
    pub const PROJECTILE_SIZE: f32 = 5.0;
    pub const POWER_UP_SIZE: f32 = 15.0;

    /// Single-player spawn point
    pub const PLAYER_START_X: f32 = 250.0;
    pub const PLAYER_START_Y: f32 = 400.0;
    pub const STARTING_LIVES: u8 = 3;

    /// Distance moved per arrow key press in adventure/combat
    pub const PLAYER_BASE_SPEED: f32 = 8.0;
    pub const SPEED_POWER_UP_BONUS: f32 = 2.0;
    pub const SPEED_POWER_UP_MS: f64 = 10_000.0;

    /// Duel movement per tick while a direction key is held
    pub const DUEL_SPEED: f32 = 5.0;
    pub const DUEL_BOOSTED_SPEED: f32 = 8.0;
    /// Duel actors are kept this far from the field edges
    pub const DUEL_EDGE_MARGIN: f32 = 20.0;
    /// Duel enemies never spawn within this box of either player
    pub const DUEL_SPAWN_CLEARANCE: f32 = 100.0;
    pub const DUEL_SPAWN_ATTEMPTS: u32 = 64;
    pub const DUEL_ENEMY_MAX_DRIFT: f32 = 1.5;
    pub const DUEL_POWER_UP_INTERVAL_MS: f64 = 10_000.0;
    pub const DUEL_POWER_UP_LIFETIME_MS: f64 = 10_000.0;
    pub const DUEL_EFFECT_MS: f64 = 5_000.0;
    pub const DUEL_GAME_OVER_DELAY_MS: f64 = 3_000.0;

    /// One shot per this many milliseconds
    pub const SHOT_DELAY_MS: f64 = 200.0;
    pub const PROJECTILE_DAMAGE: f32 = 5.0;
    pub const PROJECTILE_SPEED: f32 = 20.0;
    pub const DUEL_PROJECTILE_DAMAGE: f32 = 10.0;
    pub const DUEL_PROJECTILE_SPEED: f32 = 8.0;

    /// Invulnerability after taking contact damage
    pub const HIT_INVULNERABILITY_MS: f64 = 1_500.0;
    /// Invulnerability granted by a Shield pickup
    pub const SHIELD_INVULNERABILITY_MS: f64 = 5_000.0;
    pub const HEALTH_POWER_UP_AMOUNT: f32 = 25.0;

    /// Enemy defaults
    pub const ENEMY_BASE_SPEED: f32 = 2.0;
    /// Damage taken when an enemy escapes past the bottom edge in combat
    pub const ESCAPE_DAMAGE: f32 = 5.0;
    pub const POWER_UP_FALL_SPEED: f32 = 1.5;

    /// Chance that an enemy spawn also spawns a power-up
    pub const POWER_UP_SPAWN_CHANCE: f64 = 0.1;
    /// Chance that a defeated enemy drops a Health power-up
    pub const HEALTH_DROP_CHANCE: f64 = 0.2;

    /// Combat wave rewards
    pub const WAVE_BONUS_PER_WAVE: u64 = 50;
    pub const WAVE_SPAWN_PAUSE_MS: f64 = 2_000.0;

    /// Level selection range
    pub const MIN_LEVEL: u32 = 1;
    pub const MAX_LEVEL: u32 = 5;
}
