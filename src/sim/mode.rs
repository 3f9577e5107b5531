//! Mode configuration
//!
//! Adventure, combat and duel share one session core; everything that
//! differs between them is one of the strategy enums below.

use serde::{Deserialize, Serialize};

use super::difficulty::LevelParams;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Level mode: advance by points, fade between levels
    Adventure,
    /// Single-player waves from a selected starting level
    Combat,
    /// Local two-player match
    Duel,
}

impl ModeKind {
    /// Wire name used in game-over notifications
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Adventure => "adventure",
            ModeKind::Combat => "single",
            ModeKind::Duel => "duel",
        }
    }
}

/// What a kill adds to the progression accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Points,
    Kills,
    /// No progression
    None,
}

/// How incoming damage is gated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvulnerabilityModel {
    /// Hit starts a 1500 ms window; shield pickups extend it
    Timed,
    /// Damage applies every tick unless the shield flag is set
    Shield,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinCondition {
    /// Lives run out -> game over with a score
    LivesExhausted,
    /// First player at zero health loses
    FirstKnockout,
}

/// Damage of a projectile whose shape matches the enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticalRule {
    GuaranteedKill,
    DoubleDamage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpExpiry {
    /// Removed once below the bottom edge
    OffScreen,
    /// Removed when the lifetime countdown runs out
    Lifetime,
}

/// Per-mode strategy bundle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeConfig {
    pub kind: ModeKind,
    pub player_count: usize,
    pub currency: Currency,
    pub invulnerability: InvulnerabilityModel,
    pub win_condition: WinCondition,
    pub critical: CriticalRule,
    pub power_up_expiry: PowerUpExpiry,
    /// Damage taken when an enemy leaves through the bottom edge
    pub escape_damage: Option<f32>,
    /// Level the session starts (and restarts) at
    pub starting_level: u32,
}

impl ModeConfig {
    pub fn adventure() -> Self {
        Self {
            kind: ModeKind::Adventure,
            player_count: 1,
            currency: Currency::Points,
            invulnerability: InvulnerabilityModel::Timed,
            win_condition: WinCondition::LivesExhausted,
            critical: CriticalRule::GuaranteedKill,
            power_up_expiry: PowerUpExpiry::OffScreen,
            escape_damage: None,
            starting_level: MIN_LEVEL,
        }
    }

    pub fn combat(level: u32) -> Self {
        Self {
            kind: ModeKind::Combat,
            currency: Currency::Kills,
            escape_damage: Some(ESCAPE_DAMAGE),
            starting_level: level.clamp(MIN_LEVEL, MAX_LEVEL),
            ..Self::adventure()
        }
    }

    pub fn duel(level: u32) -> Self {
        Self {
            kind: ModeKind::Duel,
            player_count: 2,
            currency: Currency::None,
            invulnerability: InvulnerabilityModel::Shield,
            win_condition: WinCondition::FirstKnockout,
            critical: CriticalRule::DoubleDamage,
            power_up_expiry: PowerUpExpiry::Lifetime,
            escape_damage: None,
            starting_level: level.clamp(MIN_LEVEL, MAX_LEVEL),
        }
    }

    pub fn is_duel(&self) -> bool {
        self.kind == ModeKind::Duel
    }

    /// Difficulty parameters the session starts with
    pub fn initial_params(&self) -> LevelParams {
        match self.kind {
            ModeKind::Adventure => LevelParams::adventure(self.starting_level),
            ModeKind::Combat => LevelParams::combat_start(self.starting_level),
            ModeKind::Duel => LevelParams::duel(self.starting_level),
        }
    }

    /// Parameters after advancing the progression counter to `n`
    pub fn params_for(&self, n: u32) -> LevelParams {
        match self.kind {
            ModeKind::Adventure => LevelParams::adventure(n),
            ModeKind::Combat => LevelParams::combat_wave(n, self.starting_level),
            ModeKind::Duel => LevelParams::duel(n),
        }
    }
}
