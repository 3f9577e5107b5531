//! Session state and core simulation types
//!
//! A `Session` is one run of one mode: players, enemies, projectiles,
//! power-ups, progression and the timers that hang off them.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{LevelParams, Threshold};
use super::entity::{Enemy, Player, PowerUp, PowerUpKind, Projectile, ShapeType};
use super::mode::{ModeConfig, ModeKind, WinCondition};
use super::timers::{TimedEffect, TimerQueue};
use super::transition::LevelTransition;
use crate::consts::*;

/// Current phase of a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Frozen; only the overlay renders
    Paused,
    /// Adventure level fade; gameplay blocked
    Transitioning,
    /// Run ended; only delayed notifications drain
    GameOver,
}

/// Level/wave counter and the accumulator that advances it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    /// Current level or wave (1-indexed, never decreases)
    pub counter: u32,
    /// Points or kills since the last advance
    pub accumulator: u32,
    pub threshold: Threshold,
}

impl Progression {
    pub fn new(counter: u32, threshold: Threshold) -> Self {
        Self {
            counter,
            accumulator: 0,
            threshold,
        }
    }

    /// Add to the accumulator. Returns true when the threshold is reached.
    pub fn add(&mut self, amount: u32) -> bool {
        self.accumulator = self.accumulator.saturating_add(amount);
        match self.threshold {
            Threshold::Points(required) | Threshold::Kills(required) => {
                self.accumulator >= required
            }
            Threshold::Never => false,
        }
    }

    pub fn advance(&mut self, threshold: Threshold) {
        self.counter += 1;
        self.accumulator = 0;
        self.threshold = threshold;
    }

    /// Fraction of the way to the next advance, for the progress bar
    pub fn fraction(&self) -> f32 {
        match self.threshold {
            Threshold::Points(required) | Threshold::Kills(required) if required > 0 => {
                (self.accumulator as f32 / required as f32).min(1.0)
            }
            _ => 0.0,
        }
    }
}

/// Terminal notification for a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverReport {
    pub mode: ModeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
    /// Duel winner, `0` for a draw
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<u8>,
    pub level: u32,
    pub message: String,
}

impl GameOverReport {
    pub fn single(mode: ModeKind, score: u64, level: u32) -> Self {
        Self {
            mode,
            score: Some(score),
            winner: None,
            level,
            message: format!("Game Over! You reached level {level} with a score of {score}."),
        }
    }

    pub fn duel(level: u32, winner: u8) -> Self {
        let message = if winner == 0 {
            "Game Over! It's a draw!".to_string()
        } else {
            format!("Game Over! Player {winner} wins!")
        };
        Self {
            mode: ModeKind::Duel,
            score: None,
            winner: Some(winner),
            level,
            message,
        }
    }
}

/// Events emitted by the simulation for the host (HUD, stats, logging)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyDefeated {
        shape: ShapeType,
        critical: bool,
        points: u64,
    },
    PlayerHit {
        player: u8,
        damage: f32,
    },
    LifeLost {
        lives: u8,
    },
    PowerUpCollected {
        player: u8,
        kind: PowerUpKind,
    },
    LevelAdvanced {
        level: u32,
    },
    WaveAdvanced {
        wave: u32,
        bonus: u64,
    },
    GameOver(GameOverReport),
}

/// One run of one mode
#[derive(Debug, Clone)]
pub struct Session {
    pub config: ModeConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// One player in adventure/combat, two in duel (ordered by id)
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub power_ups: Vec<PowerUp>,
    pub progression: Progression,
    pub params: LevelParams,
    pub score: u64,
    /// Highest level reached (adventure reports this at game over)
    pub highest_level: u32,
    /// Session clock in ms; advances only while Running or GameOver
    pub clock_ms: f64,
    /// Adventure/combat spawn cadence reference
    pub last_enemy_spawn_ms: f64,
    /// Duel accumulating spawn timer
    pub enemy_spawn_timer_ms: f64,
    pub power_up_timer_ms: f64,
    pub transition: Option<LevelTransition>,
    pub timers: TimerQueue,
    /// Bumped on every restart; stale timed effects are discarded
    pub generation: u32,
    events: Vec<GameEvent>,
    game_over_emitted: bool,
    next_id: u32,
}

impl Session {
    /// Create a fresh session in the Running phase
    pub fn new(config: ModeConfig, seed: u64) -> Self {
        let params = config.initial_params();
        let players = if config.is_duel() {
            let x = FIELD_WIDTH / 2.0;
            vec![
                Player::new(1, x, FIELD_HEIGHT - 100.0, params.player_max_health, 1, DUEL_SPEED),
                Player::new(2, x, 100.0, params.player_max_health, 1, DUEL_SPEED),
            ]
        } else {
            vec![Player::new(
                1,
                PLAYER_START_X,
                PLAYER_START_Y,
                params.player_max_health,
                STARTING_LIVES,
                PLAYER_BASE_SPEED,
            )]
        };

        log::info!(
            "Starting {:?} session at level {} (seed {seed})",
            config.kind,
            config.starting_level
        );

        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            players,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            progression: Progression::new(params.number, params.threshold),
            params,
            score: 0,
            highest_level: params.number,
            clock_ms: 0.0,
            last_enemy_spawn_ms: 0.0,
            enemy_spawn_timer_ms: 0.0,
            power_up_timer_ms: 0.0,
            transition: None,
            timers: TimerQueue::new(),
            generation: 0,
            events: Vec::new(),
            game_over_emitted: false,
            next_id: 1,
        }
    }

    /// Start over at the configured starting level.
    ///
    /// The RNG stream and the timer queue carry over; bumping the
    /// generation makes every queued effect from the previous run stale.
    pub fn restart(&mut self) {
        let generation = self.generation.wrapping_add(1);
        let rng = self.rng.clone();
        let timers = std::mem::take(&mut self.timers);
        *self = Self::new(self.config, self.seed);
        self.rng = rng;
        self.timers = timers;
        self.generation = generation;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn player(&self, id: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u8) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn schedule(&mut self, delay_ms: f64, effect: TimedEffect) {
        self.timers
            .schedule(self.clock_ms + delay_ms, self.generation, effect);
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Level shown in the HUD and reported at game over
    pub fn level(&self) -> u32 {
        match self.config.kind {
            ModeKind::Adventure => self.highest_level,
            _ => self.progression.counter,
        }
    }

    /// Enter GameOver once. Single modes notify immediately; duel notifies
    /// after a delay while the final frame stays on screen.
    pub fn end_game(&mut self, winner: Option<u8>) {
        if self.game_over_emitted {
            return;
        }
        self.game_over_emitted = true;
        self.phase = GamePhase::GameOver;
        self.transition = None;

        match self.config.win_condition {
            WinCondition::LivesExhausted => {
                let report = GameOverReport::single(self.config.kind, self.score, self.level());
                log::info!("{}", report.message);
                self.emit(GameEvent::GameOver(report));
            }
            WinCondition::FirstKnockout => {
                let report = GameOverReport::duel(self.progression.counter, winner.unwrap_or(0));
                log::info!("{}", report.message);
                self.schedule(
                    DUEL_GAME_OVER_DELAY_MS,
                    TimedEffect::AnnounceGameOver(report),
                );
            }
        }
    }

    /// Adventure: start the fade to the next level. Enemies clear now; the
    /// new parameters apply when the fade completes.
    pub fn begin_level_transition(&mut self) {
        let from = self.progression.counter;
        let to = from + 1;
        self.enemies.clear();
        self.highest_level = self.highest_level.max(to);
        self.transition = Some(LevelTransition::start(from, to));
        self.phase = GamePhase::Transitioning;
        log::info!("Level {from} complete, transitioning to level {to}");
    }

    /// Apply the next level once the fade has cleared
    pub fn finish_level_transition(&mut self) {
        let next = self.config.params_for(self.progression.counter + 1);
        self.progression.advance(next.threshold);
        self.params = next;
        self.enemies.clear();
        for player in &mut self.players {
            player.max_health = next.player_max_health;
            player.health = next.player_max_health;
            player.body.pos = Vec2::new(PLAYER_START_X, PLAYER_START_Y);
        }
        self.transition = None;
        self.last_enemy_spawn_ms = self.clock_ms;
        self.phase = GamePhase::Running;
        self.emit(GameEvent::LevelAdvanced { level: next.number });
    }

    /// Combat: next wave with bonus score and a spawn pause
    pub fn advance_wave(&mut self) {
        let next = self.config.params_for(self.progression.counter + 1);
        self.progression.advance(next.threshold);
        self.params = next;
        let bonus = next.number as u64 * WAVE_BONUS_PER_WAVE;
        self.score += bonus;
        self.enemies.clear();
        self.last_enemy_spawn_ms = self.clock_ms + WAVE_SPAWN_PAUSE_MS;
        log::info!("Wave {} begins (+{bonus} bonus)", next.number);
        self.emit(GameEvent::WaveAdvanced {
            wave: next.number,
            bonus,
        });
    }
}
