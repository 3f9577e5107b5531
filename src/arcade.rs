//! Session lifecycle around the simulation
//!
//! `Menu -> LevelSelect -> Playing` with the session's own phases
//! (Running, Paused, Transitioning, GameOver) underneath. The arcade owns
//! at most one session; dropping it stops spawning and cancels every
//! pending timed effect.

use crate::consts::*;
use crate::platform::{ControlScheme, Key, KeyFrame};
use crate::sim::difficulty::combat_player_max_health;
use crate::sim::{GameEvent, GamePhase, ModeConfig, ModeKind, Session, TickInput, tick};

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    /// Choosing a starting level for combat or duel
    LevelSelect { mode: ModeKind, pending: u32 },
    /// A session exists (running, paused, fading or over)
    Playing,
}

#[derive(Debug)]
pub struct Arcade {
    pub screen: Screen,
    session: Option<Session>,
    seed: u64,
    sessions_started: u64,
}

impl Arcade {
    pub fn new(seed: u64) -> Self {
        Self {
            screen: Screen::Menu,
            session: None,
            seed,
            sessions_started: 0,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Combat max health for the pending level on the level-select screen
    pub fn health_preview(&self) -> Option<f32> {
        match self.screen {
            Screen::LevelSelect {
                mode: ModeKind::Combat,
                pending,
            } => Some(combat_player_max_health(pending)),
            _ => None,
        }
    }

    /// Handle one frame of input and advance the session by one tick.
    /// Returns the events the session emitted.
    pub fn update(&mut self, frame: &KeyFrame, dt_ms: f64) -> Vec<GameEvent> {
        match self.screen {
            Screen::Menu => {
                if frame.was_pressed(Key::Char('s')) {
                    self.screen = Screen::LevelSelect {
                        mode: ModeKind::Combat,
                        pending: MIN_LEVEL,
                    };
                } else if frame.was_pressed(Key::Char('d')) {
                    self.screen = Screen::LevelSelect {
                        mode: ModeKind::Duel,
                        pending: MIN_LEVEL,
                    };
                } else if frame.was_pressed(Key::Char('a')) {
                    self.start(ModeConfig::adventure());
                }
                Vec::new()
            }
            Screen::LevelSelect { mode, pending } => {
                if frame.was_pressed(Key::Escape) {
                    self.screen = Screen::Menu;
                } else if frame.was_pressed(Key::Enter) {
                    let config = match mode {
                        ModeKind::Duel => ModeConfig::duel(pending),
                        _ => ModeConfig::combat(pending),
                    };
                    self.start(config);
                } else if let Some(d) = frame.pressed_digit() {
                    let level = d as u32;
                    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
                        self.screen = Screen::LevelSelect {
                            mode,
                            pending: level,
                        };
                    }
                }
                Vec::new()
            }
            Screen::Playing => self.update_session(frame, dt_ms),
        }
    }

    fn update_session(&mut self, frame: &KeyFrame, dt_ms: f64) -> Vec<GameEvent> {
        if frame.was_pressed(Key::Escape) {
            self.stop();
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            self.screen = Screen::Menu;
            return Vec::new();
        };

        let mut input = TickInput {
            pause: frame.was_pressed(Key::Char('p')),
            restart: session.is_over() && frame.was_pressed(Key::Enter),
            ..Default::default()
        };
        if session.config.is_duel() {
            input.players[0] = ControlScheme::DuelPlayer1.resolve(frame);
            input.players[1] = ControlScheme::DuelPlayer2.resolve(frame);
        } else {
            input.players[0] = ControlScheme::Single.resolve(frame);
        }

        tick(session, &input, dt_ms);
        session.drain_events()
    }

    /// Start a fresh session; each one gets its own seed
    pub fn start(&mut self, config: ModeConfig) {
        let seed = self
            .seed
            .wrapping_add(self.sessions_started.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.sessions_started += 1;
        self.session = Some(Session::new(config, seed));
        self.screen = Screen::Playing;
    }

    /// Drop the session and return to the menu
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!(
                "Stopped {:?} session (score {})",
                session.config.kind,
                session.score
            );
        }
        self.screen = Screen::Menu;
    }

    /// Host lost focus or the tab went hidden
    pub fn auto_pause(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.phase == GamePhase::Running {
                session.phase = GamePhase::Paused;
                log::info!("Auto-paused");
            }
        }
    }
}
