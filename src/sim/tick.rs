//! Fixed timestep simulation tick
//!
//! Advances one session deterministically: input, spawning, movement,
//! collisions, invulnerability expiry, then any timed effects that came due.

use glam::Vec2;

use super::collision;
use super::entity::{Projectile, ShapeType};
use super::mode::{ModeKind, PowerUpExpiry};
use super::state::{GameEvent, GamePhase, Session};
use super::timers::TimedEffect;
use crate::consts::*;

/// One player's commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Movement per axis in units of the player's speed
    pub dx: f32,
    pub dy: f32,
    pub fire: bool,
    /// Shape to switch to
    pub shape: Option<ShapeType>,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Indexed by player order; the second slot is ignored outside duel
    pub players: [PlayerInput; 2],
    /// Pause toggle
    pub pause: bool,
    /// Restart after game over
    pub restart: bool,
}

/// Advance the session by one fixed timestep of `dt_ms`
pub fn tick(session: &mut Session, input: &TickInput, dt_ms: f64) {
    // Handle pause toggle
    if input.pause {
        match session.phase {
            GamePhase::Running => {
                session.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                session.phase = GamePhase::Running;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    match session.phase {
        GamePhase::Paused => {}
        GamePhase::GameOver => {
            if input.restart {
                session.restart();
                return;
            }
            // Frozen, but delayed notifications still come due
            session.clock_ms += dt_ms;
            run_timers(session);
        }
        GamePhase::Transitioning => {
            let finished = session
                .transition
                .as_mut()
                .is_none_or(|t| t.update(dt_ms));
            if finished {
                session.finish_level_transition();
            }
        }
        GamePhase::Running => {
            session.clock_ms += dt_ms;
            apply_input(session, input);
            super::spawner::maybe_spawn(session, dt_ms);
            move_entities(session, dt_ms);
            collision::resolve(session);
            expire_invulnerability(session);
            run_timers(session);
        }
    }
}

fn apply_input(session: &mut Session, input: &TickInput) {
    let duel = session.config.is_duel();
    for pi in 0..session.players.len() {
        let Some(cmd) = input.players.get(pi).copied() else {
            break;
        };
        let clock = session.clock_ms;
        let player = &mut session.players[pi];

        if let Some(shape) = cmd.shape {
            player.shape = shape;
        }

        if cmd.dx != 0.0 || cmd.dy != 0.0 {
            player.body.pos += Vec2::new(cmd.dx, cmd.dy) * player.speed;
            if duel {
                player.clamp_to_field(DUEL_EDGE_MARGIN, FIELD_WIDTH, FIELD_HEIGHT);
            } else {
                player.clamp_to_field(
                    0.0,
                    FIELD_WIDTH - player.body.size.x,
                    FIELD_HEIGHT - player.body.size.y,
                );
            }
        }

        if cmd.fire && player.can_fire(clock) {
            player.last_shot_ms = Some(clock);
            fire(session, pi);
        }
    }
}

/// Spawn the player's shot pattern for the current level or wave
fn fire(session: &mut Session, pi: usize) {
    let player = &session.players[pi];
    let shape = player.shape;
    let pos = player.body.pos;
    let owner = player.id;
    let n = session.progression.counter;

    // (x offset, y offset, dx, dy)
    let mut pattern: Vec<(f32, f32, f32, f32)> = Vec::new();
    let damage = match session.config.kind {
        ModeKind::Duel => {
            let dy = if owner == 1 {
                -DUEL_PROJECTILE_SPEED
            } else {
                DUEL_PROJECTILE_SPEED
            };
            pattern.push((ACTOR_SIZE / 2.0, ACTOR_SIZE / 2.0, 0.0, dy));
            DUEL_PROJECTILE_DAMAGE
        }
        ModeKind::Adventure => {
            let v = -PROJECTILE_SPEED;
            pattern.push((0.0, 0.0, 0.0, v));
            if n >= 2 {
                pattern.extend([(-8.0, 0.0, 0.0, v), (8.0, 0.0, 0.0, v)]);
            }
            if n >= 3 {
                pattern.extend([(-4.0, -5.0, 0.0, v), (4.0, -5.0, 0.0, v)]);
            }
            if n >= 5 {
                pattern.extend([(-12.0, 0.0, -1.0, -19.0), (12.0, 0.0, 1.0, -19.0)]);
            }
            PROJECTILE_DAMAGE
        }
        ModeKind::Combat => {
            let v = -PROJECTILE_SPEED;
            pattern.push((0.0, 0.0, 0.0, v));
            if n >= 2 {
                pattern.extend([(-8.0, 0.0, 0.0, v), (8.0, 0.0, 0.0, v)]);
            }
            if n >= 4 {
                pattern.extend([(-12.0, 0.0, -2.0, -18.0), (12.0, 0.0, 2.0, -18.0)]);
            }
            if n >= 6 {
                pattern.extend([(-16.0, 0.0, -4.0, -16.0), (16.0, 0.0, 4.0, -16.0)]);
            }
            PROJECTILE_DAMAGE
        }
    };

    // Single-mode shots leave from just left of the body center
    let origin = if session.config.is_duel() {
        pos
    } else {
        pos + Vec2::new(ACTOR_SIZE / 2.0 - 2.0, 0.0)
    };

    for (ox, oy, dx, dy) in pattern {
        let id = session.next_entity_id();
        session.projectiles.push(Projectile {
            id,
            shape,
            pos: origin + Vec2::new(ox, oy),
            vel: Vec2::new(dx, dy),
            damage,
            owner: session.config.is_duel().then_some(owner),
        });
    }
}

fn move_entities(session: &mut Session, dt_ms: f64) {
    let duel = session.config.is_duel();
    for enemy in &mut session.enemies {
        if duel {
            enemy.move_bouncing(DUEL_EDGE_MARGIN, FIELD_WIDTH, FIELD_HEIGHT);
        } else {
            enemy.move_step();
        }
    }

    for i in (0..session.projectiles.len()).rev() {
        session.projectiles[i].move_step();
        if session.projectiles[i].is_outside(FIELD_WIDTH, FIELD_HEIGHT) {
            session.projectiles.remove(i);
        }
    }

    let expiry = session.config.power_up_expiry;
    for i in (0..session.power_ups.len()).rev() {
        let power_up = &mut session.power_ups[i];
        power_up.move_step();
        let expired = match expiry {
            PowerUpExpiry::OffScreen => power_up.body.pos.y > FIELD_HEIGHT,
            PowerUpExpiry::Lifetime => match power_up.lifetime_ms.as_mut() {
                Some(left) => {
                    *left -= dt_ms;
                    *left <= 0.0
                }
                None => power_up.body.pos.y > FIELD_HEIGHT,
            },
        };
        if expired {
            session.power_ups.remove(i);
        }
    }
}

fn expire_invulnerability(session: &mut Session) {
    let clock = session.clock_ms;
    for player in &mut session.players {
        if player.invulnerable_until.is_some_and(|until| clock > until) {
            player.invulnerable_until = None;
        }
    }
}

fn run_timers(session: &mut Session) {
    for effect in session.timers.drain_due(session.clock_ms, session.generation) {
        apply_timed_effect(session, effect);
    }
}

fn apply_timed_effect(session: &mut Session, effect: TimedEffect) {
    match effect {
        TimedEffect::RevertSpeed(id) => {
            if let Some(p) = session.player_mut(id) {
                p.speed = (p.speed - SPEED_POWER_UP_BONUS).max(PLAYER_BASE_SPEED);
            }
        }
        TimedEffect::ClearShield(id) => {
            if let Some(p) = session.player_mut(id) {
                p.has_shield = false;
            }
        }
        TimedEffect::ClearSpeedBoost(id) => {
            if let Some(p) = session.player_mut(id) {
                p.speed_boost = false;
                p.speed = DUEL_SPEED;
            }
        }
        TimedEffect::AnnounceGameOver(report) => {
            session.emit(GameEvent::GameOver(report));
        }
    }
}
