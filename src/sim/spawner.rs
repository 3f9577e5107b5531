//! Enemy and power-up spawning
//!
//! All randomness comes from the session's seeded RNG so a seed plus an
//! input script reproduces a run exactly.

use glam::Vec2;
use rand::Rng;

use super::entity::{Enemy, PowerUp, PowerUpKind, ShapeType};
use super::state::{GamePhase, Session};
use crate::consts::*;

/// Run the mode's spawn cadence for one tick
pub fn maybe_spawn(session: &mut Session, dt_ms: f64) {
    if session.phase != GamePhase::Running {
        return;
    }

    if session.config.is_duel() {
        session.enemy_spawn_timer_ms += dt_ms;
        session.power_up_timer_ms += dt_ms;

        if session.enemy_spawn_timer_ms >= session.params.spawn_rate_ms && below_cap(session) {
            spawn_enemy(session);
            session.enemy_spawn_timer_ms = 0.0;
        }
        if session.power_up_timer_ms >= DUEL_POWER_UP_INTERVAL_MS {
            spawn_power_up(session);
            session.power_up_timer_ms = 0.0;
        }
    } else if session.clock_ms - session.last_enemy_spawn_ms > session.params.spawn_rate_ms
        && below_cap(session)
    {
        spawn_enemy(session);
        session.last_enemy_spawn_ms = session.clock_ms;
    }
}

fn below_cap(session: &Session) -> bool {
    session
        .params
        .max_enemies
        .is_none_or(|max| session.enemies.len() < max)
}

/// Spawn one enemy with a uniformly random shape, scaled by the current
/// difficulty. Single modes also roll for a bonus power-up.
pub fn spawn_enemy(session: &mut Session) {
    if session.phase != GamePhase::Running {
        return;
    }

    let shape = ShapeType::ALL[session.rng.random_range(0..ShapeType::ALL.len())];
    let id = session.next_entity_id();
    let params = session.params;

    if session.config.is_duel() {
        let pos = duel_spawn_position(session);
        let mut enemy = Enemy::new(id, shape, pos.x, pos.y);
        enemy.max_health *= params.enemy_health_multiplier;
        enemy.health = enemy.max_health;
        enemy.damage *= params.enemy_damage_multiplier;
        enemy.vel = Vec2::new(
            session
                .rng
                .random_range(-DUEL_ENEMY_MAX_DRIFT..DUEL_ENEMY_MAX_DRIFT),
            session
                .rng
                .random_range(-DUEL_ENEMY_MAX_DRIFT..DUEL_ENEMY_MAX_DRIFT),
        );
        log::debug!("Spawned duel {} at ({:.0}, {:.0})", shape.as_str(), pos.x, pos.y);
        session.enemies.push(enemy);
    } else {
        let x = (session.rng.random::<f32>() * (FIELD_WIDTH - 50.0)).floor();
        let mut enemy = Enemy::new(id, shape, x, 0.0);
        enemy.max_health = (enemy.max_health * params.enemy_health_multiplier).floor();
        enemy.health = enemy.max_health;
        enemy.damage = (enemy.damage * params.enemy_damage_multiplier).floor();
        enemy.vel.y *= params.enemy_speed_multiplier;
        log::debug!("Spawned {} at x={x}", shape.as_str());
        session.enemies.push(enemy);

        if session.rng.random_bool(POWER_UP_SPAWN_CHANCE) {
            spawn_power_up(session);
        }
    }
}

/// Random point in the duel spawn area, away from both players. Gives up
/// after a bounded number of attempts and keeps the last candidate.
fn duel_spawn_position(session: &mut Session) -> Vec2 {
    let margin = DUEL_SPAWN_CLEARANCE;
    let mut candidate = Vec2::ZERO;
    for _ in 0..DUEL_SPAWN_ATTEMPTS {
        candidate = Vec2::new(
            session.rng.random_range(margin..FIELD_WIDTH - margin),
            session.rng.random_range(margin..FIELD_HEIGHT - margin),
        );
        let clear = session.players.iter().all(|p| {
            (candidate.x - p.body.pos.x).abs() >= DUEL_SPAWN_CLEARANCE
                || (candidate.y - p.body.pos.y).abs() >= DUEL_SPAWN_CLEARANCE
        });
        if clear {
            return candidate;
        }
    }
    log::debug!("No clear duel spawn point found, using last candidate");
    candidate
}

/// Spawn a power-up of a uniformly random kind
pub fn spawn_power_up(session: &mut Session) {
    if session.phase != GamePhase::Running {
        return;
    }

    let kind = PowerUpKind::ALL[session.rng.random_range(0..PowerUpKind::ALL.len())];
    let id = session.next_entity_id();

    let power_up = if session.config.is_duel() {
        let m = DUEL_EDGE_MARGIN;
        let x = session.rng.random_range(m..FIELD_WIDTH - m);
        let y = session.rng.random_range(m..FIELD_HEIGHT - m);
        let mut p = PowerUp::new(id, kind, x, y);
        p.lifetime_ms = Some(DUEL_POWER_UP_LIFETIME_MS);
        p
    } else {
        let x = (session.rng.random::<f32>() * (FIELD_WIDTH - 30.0)).floor();
        PowerUp::new(id, kind, x, 0.0)
    };

    log::debug!("Spawned {kind:?} power-up");
    session.power_ups.push(power_up);
}

/// Drop a Health power-up where an enemy died
pub fn drop_health(session: &mut Session, at: Vec2) {
    let id = session.next_entity_id();
    session
        .power_ups
        .push(PowerUp::new(id, PowerUpKind::Health, at.x, at.y));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mode::ModeConfig;

    #[test]
    fn test_single_enemy_scaling() {
        let mut s = Session::new(ModeConfig::adventure(), 3);
        s.params = crate::sim::difficulty::LevelParams::adventure(3);
        spawn_enemy(&mut s);
        let e = &s.enemies[0];
        let base = e.shape.enemy_stats();
        assert_eq!(e.max_health, (base.max_health * 1.4).floor());
        assert_eq!(e.health, e.max_health);
        assert_eq!(e.damage, (base.damage * 1.3).floor());
        assert!((e.vel.y - 2.4).abs() < 1e-5);
        assert_eq!(e.body.pos.y, 0.0);
        assert!(e.body.pos.x >= 0.0 && e.body.pos.x < FIELD_WIDTH - 50.0);
    }

    #[test]
    fn test_no_spawn_unless_running() {
        let mut s = Session::new(ModeConfig::combat(1), 3);
        s.phase = GamePhase::Paused;
        spawn_enemy(&mut s);
        spawn_power_up(&mut s);
        assert!(s.enemies.is_empty());
        assert!(s.power_ups.is_empty());
    }

    #[test]
    fn test_combat_respects_cap() {
        let mut s = Session::new(ModeConfig::combat(1), 3);
        for _ in 0..200 {
            s.clock_ms += 2000.0;
            maybe_spawn(&mut s, 2000.0);
        }
        assert_eq!(s.enemies.len(), 5);
    }

    #[test]
    fn test_adventure_cadence() {
        let mut s = Session::new(ModeConfig::adventure(), 3);
        s.clock_ms = 1500.0;
        maybe_spawn(&mut s, 16.0);
        assert!(s.enemies.is_empty());
        s.clock_ms = 1500.5;
        maybe_spawn(&mut s, 16.0);
        assert_eq!(s.enemies.len(), 1);
        assert_eq!(s.last_enemy_spawn_ms, 1500.5);
    }

    fn assert_clear_of_players(s: &Session) {
        for e in &s.enemies {
            for p in &s.players {
                let d = e.body.pos - p.body.pos;
                assert!(
                    d.x.abs() >= 100.0 || d.y.abs() >= 100.0,
                    "enemy {} at {:?} too close to player {}",
                    e.id,
                    e.body.pos,
                    p.id
                );
            }
        }
    }

    #[test]
    fn test_duel_spawns_away_from_players() {
        let mut s = Session::new(ModeConfig::duel(2), 11);
        for _ in 0..50 {
            spawn_enemy(&mut s);
        }
        for e in &s.enemies {
            let p = e.body.pos;
            assert!(p.x >= 100.0 && p.x < FIELD_WIDTH - 100.0);
            assert!(p.y >= 100.0 && p.y < FIELD_HEIGHT - 100.0);
            assert!(e.vel.x.abs() <= 1.5 && e.vel.y.abs() <= 1.5);
            let base = e.shape.enemy_stats();
            assert!((e.max_health - base.max_health * 1.4).abs() < 1e-4);
        }
        assert_clear_of_players(&s);
    }

    #[test]
    fn test_duel_spawns_around_centred_players() {
        let mut s = Session::new(ModeConfig::duel(1), 29);
        let centre = Vec2::new(FIELD_WIDTH / 2.0 - 15.0, FIELD_HEIGHT / 2.0 - 15.0);
        for p in &mut s.players {
            p.body.pos = centre;
        }
        // A sixth of the spawn area is blocked, so many draws get rejected
        for _ in 0..200 {
            spawn_enemy(&mut s);
        }
        assert_eq!(s.enemies.len(), 200);
        for e in &s.enemies {
            let p = e.body.pos;
            assert!(p.x >= 100.0 && p.x < FIELD_WIDTH - 100.0);
            assert!(p.y >= 100.0 && p.y < FIELD_HEIGHT - 100.0);
        }
        assert_clear_of_players(&s);
    }

    #[test]
    fn test_duel_power_up_timer() {
        let mut s = Session::new(ModeConfig::duel(1), 11);
        maybe_spawn(&mut s, 9_999.0);
        assert!(s.power_ups.is_empty());
        maybe_spawn(&mut s, 1.0);
        assert_eq!(s.power_ups.len(), 1);
        assert_eq!(s.power_ups[0].lifetime_ms, Some(DUEL_POWER_UP_LIFETIME_MS));
        assert_eq!(s.power_up_timer_ms, 0.0);
    }
}
