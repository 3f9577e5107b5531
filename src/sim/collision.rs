//! Collision resolution
//!
//! Runs the pairwise interactions in a fixed order once per Running tick:
//! actors vs enemies, projectiles vs enemies, actors vs power-ups,
//! projectiles vs actors (duel), then enemies leaving the field. Removal
//! while iterating walks indices in reverse.

use glam::Vec2;
use rand::Rng;

use super::entity::{PowerUpKind, ShapeType};
use super::mode::{CriticalRule, Currency, InvulnerabilityModel, WinCondition};
use super::spawner;
use super::state::{GameEvent, GamePhase, Session};
use super::timers::TimedEffect;
use crate::consts::*;

/// What happened during one resolver pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionSummary {
    pub kills: u32,
    pub criticals: u32,
    pub power_ups_collected: u32,
    pub escaped: u32,
}

/// Resolve every interaction for this tick
pub fn resolve(session: &mut Session) -> CollisionSummary {
    let mut summary = CollisionSummary::default();

    actors_vs_enemies(session);
    if session.is_over() {
        return summary;
    }
    projectiles_vs_enemies(session, &mut summary);
    actors_vs_power_ups(session, &mut summary);
    if session.config.is_duel() {
        projectiles_vs_actors(session);
    }
    if session.is_over() {
        return summary;
    }
    enemies_off_screen(session, &mut summary);

    if session.config.win_condition == WinCondition::FirstKnockout {
        check_knockout(session);
    }
    summary
}

fn actors_vs_enemies(session: &mut Session) {
    for pi in 0..session.players.len() {
        for ei in 0..session.enemies.len() {
            if session.is_over() {
                return;
            }
            let enemy = &session.enemies[ei];
            if session.players[pi].body.overlaps(&enemy.body) {
                let damage = enemy.damage;
                damage_player(session, pi, damage);
            }
        }
    }
}

fn projectiles_vs_enemies(session: &mut Session, summary: &mut CollisionSummary) {
    for pi in (0..session.projectiles.len()).rev() {
        for ei in (0..session.enemies.len()).rev() {
            let projectile = &session.projectiles[pi];
            let enemy = &session.enemies[ei];
            if !projectile.hits(&enemy.body) {
                continue;
            }

            let critical = projectile.shape.is_critical_against(enemy.shape);
            let damage = match (critical, session.config.critical) {
                (true, CriticalRule::GuaranteedKill) => enemy.max_health,
                (true, CriticalRule::DoubleDamage) => projectile.damage * 2.0,
                (false, _) => projectile.damage,
            };
            session.projectiles.remove(pi);

            if session.enemies[ei].take_damage(damage) {
                let enemy = session.enemies.remove(ei);
                summary.kills += 1;
                if critical {
                    summary.criticals += 1;
                }
                on_enemy_defeated(session, enemy.difficulty, enemy.shape, enemy.body.pos, critical);
            }
            break;
        }
    }
}

fn on_enemy_defeated(
    session: &mut Session,
    difficulty: u32,
    shape: ShapeType,
    at: Vec2,
    critical: bool,
) {
    if session.config.is_duel() {
        log::debug!("Duel enemy {} defeated", shape.as_str());
        session.emit(GameEvent::EnemyDefeated {
            shape,
            critical,
            points: 0,
        });
        return;
    }

    let points = difficulty as u64 * if critical { 20 } else { 10 };
    session.score += points;
    log::debug!(
        "Defeated {}{} for {points} points",
        shape.as_str(),
        if critical { " (critical)" } else { "" }
    );
    session.emit(GameEvent::EnemyDefeated {
        shape,
        critical,
        points,
    });

    if session.rng.random_bool(HEALTH_DROP_CHANCE) {
        spawner::drop_health(session, at);
    }

    match session.config.currency {
        Currency::Points => {
            if session.progression.add(points as u32) {
                session.begin_level_transition();
            }
        }
        Currency::Kills => {
            if session.progression.add(1) {
                session.advance_wave();
            }
        }
        Currency::None => {}
    }
}

fn actors_vs_power_ups(session: &mut Session, summary: &mut CollisionSummary) {
    for ui in (0..session.power_ups.len()).rev() {
        let body = session.power_ups[ui].body;
        let collector = session.players.iter().position(|p| p.body.overlaps(&body));
        if let Some(pi) = collector {
            let power_up = session.power_ups.remove(ui);
            apply_power_up(session, pi, power_up.kind);
            summary.power_ups_collected += 1;
        }
    }
}

/// Apply a collected power-up to the player at index `pi`
pub fn apply_power_up(session: &mut Session, pi: usize, kind: PowerUpKind) {
    let model = session.config.invulnerability;
    let clock = session.clock_ms;
    let player = &mut session.players[pi];
    let id = player.id;

    let followup = match (kind, model) {
        (PowerUpKind::Health, _) => {
            player.heal(HEALTH_POWER_UP_AMOUNT);
            None
        }
        (PowerUpKind::Shield, InvulnerabilityModel::Timed) => {
            player.invulnerable_until = Some(clock + SHIELD_INVULNERABILITY_MS);
            None
        }
        (PowerUpKind::Shield, InvulnerabilityModel::Shield) => {
            player.has_shield = true;
            Some((DUEL_EFFECT_MS, TimedEffect::ClearShield(id)))
        }
        (PowerUpKind::Speed, InvulnerabilityModel::Timed) => {
            player.speed += SPEED_POWER_UP_BONUS;
            Some((SPEED_POWER_UP_MS, TimedEffect::RevertSpeed(id)))
        }
        (PowerUpKind::Speed, InvulnerabilityModel::Shield) => {
            player.speed_boost = true;
            player.speed = DUEL_BOOSTED_SPEED;
            Some((DUEL_EFFECT_MS, TimedEffect::ClearSpeedBoost(id)))
        }
    };

    if let Some((delay, effect)) = followup {
        session.schedule(delay, effect);
    }
    log::debug!("Player {id} collected {kind:?}");
    session.emit(GameEvent::PowerUpCollected { player: id, kind });
}

fn projectiles_vs_actors(session: &mut Session) {
    for pi in (0..session.projectiles.len()).rev() {
        let Some(owner) = session.projectiles[pi].owner else {
            continue;
        };
        let target = session
            .players
            .iter()
            .position(|p| p.id != owner && session.projectiles[pi].hits(&p.body));
        if let Some(ti) = target {
            let projectile = session.projectiles.remove(pi);
            damage_player(session, ti, projectile.damage);
        }
    }
}

fn enemies_off_screen(session: &mut Session, summary: &mut CollisionSummary) {
    for ei in (0..session.enemies.len()).rev() {
        if session.enemies[ei].body.pos.y > FIELD_HEIGHT {
            session.enemies.remove(ei);
            summary.escaped += 1;
            if let Some(damage) = session.config.escape_damage {
                damage_player(session, 0, damage);
                if session.is_over() {
                    return;
                }
            }
        }
    }
}

/// Apply damage to the player at index `pi` under the mode's
/// invulnerability model
pub fn damage_player(session: &mut Session, pi: usize, amount: f32) {
    let clock = session.clock_ms;
    let player = &mut session.players[pi];
    let id = player.id;

    match session.config.invulnerability {
        InvulnerabilityModel::Timed => {
            if player.is_invulnerable() {
                return;
            }
            player.health = (player.health - amount).max(0.0);
            player.invulnerable_until = Some(clock + HIT_INVULNERABILITY_MS);

            if player.health <= 0.0 {
                player.lives = player.lives.saturating_sub(1);
                player.health = player.max_health;
                let lives = player.lives;
                log::info!("Player {id} lost a life ({lives} left)");
                session.emit(GameEvent::PlayerHit {
                    player: id,
                    damage: amount,
                });
                session.emit(GameEvent::LifeLost { lives });
                if lives == 0 {
                    session.end_game(None);
                }
                return;
            }
        }
        InvulnerabilityModel::Shield => {
            if player.has_shield {
                return;
            }
            player.health = (player.health - amount).max(0.0);
        }
    }

    session.emit(GameEvent::PlayerHit {
        player: id,
        damage: amount,
    });
}

/// Duel: the match ends as soon as either player is out of health
fn check_knockout(session: &mut Session) {
    if session.phase == GamePhase::GameOver {
        return;
    }
    let down: Vec<u8> = session
        .players
        .iter()
        .filter(|p| p.health <= 0.0)
        .map(|p| p.id)
        .collect();

    let winner = match down.as_slice() {
        [] => return,
        [loser] => session
            .players
            .iter()
            .find(|p| p.id != *loser)
            .map_or(0, |p| p.id),
        _ => 0,
    };
    session.end_game(Some(winner));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Enemy, PowerUp, Projectile};
    use crate::sim::mode::ModeConfig;
    use proptest::prelude::*;

    fn shot(id: u32, shape: ShapeType, pos: Vec2, owner: Option<u8>) -> Projectile {
        Projectile {
            id,
            shape,
            pos,
            vel: Vec2::ZERO,
            damage: PROJECTILE_DAMAGE,
            owner,
        }
    }

    fn adventure_with_triangle() -> Session {
        let mut s = Session::new(ModeConfig::adventure(), 42);
        s.enemies.push(Enemy::new(100, ShapeType::Triangle, 100.0, 100.0));
        s
    }

    #[test]
    fn test_triangle_kill_scores_twenty_or_forty() {
        // Non-critical: chip the enemy down first
        let mut s = adventure_with_triangle();
        s.enemies[0].health = PROJECTILE_DAMAGE;
        s.projectiles
            .push(shot(1, ShapeType::Circle, Vec2::new(110.0, 110.0), None));
        let summary = resolve(&mut s);
        assert_eq!(summary.kills, 1);
        assert_eq!(s.score, 20);

        // Critical: guaranteed kill from full health
        let mut s = adventure_with_triangle();
        s.projectiles
            .push(shot(1, ShapeType::Triangle, Vec2::new(110.0, 110.0), None));
        let summary = resolve(&mut s);
        assert_eq!(summary.criticals, 1);
        assert_eq!(s.score, 40);
        assert!(s.enemies.is_empty());
        assert!(s.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_hits_only_one_enemy() {
        let mut s = Session::new(ModeConfig::combat(1), 1);
        s.enemies.push(Enemy::new(1, ShapeType::Cube, 100.0, 100.0));
        s.enemies.push(Enemy::new(2, ShapeType::Cube, 100.0, 100.0));
        s.projectiles
            .push(shot(3, ShapeType::Circle, Vec2::new(110.0, 110.0), None));
        resolve(&mut s);
        let hurt = s.enemies.iter().filter(|e| e.health < e.max_health).count();
        assert_eq!(hurt, 1);
        // Reverse iteration: the last enemy is hit first
        assert!(s.enemies[1].health < s.enemies[1].max_health);
    }

    #[test]
    fn test_contact_damage_starts_invulnerability() {
        let mut s = Session::new(ModeConfig::adventure(), 1);
        s.clock_ms = 1000.0;
        let pos = s.players[0].body.pos;
        s.enemies.push(Enemy::new(1, ShapeType::Cube, pos.x + 5.0, pos.y + 5.0));
        resolve(&mut s);
        assert_eq!(s.players[0].health, 90.0);
        assert_eq!(s.players[0].invulnerable_until, Some(2500.0));
        resolve(&mut s);
        assert_eq!(s.players[0].health, 90.0);
    }

    #[test]
    fn test_last_life_ends_game_once() {
        let mut s = Session::new(ModeConfig::combat(1), 1);
        s.players[0].lives = 1;
        s.players[0].health = 5.0;
        let pos = s.players[0].body.pos;
        s.enemies.push(Enemy::new(1, ShapeType::Cube, pos.x, pos.y));
        s.enemies.push(Enemy::new(2, ShapeType::Cube, pos.x, pos.y));
        resolve(&mut s);
        assert_eq!(s.players[0].lives, 0);
        assert_eq!(s.phase, GamePhase::GameOver);
        resolve(&mut s);
        let overs = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver(_)))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_combat_escape_costs_health() {
        let mut s = Session::new(ModeConfig::combat(1), 1);
        s.enemies
            .push(Enemy::new(1, ShapeType::Circle, 10.0, FIELD_HEIGHT + 1.0));
        let summary = resolve(&mut s);
        assert_eq!(summary.escaped, 1);
        assert!(s.enemies.is_empty());
        assert_eq!(s.players[0].health, 100.0 - ESCAPE_DAMAGE);

        let mut s = Session::new(ModeConfig::adventure(), 1);
        s.enemies
            .push(Enemy::new(1, ShapeType::Circle, 10.0, FIELD_HEIGHT + 1.0));
        resolve(&mut s);
        assert_eq!(s.players[0].health, 100.0);
    }

    #[test]
    fn test_wave_advances_after_required_kills() {
        let mut s = Session::new(ModeConfig::combat(1), 1);
        s.progression.accumulator = 9;
        s.enemies.push(Enemy::new(1, ShapeType::Circle, 100.0, 100.0));
        s.enemies.push(Enemy::new(2, ShapeType::Cube, 300.0, 100.0));
        s.projectiles
            .push(shot(3, ShapeType::Circle, Vec2::new(110.0, 110.0), None));
        resolve(&mut s);
        assert_eq!(s.progression.counter, 2);
        assert_eq!(s.progression.accumulator, 0);
        // 20 for the critical circle plus a 100 wave bonus
        assert_eq!(s.score, 120);
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn test_shielded_duel_player_absorbs_projectile() {
        let mut s = Session::new(ModeConfig::duel(1), 1);
        s.players[1].has_shield = true;
        let target = s.players[1].body.pos + Vec2::splat(10.0);
        s.projectiles.push(Projectile {
            damage: DUEL_PROJECTILE_DAMAGE,
            ..shot(1, ShapeType::Circle, target, Some(1))
        });
        resolve(&mut s);
        assert_eq!(s.players[1].health, 100.0);
        assert!(s.projectiles.is_empty());
    }

    #[test]
    fn test_duel_no_friendly_fire() {
        let mut s = Session::new(ModeConfig::duel(1), 1);
        let own = s.players[0].body.pos + Vec2::splat(10.0);
        s.projectiles.push(shot(1, ShapeType::Circle, own, Some(1)));
        resolve(&mut s);
        assert_eq!(s.players[0].health, 100.0);
        assert_eq!(s.projectiles.len(), 1);
    }

    #[test]
    fn test_duel_knockout_and_draw() {
        let mut s = Session::new(ModeConfig::duel(1), 1);
        s.players[1].health = 0.0;
        resolve(&mut s);
        assert!(s.is_over());
        assert!(s.timers.pending().any(|e| matches!(
            e,
            TimedEffect::AnnounceGameOver(r) if r.winner == Some(1)
        )));

        let mut s = Session::new(ModeConfig::duel(1), 1);
        s.players[0].health = 0.0;
        s.players[1].health = 0.0;
        resolve(&mut s);
        assert!(s.timers.pending().any(|e| matches!(
            e,
            TimedEffect::AnnounceGameOver(r) if r.winner == Some(0)
        )));
    }

    #[test]
    fn test_duel_critical_doubles_damage() {
        let mut s = Session::new(ModeConfig::duel(1), 1);
        s.enemies.push(Enemy::new(1, ShapeType::Cube, 300.0, 300.0));
        s.enemies[0].max_health = 100.0;
        s.enemies[0].health = 100.0;
        s.projectiles.push(Projectile {
            damage: DUEL_PROJECTILE_DAMAGE,
            ..shot(2, ShapeType::Cube, Vec2::new(310.0, 310.0), Some(1))
        });
        resolve(&mut s);
        assert_eq!(s.enemies[0].health, 80.0);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn test_power_up_first_player_wins() {
        let mut s = Session::new(ModeConfig::duel(1), 1);
        let pos = Vec2::new(200.0, 300.0);
        s.players[0].body.pos = pos;
        s.players[1].body.pos = pos;
        s.power_ups
            .push(PowerUp::new(1, PowerUpKind::Shield, pos.x + 5.0, pos.y + 5.0));
        resolve(&mut s);
        assert!(s.players[0].has_shield);
        assert!(!s.players[1].has_shield);
        assert!(s.power_ups.is_empty());
        assert_eq!(s.timers.len(), 1);
    }

    #[test]
    fn test_speed_power_up_schedules_revert() {
        let mut s = Session::new(ModeConfig::adventure(), 1);
        apply_power_up(&mut s, 0, PowerUpKind::Speed);
        assert_eq!(s.players[0].speed, PLAYER_BASE_SPEED + SPEED_POWER_UP_BONUS);
        assert!(
            s.timers
                .pending()
                .any(|e| *e == TimedEffect::RevertSpeed(1))
        );
    }

    proptest! {
        #[test]
        fn enemy_health_stays_in_range(
            seed in 0u64..1000,
            hits in proptest::collection::vec((0usize..3, 0.0f32..800.0, 0.0f32..600.0), 1..40),
        ) {
            let mut s = Session::new(ModeConfig::combat(1), seed);
            for i in 0..6u32 {
                let shape = ShapeType::ALL[(i % 3) as usize];
                s.enemies.push(Enemy::new(i + 1, shape, i as f32 * 120.0, 200.0));
            }
            for (n, (shape, x, y)) in hits.into_iter().enumerate() {
                s.projectiles.push(shot(100 + n as u32, ShapeType::ALL[shape], Vec2::new(x, y), None));
                resolve(&mut s);
                for e in &s.enemies {
                    prop_assert!(e.health > 0.0 && e.health <= e.max_health);
                }
            }
        }
    }
}
