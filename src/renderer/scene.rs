//! Scene geometry
//!
//! Turns the arcade state into one triangle list in play-field pixels.
//! Text (titles, score, lives, captions) is left to the DOM HUD.

use glam::Vec2;

use super::shapes::{bar, circle, rect, rect_outline, ring, shape_glyph};
use super::vertex::{Vertex, colors};
use crate::arcade::{Arcade, Screen};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GamePhase, ModeKind, Player, PowerUp, PowerUpKind, Session};

const GRID_SPACING: f32 = 20.0;
const HEALTH_BAR_HEIGHT: f32 = 15.0;
const LEVEL_BAR_HEIGHT: f32 = 8.0;
const HUD_BAR_WIDTH: f32 = 200.0;
const ENEMY_BAR_OFFSET: f32 = 10.0;
const ENEMY_BAR_HEIGHT: f32 = 5.0;
const BLINK_MS: f64 = 200.0;

const MATCH_HALO: [f32; 4] = colors::with_alpha(colors::ACCENT_YELLOW, 0.4);
const INVULNERABLE_FLASH: [f32; 4] = colors::with_alpha(colors::WHITE, 0.4);
const PAUSE_SHADE: [f32; 4] = [0.0, 0.0, 0.0, 0.6];
const MODAL_SHADE: [f32; 4] = [0.0, 0.0, 0.0, 0.8];

/// Build the frame for the current screen
pub fn build(arcade: &Arcade, settings: &Settings) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(4096);
    background(&mut out);

    match arcade.screen {
        Screen::Menu => menu(&mut out),
        Screen::LevelSelect { pending, .. } => {
            menu(&mut out);
            level_select(&mut out, pending, arcade.health_preview());
        }
        Screen::Playing => {
            if let Some(session) = arcade.session() {
                session_scene(&mut out, session, settings);
            }
        }
    }

    out
}

fn background(out: &mut Vec<Vertex>) {
    out.extend(rect(
        Vec2::ZERO,
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
        colors::BACKGROUND,
    ));

    let mut x = 0.0;
    while x < FIELD_WIDTH {
        out.extend(rect(Vec2::new(x, 0.0), Vec2::new(1.0, FIELD_HEIGHT), colors::PANEL));
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y < FIELD_HEIGHT {
        out.extend(rect(Vec2::new(0.0, y), Vec2::new(FIELD_WIDTH, 1.0), colors::PANEL));
        y += GRID_SPACING;
    }
}

/// Adventure, combat and duel boxes side by side
fn menu(out: &mut Vec<Vertex>) {
    const BOX: Vec2 = Vec2::new(240.0, 100.0);
    const MARGIN: f32 = 20.0;

    let total = BOX.x * 3.0 + MARGIN * 2.0;
    let start_x = (FIELD_WIDTH - total) / 2.0;
    let y = FIELD_HEIGHT / 2.0;
    let borders = [
        colors::SUCCESS_GREEN,
        colors::ACCENT_YELLOW,
        colors::HEALTH_RED,
    ];

    for (i, border) in borders.into_iter().enumerate() {
        let pos = Vec2::new(start_x + i as f32 * (BOX.x + MARGIN), y);
        out.extend(rect(pos, BOX, colors::PANEL));
        out.extend(rect_outline(pos, BOX, 2.0, border));
    }
}

fn level_select(out: &mut Vec<Vertex>, pending: u32, health_preview: Option<f32>) {
    const BOX: f32 = 60.0;
    const MARGIN: f32 = 20.0;

    out.extend(rect(
        Vec2::ZERO,
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
        MODAL_SHADE,
    ));

    let count = MAX_LEVEL - MIN_LEVEL + 1;
    let total = BOX * count as f32 + MARGIN * (count - 1) as f32;
    let start_x = (FIELD_WIDTH - total) / 2.0;
    let y = FIELD_HEIGHT / 2.0;

    for level in MIN_LEVEL..=MAX_LEVEL {
        let pos = Vec2::new(start_x + (level - MIN_LEVEL) as f32 * (BOX + MARGIN), y);
        let fill = if level == pending {
            colors::SUCCESS_GREEN
        } else {
            colors::BAR_TRACK
        };
        out.extend(rect(pos, Vec2::splat(BOX), fill));
        out.extend(rect_outline(pos, Vec2::splat(BOX), 2.0, colors::WHITE));
    }

    if let Some(health) = health_preview {
        let fraction = health / 100.0;
        health_bar(out, Vec2::new(start_x, y + BOX + 30.0), total, fraction);
    }
}

fn session_scene(out: &mut Vec<Vertex>, session: &Session, settings: &Settings) {
    let duel = session.config.is_duel();

    for enemy in &session.enemies {
        out.extend(shape_glyph(
            enemy.shape,
            &enemy.body,
            colors::enemy(enemy.shape),
        ));
        if settings.enemy_health_bars {
            out.extend(bar(
                Vec2::new(enemy.body.pos.x, enemy.body.pos.y - ENEMY_BAR_OFFSET),
                Vec2::new(enemy.body.size.x, ENEMY_BAR_HEIGHT),
                enemy.health / enemy.max_health,
                colors::HEALTH_RED,
                colors::BAR_TRACK,
            ));
        }
        // Critical-hit hint
        if session.players.iter().any(|p| p.shape == enemy.shape) {
            out.extend(circle(
                enemy.body.center(),
                enemy.body.size.x / 2.0 + 5.0,
                MATCH_HALO,
                24,
            ));
        }
    }

    for projectile in &session.projectiles {
        let color = match projectile.owner {
            Some(owner) if duel => colors::duel_player(owner),
            _ => colors::player(projectile.shape),
        };
        let body = projectile.body();
        out.extend(rect(body.pos, body.size, color));
    }

    for power_up in &session.power_ups {
        power_up_glyph(out, power_up);
    }

    for player in &session.players {
        player_glyph(out, player, session.clock_ms, duel, settings);
    }

    hud(out, session);
    overlays(out, session, settings);
}

fn power_up_glyph(out: &mut Vec<Vertex>, power_up: &PowerUp) {
    let p = power_up.body.pos;
    let color = colors::power_up(power_up.kind);
    match power_up.kind {
        PowerUpKind::Health => {
            // Cross
            out.extend(rect(p + Vec2::new(5.0, 0.0), Vec2::new(5.0, 15.0), color));
            out.extend(rect(p + Vec2::new(0.0, 5.0), Vec2::new(15.0, 5.0), color));
        }
        PowerUpKind::Shield => {
            out.extend(ring(power_up.body.center(), 4.5, 7.5, color, 16));
        }
        PowerUpKind::Speed => {
            // Lightning bolt: slanted upper band plus a lower spike
            let v = |x: f32, y: f32| Vertex::new(p.x + x, p.y + y, color);
            out.extend([
                v(7.0, 0.0),
                v(12.0, 0.0),
                v(3.0, 5.0),
                v(12.0, 0.0),
                v(8.0, 5.0),
                v(3.0, 5.0),
                v(7.0, 5.0),
                v(12.0, 5.0),
                v(3.0, 10.0),
            ]);
        }
    }
}

fn player_glyph(
    out: &mut Vec<Vertex>,
    player: &Player,
    clock_ms: f64,
    duel: bool,
    settings: &Settings,
) {
    out.extend(shape_glyph(
        player.shape,
        &player.body,
        colors::player(player.shape),
    ));

    if duel {
        // Ownership strip under the body
        out.extend(rect(
            Vec2::new(player.body.pos.x, player.body.pos.y + player.body.size.y + 2.0),
            Vec2::new(player.body.size.x, 3.0),
            colors::duel_player(player.id),
        ));
    }

    if player.has_shield {
        let radius = player.body.size.x / 2.0;
        out.extend(ring(
            player.body.center(),
            radius + 3.0,
            radius + 6.0,
            colors::ACCENT_YELLOW,
            24,
        ));
    }

    if player.is_invulnerable() {
        let lit = !settings.effective_blink() || (clock_ms / BLINK_MS).floor() as u64 % 2 == 0;
        if lit {
            out.extend(rect(player.body.pos, player.body.size, INVULNERABLE_FLASH));
        }
    }
}

fn health_bar(out: &mut Vec<Vertex>, pos: Vec2, width: f32, fraction: f32) {
    let size = Vec2::new(width, HEALTH_BAR_HEIGHT);
    out.extend(bar(
        pos,
        size,
        fraction,
        colors::health(fraction),
        colors::BAR_TRACK,
    ));
    out.extend(rect_outline(pos, size, 1.0, colors::TEXT));
}

fn hud(out: &mut Vec<Vertex>, session: &Session) {
    match session.config.kind {
        ModeKind::Duel => {
            let anchors = [
                Vec2::new(20.0, FIELD_HEIGHT - 30.0),
                Vec2::new(20.0, 20.0),
            ];
            for (player, pos) in session.players.iter().zip(anchors) {
                health_bar(out, pos, HUD_BAR_WIDTH, player.health / player.max_health);
            }
        }
        ModeKind::Adventure | ModeKind::Combat => {
            if let Some(player) = session.players.first() {
                health_bar(
                    out,
                    Vec2::new(10.0, FIELD_HEIGHT - 80.0),
                    HUD_BAR_WIDTH,
                    player.health / player.max_health,
                );
            }
            let pos = Vec2::new(10.0, FIELD_HEIGHT - 60.0);
            let size = Vec2::new(HUD_BAR_WIDTH, LEVEL_BAR_HEIGHT);
            out.extend(bar(
                pos,
                size,
                session.progression.fraction(),
                colors::ACCENT_YELLOW,
                colors::BAR_TRACK,
            ));
            out.extend(rect_outline(pos, size, 1.0, colors::TEXT));
        }
    }
}

fn overlays(out: &mut Vec<Vertex>, session: &Session, settings: &Settings) {
    let field = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT);
    match session.phase {
        GamePhase::Running => {}
        GamePhase::Paused => out.extend(rect(Vec2::ZERO, field, PAUSE_SHADE)),
        GamePhase::Transitioning => {
            let alpha = session.transition.as_ref().map_or(0.0, |t| t.alpha());
            if settings.effective_fade() && alpha > 0.0 {
                out.extend(rect(Vec2::ZERO, field, [0.0, 0.0, 0.0, alpha]));
            }
        }
        GamePhase::GameOver => out.extend(rect(Vec2::ZERO, field, MODAL_SHADE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Enemy, ModeConfig, ShapeType};

    fn has_color(vertices: &[Vertex], color: [f32; 4]) -> bool {
        vertices.iter().any(|v| v.color == color)
    }

    fn playing(config: ModeConfig) -> Arcade {
        let mut arcade = Arcade::new(3);
        arcade.start(config);
        arcade
    }

    #[test]
    fn test_menu_stays_inside_field() {
        let vertices = build(&Arcade::new(1), &Settings::default());
        assert!(!vertices.is_empty());
        assert!(vertices.iter().all(|v| {
            (0.0..=FIELD_WIDTH).contains(&v.position[0])
                && (0.0..=FIELD_HEIGHT).contains(&v.position[1])
        }));
    }

    #[test]
    fn test_level_select_highlights_pending() {
        let mut arcade = Arcade::new(1);
        arcade.screen = Screen::LevelSelect {
            mode: ModeKind::Duel,
            pending: 2,
        };
        let vertices = build(&arcade, &Settings::default());
        // Adventure box border plus the pending level; no health preview for duel
        let green = vertices
            .iter()
            .filter(|v| v.color == colors::SUCCESS_GREEN)
            .count();
        assert_eq!(green, 6 + 24);
    }

    #[test]
    fn test_enemy_health_bars_toggle() {
        let mut arcade = playing(ModeConfig::adventure());
        let session = arcade.session_mut().unwrap();
        session.enemies.push(Enemy::new(1, ShapeType::Cube, 100.0, 100.0));

        let with_bars = build(&arcade, &Settings::default());
        let without = build(
            &arcade,
            &Settings {
                enemy_health_bars: false,
                ..Settings::default()
            },
        );
        assert!(with_bars.len() > without.len());
    }

    #[test]
    fn test_matching_shape_halo() {
        let mut arcade = playing(ModeConfig::adventure());
        let session = arcade.session_mut().unwrap();
        session.enemies.push(Enemy::new(1, ShapeType::Triangle, 100.0, 100.0));

        session.players[0].shape = ShapeType::Triangle;
        assert!(has_color(&build(&arcade, &Settings::default()), MATCH_HALO));

        arcade.session_mut().unwrap().players[0].shape = ShapeType::Circle;
        assert!(!has_color(&build(&arcade, &Settings::default()), MATCH_HALO));
    }

    #[test]
    fn test_invulnerability_blinks() {
        let mut arcade = playing(ModeConfig::adventure());
        let session = arcade.session_mut().unwrap();
        session.players[0].invulnerable_until = Some(1_500.0);

        session.clock_ms = 50.0;
        assert!(has_color(&build(&arcade, &Settings::default()), INVULNERABLE_FLASH));

        arcade.session_mut().unwrap().clock_ms = 250.0;
        assert!(!has_color(&build(&arcade, &Settings::default()), INVULNERABLE_FLASH));

        // Reduced motion keeps the flash steady
        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(has_color(&build(&arcade, &calm), INVULNERABLE_FLASH));
    }

    #[test]
    fn test_pause_and_game_over_shades() {
        let mut arcade = playing(ModeConfig::combat(1));
        arcade.session_mut().unwrap().phase = GamePhase::Paused;
        assert!(has_color(&build(&arcade, &Settings::default()), PAUSE_SHADE));

        arcade.session_mut().unwrap().end_game(None);
        let vertices = build(&arcade, &Settings::default());
        assert!(has_color(&vertices, MODAL_SHADE));
        assert!(!has_color(&vertices, PAUSE_SHADE));
    }

    #[test]
    fn test_transition_fade_respects_reduced_motion() {
        let mut arcade = playing(ModeConfig::adventure());
        let session = arcade.session_mut().unwrap();
        session.begin_level_transition();
        session.transition.as_mut().unwrap().update(120.0);
        let alpha = session.transition.as_ref().unwrap().alpha();
        assert!(alpha > 0.0);

        let fade = [0.0, 0.0, 0.0, alpha];
        assert!(has_color(&build(&arcade, &Settings::default()), fade));
        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!has_color(&build(&arcade, &calm), fade));
    }

    #[test]
    fn test_duel_projectiles_use_owner_tint() {
        let mut arcade = playing(ModeConfig::duel(1));
        let session = arcade.session_mut().unwrap();
        session.players[1].shape = ShapeType::Cube;
        let id = session.next_entity_id();
        session.projectiles.push(crate::sim::Projectile {
            id,
            shape: ShapeType::Cube,
            pos: Vec2::new(300.0, 300.0),
            vel: Vec2::new(0.0, 8.0),
            damage: DUEL_PROJECTILE_DAMAGE,
            owner: Some(2),
        });
        let vertices = build(&arcade, &Settings::default());
        let tinted = vertices
            .iter()
            .filter(|v| {
                v.color == colors::DUEL_P2 && (300.0..=305.0).contains(&v.position[1])
            })
            .count();
        assert!(tinted >= 6);
    }
}
