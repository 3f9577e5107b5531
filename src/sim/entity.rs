//! Entities: shapes, bodies and the two collision tests
//!
//! Every entity is an axis-aligned rectangle whose `pos` is its top-left
//! corner. Actor contacts use strict rectangle overlap; projectiles are
//! tested as a single point against the target rectangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Shape of an actor or projectile; matching shapes score a critical hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Circle,
    Triangle,
    Cube,
}

/// Base stats for a freshly constructed enemy of a given shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub max_health: f32,
    pub damage: f32,
    /// Score tier
    pub difficulty: u32,
    pub speed: f32,
}

impl ShapeType {
    pub const ALL: [ShapeType; 3] = [ShapeType::Circle, ShapeType::Triangle, ShapeType::Cube];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Circle => "Circle",
            ShapeType::Triangle => "Triangle",
            ShapeType::Cube => "Cube",
        }
    }

    pub fn enemy_stats(&self) -> EnemyStats {
        let (max_health, damage, difficulty) = match self {
            ShapeType::Circle => (30.0, 5.0, 1),
            ShapeType::Triangle => (40.0, 8.0, 2),
            ShapeType::Cube => (50.0, 10.0, 3),
        };
        EnemyStats {
            max_health,
            damage,
            difficulty,
            speed: ENEMY_BASE_SPEED,
        }
    }

    /// Type advantage: an attack is critical when its shape matches the target's
    #[inline]
    pub fn is_critical_against(&self, target: ShapeType) -> bool {
        *self == target
    }
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn actor(x: f32, y: f32) -> Self {
        Self::new(x, y, ACTOR_SIZE, ACTOR_SIZE)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict rectangle overlap; touching edges do not collide
    pub fn overlaps(&self, other: &Body) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }

    /// Inclusive point-in-rectangle test
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.pos.x
            && p.x <= self.pos.x + self.size.x
            && p.y >= self.pos.y
            && p.y <= self.pos.y + self.size.y
    }
}

/// A player-controlled actor
#[derive(Debug, Clone)]
pub struct Player {
    /// 1 or 2
    pub id: u8,
    pub shape: ShapeType,
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
    pub lives: u8,
    /// Movement distance per step
    pub speed: f32,
    /// Session-clock time at which the current invulnerability window ends
    pub invulnerable_until: Option<f64>,
    /// Duel shield: negates all incoming damage while set
    pub has_shield: bool,
    /// Duel speed boost
    pub speed_boost: bool,
    pub last_shot_ms: Option<f64>,
}

impl Player {
    pub fn new(id: u8, x: f32, y: f32, max_health: f32, lives: u8, speed: f32) -> Self {
        Self {
            id,
            shape: ShapeType::Circle,
            body: Body::actor(x, y),
            health: max_health,
            max_health,
            lives,
            speed,
            invulnerable_until: None,
            has_shield: false,
            speed_boost: false,
            last_shot_ms: None,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_until.is_some()
    }

    /// Heal without exceeding max health
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Whether the fire cooldown has elapsed at `now_ms`
    pub fn can_fire(&self, now_ms: f64) -> bool {
        self.last_shot_ms
            .is_none_or(|last| now_ms - last > SHOT_DELAY_MS)
    }

    /// Clamp the body inside the field, keeping `margin` from every edge
    pub fn clamp_to_field(&mut self, margin: f32, width: f32, height: f32) {
        let max_x = (width - margin).max(margin);
        let max_y = (height - margin).max(margin);
        self.body.pos.x = self.body.pos.x.clamp(margin, max_x);
        self.body.pos.y = self.body.pos.y.clamp(margin, max_y);
    }
}

/// A hostile shape
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub shape: ShapeType,
    pub body: Body,
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub difficulty: u32,
}

impl Enemy {
    /// Base enemy for `shape`, falling straight down at base speed
    pub fn new(id: u32, shape: ShapeType, x: f32, y: f32) -> Self {
        let stats = shape.enemy_stats();
        Self {
            id,
            shape,
            body: Body::actor(x, y),
            vel: Vec2::new(0.0, stats.speed),
            health: stats.max_health,
            max_health: stats.max_health,
            damage: stats.damage,
            difficulty: stats.difficulty,
        }
    }

    pub fn move_step(&mut self) {
        self.body.pos += self.vel;
    }

    /// Move, then reverse any velocity component that left the inner field
    pub fn move_bouncing(&mut self, margin: f32, width: f32, height: f32) {
        self.move_step();
        let p = self.body.pos;
        if p.x < margin || p.x > width - margin {
            self.vel.x = -self.vel.x;
        }
        if p.y < margin || p.y > height - margin {
            self.vel.y = -self.vel.y;
        }
    }

    /// Apply damage, clamping health into `[0, max_health]`. Returns true on kill.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.health <= 0.0
    }
}

/// A shot travelling in a fixed direction
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub shape: ShapeType,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    /// Shooter in duel mode; friendly fire is excluded by owner
    pub owner: Option<u8>,
}

impl Projectile {
    pub fn move_step(&mut self) {
        self.pos += self.vel;
    }

    pub fn hits(&self, target: &Body) -> bool {
        target.contains_point(self.pos)
    }

    pub fn is_outside(&self, width: f32, height: f32) -> bool {
        self.pos.x < 0.0 || self.pos.x > width || self.pos.y < 0.0 || self.pos.y > height
    }

    pub fn body(&self) -> Body {
        Body::new(self.pos.x, self.pos.y, PROJECTILE_SIZE, PROJECTILE_SIZE)
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Shield,
    Speed,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Health, PowerUpKind::Shield, PowerUpKind::Speed];
}

/// A collectible drifting down the field
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub body: Body,
    /// Remaining lifetime (duel only); `None` expires off-screen instead
    pub lifetime_ms: Option<f64>,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, x: f32, y: f32) -> Self {
        Self {
            id,
            kind,
            body: Body::new(x, y, POWER_UP_SIZE, POWER_UP_SIZE),
            lifetime_ms: None,
        }
    }

    pub fn move_step(&mut self) {
        self.body.pos.y += POWER_UP_FALL_SPEED;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_strict() {
        let a = Body::actor(0.0, 0.0);
        // Exactly touching on the right edge
        let b = Body::actor(30.0, 0.0);
        assert!(!a.overlaps(&b));
        let c = Body::actor(29.0, 29.0);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_point_test_is_inclusive() {
        let target = Body::actor(100.0, 100.0);
        assert!(target.contains_point(Vec2::new(100.0, 100.0)));
        assert!(target.contains_point(Vec2::new(130.0, 130.0)));
        assert!(!target.contains_point(Vec2::new(130.5, 110.0)));
        assert!(!target.contains_point(Vec2::new(99.9, 110.0)));
    }

    #[test]
    fn test_projectile_uses_point_not_rectangle() {
        // Projectile rectangle would overlap the target, but its point does not
        let target = Body::actor(100.0, 100.0);
        let shot = Projectile {
            id: 1,
            shape: ShapeType::Circle,
            pos: Vec2::new(97.0, 110.0),
            vel: Vec2::ZERO,
            damage: 5.0,
            owner: None,
        };
        assert!(shot.body().overlaps(&target));
        assert!(!shot.hits(&target));
    }

    #[test]
    fn test_enemy_stats_by_shape() {
        let tri = ShapeType::Triangle.enemy_stats();
        assert_eq!(tri.max_health, 40.0);
        assert_eq!(tri.damage, 8.0);
        assert_eq!(tri.difficulty, 2);
        assert_eq!(ShapeType::Cube.enemy_stats().difficulty, 3);
    }

    #[test]
    fn test_enemy_damage_clamps() {
        let mut enemy = Enemy::new(1, ShapeType::Circle, 0.0, 0.0);
        assert!(!enemy.take_damage(5.0));
        assert_eq!(enemy.health, 25.0);
        assert!(enemy.take_damage(1000.0));
        assert_eq!(enemy.health, 0.0);
        enemy.take_damage(-500.0);
        assert_eq!(enemy.health, enemy.max_health);
    }

    #[test]
    fn test_bounce_reverses_velocity() {
        let mut enemy = Enemy::new(1, ShapeType::Cube, 21.0, 300.0);
        enemy.vel = Vec2::new(-1.5, 0.5);
        enemy.move_bouncing(20.0, 800.0, 600.0);
        assert!(enemy.vel.x > 0.0);
        assert!(enemy.vel.y > 0.0);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut player = Player::new(1, 0.0, 0.0, 100.0, 3, 8.0);
        assert!(player.can_fire(0.0));
        player.last_shot_ms = Some(1000.0);
        assert!(!player.can_fire(1200.0));
        assert!(player.can_fire(1200.1));
    }
}
