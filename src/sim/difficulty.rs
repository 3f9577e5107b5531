//! Difficulty curve
//!
//! Pure functions from a 1-indexed progression counter (level or wave) to
//! the stats a session plays with. Adventure and combat scale the same
//! enemy multipliers but progress in different currencies.

/// Adventure player max health: +20 per level, capped at 200
pub fn adventure_player_max_health(level: u32) -> f32 {
    (100.0 + steps(level) * 20.0).min(200.0)
}

/// Combat player max health for the selected starting level: -15% per level, floor 40
pub fn combat_player_max_health(starting_level: u32) -> f32 {
    (100.0 * (1.0 - steps(starting_level) * 0.15)).max(40.0)
}

pub fn enemy_health_multiplier(n: u32) -> f32 {
    1.0 + steps(n) * 0.2
}

pub fn enemy_damage_multiplier(n: u32) -> f32 {
    1.0 + steps(n) * 0.15
}

pub fn enemy_speed_multiplier(n: u32) -> f32 {
    1.0 + steps(n) * 0.1
}

/// Spawn interval for adventure levels and combat waves after the first
pub fn spawn_rate_ms(n: u32) -> f64 {
    (1500.0 - steps(n) as f64 * 100.0).max(300.0)
}

/// Spawn interval when a combat session starts at `starting_level`
pub fn combat_start_spawn_rate_ms(starting_level: u32) -> f64 {
    (1500.0 - steps(starting_level) as f64 * 200.0).max(500.0)
}

pub fn duel_spawn_rate_ms(level: u32) -> f64 {
    (3000.0 - level as f64 * 300.0).max(1000.0)
}

pub fn points_to_next_level(level: u32) -> u32 {
    500 + level.saturating_sub(1) * 300
}

pub fn enemies_required_for_next_wave(wave: u32) -> u32 {
    10 + wave.saturating_sub(1) * 5
}

pub fn combat_max_enemies(wave: u32) -> usize {
    5 + wave.saturating_sub(1) as usize * 2
}

pub fn duel_max_enemies(level: u32) -> usize {
    (5 + level as usize).min(10)
}

/// Duel scales enemies from the level itself rather than from level - 1
pub fn duel_enemy_health_multiplier(level: u32) -> f32 {
    1.0 + level as f32 * 0.2
}

pub fn duel_enemy_damage_multiplier(level: u32) -> f32 {
    1.0 + level as f32 * 0.1
}

#[inline]
fn steps(n: u32) -> f32 {
    n.saturating_sub(1) as f32
}

/// Advancement threshold in the mode's progression currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Points(u32),
    Kills(u32),
    /// Duel never advances
    Never,
}

/// Everything a session needs to know about its current level or wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelParams {
    pub number: u32,
    pub player_max_health: f32,
    pub enemy_health_multiplier: f32,
    pub enemy_damage_multiplier: f32,
    pub enemy_speed_multiplier: f32,
    pub spawn_rate_ms: f64,
    pub threshold: Threshold,
    /// `None` means only the spawn timer limits enemies
    pub max_enemies: Option<usize>,
}

impl LevelParams {
    pub fn adventure(level: u32) -> Self {
        Self {
            number: level,
            player_max_health: adventure_player_max_health(level),
            enemy_health_multiplier: enemy_health_multiplier(level),
            enemy_damage_multiplier: enemy_damage_multiplier(level),
            enemy_speed_multiplier: enemy_speed_multiplier(level),
            spawn_rate_ms: spawn_rate_ms(level),
            threshold: Threshold::Points(points_to_next_level(level)),
            max_enemies: None,
        }
    }

    /// First wave of a combat session started at `starting_level`
    pub fn combat_start(starting_level: u32) -> Self {
        Self {
            spawn_rate_ms: combat_start_spawn_rate_ms(starting_level),
            ..Self::combat_wave(starting_level, starting_level)
        }
    }

    /// A later combat wave; max health stays tied to the starting level
    pub fn combat_wave(wave: u32, starting_level: u32) -> Self {
        Self {
            number: wave,
            player_max_health: combat_player_max_health(starting_level),
            enemy_health_multiplier: enemy_health_multiplier(wave),
            enemy_damage_multiplier: enemy_damage_multiplier(wave),
            enemy_speed_multiplier: enemy_speed_multiplier(wave),
            spawn_rate_ms: spawn_rate_ms(wave),
            threshold: Threshold::Kills(enemies_required_for_next_wave(wave)),
            max_enemies: Some(combat_max_enemies(wave)),
        }
    }

    pub fn duel(level: u32) -> Self {
        Self {
            number: level,
            player_max_health: 100.0,
            enemy_health_multiplier: duel_enemy_health_multiplier(level),
            enemy_damage_multiplier: duel_enemy_damage_multiplier(level),
            enemy_speed_multiplier: 1.0,
            spawn_rate_ms: duel_spawn_rate_ms(level),
            threshold: Threshold::Never,
            max_enemies: Some(duel_max_enemies(level)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_adventure_level_one() {
        let p = LevelParams::adventure(1);
        assert_eq!(p.player_max_health, 100.0);
        assert_eq!(p.spawn_rate_ms, 1500.0);
        assert_eq!(p.threshold, Threshold::Points(500));
        assert_eq!(p.max_enemies, None);
        assert_eq!(p.enemy_health_multiplier, 1.0);
    }

    #[test]
    fn test_adventure_health_caps() {
        assert_eq!(adventure_player_max_health(3), 140.0);
        assert_eq!(adventure_player_max_health(6), 200.0);
        assert_eq!(adventure_player_max_health(20), 200.0);
    }

    #[test]
    fn test_combat_start_at_level_three() {
        let p = LevelParams::combat_start(3);
        assert_eq!(p.threshold, Threshold::Kills(20));
        assert_eq!(p.spawn_rate_ms, 1100.0);
        assert_eq!(p.max_enemies, Some(9));
        assert!((p.player_max_health - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_combat_health_floor() {
        assert!((combat_player_max_health(5) - 40.0).abs() < 1e-4);
        assert_eq!(combat_player_max_health(9), 40.0);
    }

    #[test]
    fn test_later_wave_uses_gentler_spawn_curve() {
        let p = LevelParams::combat_wave(4, 3);
        assert_eq!(p.spawn_rate_ms, 1200.0);
        assert_eq!(p.threshold, Threshold::Kills(25));
        assert!((p.player_max_health - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_duel_params() {
        let p = LevelParams::duel(2);
        assert_eq!(p.spawn_rate_ms, 2400.0);
        assert_eq!(p.max_enemies, Some(7));
        assert_eq!(LevelParams::duel(9).max_enemies, Some(10));
        assert_eq!(duel_spawn_rate_ms(8), 1000.0);
        assert_eq!(p.threshold, Threshold::Never);
    }

    proptest! {
        #[test]
        fn multipliers_never_decrease(n in 1u32..500) {
            prop_assert!(enemy_health_multiplier(n + 1) >= enemy_health_multiplier(n));
            prop_assert!(enemy_damage_multiplier(n + 1) >= enemy_damage_multiplier(n));
            prop_assert!(enemy_speed_multiplier(n + 1) >= enemy_speed_multiplier(n));
        }

        #[test]
        fn spawn_rates_never_increase_and_respect_floors(n in 1u32..500) {
            prop_assert!(spawn_rate_ms(n + 1) <= spawn_rate_ms(n));
            prop_assert!(spawn_rate_ms(n) >= 300.0);
            prop_assert!(combat_start_spawn_rate_ms(n) >= 500.0);
            prop_assert!(duel_spawn_rate_ms(n + 1) <= duel_spawn_rate_ms(n));
            prop_assert!(duel_spawn_rate_ms(n) >= 1000.0);
        }

        #[test]
        fn thresholds_grow(n in 1u32..500) {
            prop_assert!(points_to_next_level(n + 1) > points_to_next_level(n));
            prop_assert!(enemies_required_for_next_wave(n + 1) > enemies_required_for_next_wave(n));
        }
    }
}
