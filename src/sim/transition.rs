//! Level transition fade
//!
//! Fades to black in 0.05 alpha steps every 50 ms, then fades back in.
//! The overlay shows the outgoing level while darkening and the incoming
//! level while clearing.

const STEP_MS: f64 = 50.0;
/// Steps from transparent to opaque (1.0 / 0.05)
const STEPS_PER_FADE: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct LevelTransition {
    pub from_level: u32,
    pub to_level: u32,
    /// Opacity in units of `1 / STEPS_PER_FADE`
    level_steps: u32,
    /// False while darkening, true while clearing
    pub fade_in: bool,
    /// Time left until the next alpha step
    until_step_ms: f64,
}

impl LevelTransition {
    pub fn start(from_level: u32, to_level: u32) -> Self {
        Self {
            from_level,
            to_level,
            level_steps: 0,
            fade_in: false,
            until_step_ms: 0.0,
        }
    }

    /// Advance by `dt_ms`. Returns true once the fade has fully cleared.
    pub fn update(&mut self, dt_ms: f64) -> bool {
        self.until_step_ms -= dt_ms;
        while self.until_step_ms <= 0.0 {
            self.until_step_ms += STEP_MS;
            if self.step() {
                return true;
            }
        }
        false
    }

    fn step(&mut self) -> bool {
        if !self.fade_in {
            self.level_steps += 1;
            if self.level_steps >= STEPS_PER_FADE {
                self.fade_in = true;
            }
            false
        } else {
            self.level_steps = self.level_steps.saturating_sub(1);
            self.level_steps == 0
        }
    }

    /// Overlay opacity in `[0, 1]`
    pub fn alpha(&self) -> f32 {
        self.level_steps as f32 / STEPS_PER_FADE as f32
    }

    /// Opacity of the "Level N" caption: peaks at mid fade
    pub fn text_alpha(&self) -> f32 {
        (1.0 - (self.alpha() - 0.5).abs() * 2.0).clamp(0.0, 1.0)
    }

    pub fn displayed_level(&self) -> u32 {
        if self.fade_in {
            self.to_level
        } else {
            self.from_level
        }
    }
}
